//! Handlers for joining an event.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/events/{id}/signups` | Body: `{"email":"..."}`; `eventId` optional but must match |
//! | `POST` | `/signups` | Body: `{"email":"...","eventId":"..."}` |
//!
//! Both return 201 + [`Signup`].

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use rally_core::{
  signup::{JoinRequest, Signup, join_event},
  store::EventStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// JSON body accepted by both signup routes. Missing fields are reported by
/// the signup flow itself, so both are optional here.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinBody {
  pub email:    Option<String>,
  pub event_id: Option<String>,
}

/// `POST /events/{id}/signups`
pub async fn join_nested<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
  body: Result<Json<JoinBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EventStore + Clone + Send + Sync + 'static,
{
  let Json(body) = body?;

  if let Some(body_id) = body.event_id.as_deref().map(str::trim)
    && !body_id.is_empty()
    && !same_event_id(body_id, id.trim())
  {
    return Err(ApiError::BadRequest(
      "eventId does not match the event in the path".to_owned(),
    ));
  }

  join(&state, id, body.email.unwrap_or_default()).await
}

/// Compare as UUIDs when both sides parse, so any textual form of the same id
/// matches. Otherwise fall back to a case-insensitive text comparison.
fn same_event_id(a: &str, b: &str) -> bool {
  match (Uuid::parse_str(a), Uuid::parse_str(b)) {
    (Ok(a), Ok(b)) => a == b,
    _ => a.eq_ignore_ascii_case(b),
  }
}

/// `POST /signups`
pub async fn join_flat<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<JoinBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EventStore + Clone + Send + Sync + 'static,
{
  let Json(body) = body?;
  join(
    &state,
    body.event_id.unwrap_or_default(),
    body.email.unwrap_or_default(),
  )
  .await
}

async fn join<S>(
  state: &AppState<S>,
  event_id: String,
  email: String,
) -> Result<(StatusCode, Json<Signup>), ApiError>
where
  S: EventStore + Clone + Send + Sync + 'static,
{
  let request = JoinRequest { event_id, email };
  let signup = join_event(state.store.as_ref(), request, state.settings.capacity).await?;
  Ok((StatusCode::CREATED, Json(signup)))
}
