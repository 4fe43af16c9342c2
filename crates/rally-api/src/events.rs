//! Handlers for `/events` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/events` | All events, insertion order |
//! | `POST` | `/events` | Admin. Body: [`NewEventInput`]; returns 201 + stored event |
//! | `GET`  | `/events/{id}` | 404 if not found |
//! | `GET`  | `/events/{id}/attendees` | Admin. Resolved attendee list |

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use rally_core::{
  catalog,
  event::{Event, EventAttendees, NewEventInput},
  store::EventStore,
};

use crate::{AppState, auth::Admin, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /events`
pub async fn list<S>(State(state): State<AppState<S>>) -> Result<Json<Vec<Event>>, ApiError>
where
  S: EventStore + Clone + Send + Sync + 'static,
{
  let events = catalog::list_events(state.store.as_ref()).await?;
  Ok(Json(events))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /events` — returns 201 + the stored [`Event`].
pub async fn create<S>(
  State(state): State<AppState<S>>,
  _admin: Admin,
  body: Result<Json<NewEventInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EventStore + Clone + Send + Sync + 'static,
{
  let Json(input) = body?;
  let event = catalog::create_event(state.store.as_ref(), input).await?;
  Ok((StatusCode::CREATED, Json(event)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /events/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Event>, ApiError>
where
  S: EventStore + Clone + Send + Sync + 'static,
{
  let event = catalog::get_event(state.store.as_ref(), &id).await?;
  Ok(Json(event))
}

// ─── Attendees ────────────────────────────────────────────────────────────────

/// `GET /events/{id}/attendees`
pub async fn attendees<S>(
  State(state): State<AppState<S>>,
  _admin: Admin,
  Path(id): Path<String>,
) -> Result<Json<EventAttendees>, ApiError>
where
  S: EventStore + Clone + Send + Sync + 'static,
{
  let list = catalog::get_event_attendees(state.store.as_ref(), &id).await?;
  Ok(Json(list))
}
