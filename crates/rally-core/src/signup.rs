//! The signup flow: link an attendee identity to an event, at most once per
//! (event, email) pair.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  attendee::EmailAddress,
  catalog::parse_event_id,
  store::{CapacityPolicy, EventStore, LinkOutcome},
};

/// Input to [`join_event`]. Both fields are raw caller input.
#[derive(Debug, Clone)]
pub struct JoinRequest {
  pub event_id: String,
  pub email:    String,
}

/// Confirmation of a successful join.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signup {
  pub email:       EmailAddress,
  pub event_id:    Uuid,
  pub event_title: String,
}

/// Register `request.email` as an attendee of `request.event_id`.
///
/// Fails with, in order of checking:
/// - [`Error::Validation`] if the email or the event id is missing, or the
///   email is malformed (no store access happens);
/// - [`Error::NotFound`] if the event does not exist (nothing is created);
/// - [`Error::EventFull`] under [`CapacityPolicy::Enforced`];
/// - [`Error::Conflict`] if the address has already joined this event.
#[tracing::instrument(skip_all, fields(event_id = %request.event_id))]
pub async fn join_event<S: EventStore>(
  store: &S,
  request: JoinRequest,
  policy: CapacityPolicy,
) -> Result<Signup> {
  let email = EmailAddress::parse(&request.email)?;

  if request.event_id.trim().is_empty() {
    return Err(Error::Validation("eventId required".to_owned()));
  }

  let event_id = parse_event_id(&request.event_id)?;
  let event = store
    .get_event(event_id)
    .await
    .map_err(Error::store)?
    .ok_or_else(Error::event_not_found)?;

  let full = Error::EventFull {
    event_id,
    total_slots: event.total_slots,
  };

  // Reject known duplicates without writing anything. The conditional link
  // below still catches a concurrent join that slips past this check.
  if let Some(existing) = store.find_attendee(&email).await.map_err(Error::store)?
    && event.has_attendee(existing.attendee_id)
  {
    tracing::debug!(%email, "attendee already joined");
    return Err(already_joined());
  }

  if policy == CapacityPolicy::Enforced && event.is_full() {
    return Err(full);
  }

  let attendee = store
    .get_or_create_attendee(&email)
    .await
    .map_err(Error::store)?;

  match store
    .link_attendee(event_id, attendee.attendee_id, policy)
    .await
    .map_err(Error::store)?
  {
    LinkOutcome::Linked => {
      tracing::info!(attendee_id = %attendee.attendee_id, "attendee joined event");
      Ok(Signup {
        email:       attendee.email,
        event_id,
        event_title: event.title,
      })
    }
    LinkOutcome::AlreadyLinked => {
      tracing::debug!(%email, "attendee already joined");
      Err(already_joined())
    }
    LinkOutcome::Full => Err(full),
    LinkOutcome::EventMissing => Err(Error::event_not_found()),
  }
}

fn already_joined() -> Error { Error::Conflict("already joined".to_owned()) }
