//! Event creation and the read side of the catalog.

use uuid::Uuid;

use crate::{
  Error, Result,
  event::{Event, EventAttendees, NewEventInput},
  store::EventStore,
};

/// Validate `input` and persist it as a new event with no attendees.
#[tracing::instrument(skip_all)]
pub async fn create_event<S: EventStore>(
  store: &S,
  input: NewEventInput,
) -> Result<Event> {
  let new_event = input.validate()?;
  let event = store.create_event(new_event).await.map_err(Error::store)?;
  tracing::info!(event_id = %event.event_id, title = %event.title, "event created");
  Ok(event)
}

/// Every event, in insertion order.
pub async fn list_events<S: EventStore>(store: &S) -> Result<Vec<Event>> {
  store.list_events().await.map_err(Error::store)
}

/// A single event by id.
pub async fn get_event<S: EventStore>(store: &S, event_id: &str) -> Result<Event> {
  let id = parse_event_id(event_id)?;
  store
    .get_event(id)
    .await
    .map_err(Error::store)?
    .ok_or_else(Error::event_not_found)
}

/// The attendees of one event, resolved to their email addresses.
#[tracing::instrument(skip(store))]
pub async fn get_event_attendees<S: EventStore>(
  store: &S,
  event_id: &str,
) -> Result<EventAttendees> {
  let id = parse_event_id(event_id)?;
  store
    .event_attendees(id)
    .await
    .map_err(Error::store)?
    .ok_or_else(Error::event_not_found)
}

/// An id that is not a UUID cannot name an event, so it is reported as not
/// found rather than as bad input.
pub(crate) fn parse_event_id(raw: &str) -> Result<Uuid> {
  Uuid::parse_str(raw.trim()).map_err(|_| Error::event_not_found())
}
