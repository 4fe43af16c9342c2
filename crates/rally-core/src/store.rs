//! The `EventStore` trait and the outcome types of its conditional writes.
//!
//! Storage backends (e.g. `rally-store-sqlite`) implement the trait. The
//! signup and catalog operations depend on this abstraction only.

use std::future::Future;

use uuid::Uuid;

use crate::{
  attendee::{Attendee, EmailAddress},
  event::{Event, EventAttendees, NewEvent},
};

// ─── Capacity ────────────────────────────────────────────────────────────────

/// Whether `total_slots` limits joins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CapacityPolicy {
  /// Capacity is displayed but never checked.
  #[default]
  Advisory,
  /// A join is rejected once the attendee count reaches `total_slots`.
  Enforced,
}

// ─── Link outcome ────────────────────────────────────────────────────────────

/// Result of [`EventStore::link_attendee`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
  /// The link was added and the event's `updated_at` bumped.
  Linked,
  /// The attendee was already linked; nothing changed.
  AlreadyLinked,
  /// Capacity is enforced and the event is full; nothing changed.
  Full,
  /// No event with that id exists; nothing changed.
  EventMissing,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Rally storage backend.
///
/// Events are created once and afterwards only gain attendee links. Attendee
/// identities are unique per normalized email. Both conditional writes
/// ([`get_or_create_attendee`](Self::get_or_create_attendee) and
/// [`link_attendee`](Self::link_attendee)) must be atomic with respect to
/// concurrent callers.
pub trait EventStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Events ────────────────────────────────────────────────────────────

  /// Persist a validated event with no attendees. The store assigns the id
  /// and timestamps.
  fn create_event(
    &self,
    input: NewEvent,
  ) -> impl Future<Output = Result<Event, Self::Error>> + Send + '_;

  /// All events in insertion order, attendee ids unresolved.
  fn list_events(
    &self,
  ) -> impl Future<Output = Result<Vec<Event>, Self::Error>> + Send + '_;

  /// Retrieve an event by id. Returns `None` if not found.
  fn get_event(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Event>, Self::Error>> + Send + '_;

  /// The event's attendees resolved to `{id, email}`, in join order.
  /// Returns `None` if the event does not exist.
  fn event_attendees(
    &self,
    event_id: Uuid,
  ) -> impl Future<Output = Result<Option<EventAttendees>, Self::Error>> + Send + '_;

  // ── Attendees ─────────────────────────────────────────────────────────

  /// Look up the identity for `email`. Never creates one.
  fn find_attendee<'a>(
    &'a self,
    email: &'a EmailAddress,
  ) -> impl Future<Output = Result<Option<Attendee>, Self::Error>> + Send + 'a;

  /// Return the identity for `email`, creating it if this is the first time
  /// the address is seen.
  fn get_or_create_attendee<'a>(
    &'a self,
    email: &'a EmailAddress,
  ) -> impl Future<Output = Result<Attendee, Self::Error>> + Send + 'a;

  // ── Links ─────────────────────────────────────────────────────────────

  /// Append `attendee_id` to the event's attendee list unless it is already
  /// there (or, under [`CapacityPolicy::Enforced`], the event is full).
  fn link_attendee(
    &self,
    event_id: Uuid,
    attendee_id: Uuid,
    policy: CapacityPolicy,
  ) -> impl Future<Output = Result<LinkOutcome, Self::Error>> + Send + '_;
}
