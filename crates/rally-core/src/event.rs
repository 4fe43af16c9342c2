//! Event types and create-time validation.
//!
//! An [`Event`] carries its metadata and the ordered list of attendee ids that
//! have joined it. The list is only ever appended to, by the signup flow.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::{Error, Result, attendee::AttendeeRef};

/// Capacity given to events created without an explicit `totalSlots`.
pub const DEFAULT_TOTAL_SLOTS: u32 = 50;

// ─── Medium ──────────────────────────────────────────────────────────────────

/// Whether an event happens online or in person.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum EventMedium {
  #[default]
  Virtual,
  Physical,
}

// ─── Event ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
  pub event_id:        Uuid,
  pub title:           String,
  pub description:     String,
  pub date:            NaiveDate,
  /// Free-form display time, e.g. `"7:15 PM"`.
  pub time:            Option<String>,
  pub img_url:         String,
  pub event_medium:    EventMedium,
  pub total_slots:     u32,
  /// Attendee ids in join order. Each id appears at most once.
  pub attendees_email: Vec<Uuid>,
  pub created_at:      DateTime<Utc>,
  pub updated_at:      DateTime<Utc>,
}

impl Event {
  pub fn attendee_count(&self) -> usize { self.attendees_email.len() }

  pub fn remaining_slots(&self) -> u32 {
    let taken = u32::try_from(self.attendee_count()).unwrap_or(u32::MAX);
    self.total_slots.saturating_sub(taken)
  }

  pub fn is_full(&self) -> bool { self.remaining_slots() == 0 }

  pub fn has_attendee(&self, attendee_id: Uuid) -> bool {
    self.attendees_email.contains(&attendee_id)
  }
}

/// An event's resolved attendee list, in join order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventAttendees {
  pub event_id:        Uuid,
  pub title:           String,
  pub attendees:       Vec<AttendeeRef>,
  pub total_attendees: usize,
}

impl EventAttendees {
  pub fn new(event_id: Uuid, title: String, attendees: Vec<AttendeeRef>) -> Self {
    let total_attendees = attendees.len();
    Self { event_id, title, attendees, total_attendees }
  }
}

// ─── NewEvent ────────────────────────────────────────────────────────────────

/// A validated event, ready to be persisted.
/// `event_id` and the timestamps are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewEvent {
  pub title:        String,
  pub description:  String,
  pub date:         NaiveDate,
  pub time:         Option<String>,
  pub img_url:      String,
  pub event_medium: EventMedium,
  pub total_slots:  u32,
}

/// The create-event request body as received. Every field is optional here so
/// that [`NewEventInput::validate`] can report all missing fields at once.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEventInput {
  pub title:        Option<String>,
  pub description:  Option<String>,
  pub date:         Option<String>,
  pub time:         Option<String>,
  pub img_url:      Option<String>,
  pub event_medium: Option<String>,
  pub total_slots:  Option<i64>,
}

impl NewEventInput {
  /// Check required fields, then field values.
  ///
  /// Required: `title`, `description`, `date`, `imgUrl`, `eventMedium`.
  /// Blank strings count as missing.
  pub fn validate(self) -> Result<NewEvent> {
    let title = present(self.title);
    let description = present(self.description);
    let date = present(self.date);
    let img_url = present(self.img_url);
    let event_medium = present(self.event_medium);

    let missing: Vec<&str> = [
      ("title", title.is_none()),
      ("description", description.is_none()),
      ("date", date.is_none()),
      ("imgUrl", img_url.is_none()),
      ("eventMedium", event_medium.is_none()),
    ]
    .into_iter()
    .filter_map(|(name, absent)| absent.then_some(name))
    .collect();

    let (
      Some(title),
      Some(description),
      Some(date),
      Some(img_url),
      Some(event_medium),
    ) = (title, description, date, img_url, event_medium)
    else {
      let noun = if missing.len() == 1 { "field" } else { "fields" };
      return Err(Error::Validation(format!(
        "missing required {noun}: {}",
        missing.join(", ")
      )));
    };

    let mut problems = Vec::new();

    let date = parse_date(&date);
    if date.is_none() {
      problems.push("date must be a calendar date (YYYY-MM-DD)".to_owned());
    }

    let medium = event_medium.parse::<EventMedium>().ok();
    if medium.is_none() {
      problems.push("eventMedium must be one of: virtual, physical".to_owned());
    }

    let total_slots = match self.total_slots {
      None => Some(DEFAULT_TOTAL_SLOTS),
      Some(n) => u32::try_from(n).ok().filter(|n| *n >= 1),
    };
    if total_slots.is_none() {
      problems.push("totalSlots must be a positive integer".to_owned());
    }

    match (date, medium, total_slots) {
      (Some(date), Some(event_medium), Some(total_slots)) => Ok(NewEvent {
        title,
        description,
        date,
        time: present(self.time),
        img_url,
        event_medium,
        total_slots,
      }),
      _ => Err(Error::Validation(problems.join("; "))),
    }
  }
}

/// Trimmed value, or `None` when absent or blank.
fn present(value: Option<String>) -> Option<String> {
  value
    .map(|v| v.trim().to_owned())
    .filter(|v| !v.is_empty())
}

/// Accept `YYYY-MM-DD`, or an RFC 3339 timestamp whose local date is kept.
fn parse_date(raw: &str) -> Option<NaiveDate> {
  NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
    DateTime::parse_from_rfc3339(raw)
      .ok()
      .map(|dt| dt.date_naive())
  })
}
