//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, calendar dates are `YYYY-MM-DD`, UUIDs are
//! hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, Utc};
use rally_core::{
  attendee::{Attendee, AttendeeRef, EmailAddress},
  event::{Event, EventMedium},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("timestamp {s:?}: {e}")))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::Decode(format!("date {s:?}: {e}")))
}

// ─── EventMedium ─────────────────────────────────────────────────────────────

pub fn encode_medium(m: EventMedium) -> String { m.to_string() }

pub fn decode_medium(s: &str) -> Result<EventMedium> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown event medium: {s:?}")))
}

// ─── Email ───────────────────────────────────────────────────────────────────

pub fn decode_email(s: &str) -> Result<EmailAddress> {
  EmailAddress::parse(s).map_err(|e| Error::Decode(format!("email {s:?}: {e}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from an `events` row.
pub struct RawEvent {
  pub event_id:    String,
  pub title:       String,
  pub description: String,
  pub date:        String,
  pub time:        Option<String>,
  pub img_url:     String,
  pub medium:      String,
  pub total_slots: i64,
  pub created_at:  String,
  pub updated_at:  String,
}

/// Column list matching [`RawEvent::from_row`].
pub const EVENT_COLUMNS: &str = "event_id, title, description, date, time, \
                                 img_url, medium, total_slots, created_at, \
                                 updated_at";

impl RawEvent {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      event_id:    row.get(0)?,
      title:       row.get(1)?,
      description: row.get(2)?,
      date:        row.get(3)?,
      time:        row.get(4)?,
      img_url:     row.get(5)?,
      medium:      row.get(6)?,
      total_slots: row.get(7)?,
      created_at:  row.get(8)?,
      updated_at:  row.get(9)?,
    })
  }

  /// Attach the event's attendee ids (already in join order).
  pub fn into_event(self, attendee_ids: &[String]) -> Result<Event> {
    let total_slots = u32::try_from(self.total_slots)
      .map_err(|_| Error::Decode(format!("total_slots {}", self.total_slots)))?;

    Ok(Event {
      event_id: decode_uuid(&self.event_id)?,
      title: self.title,
      description: self.description,
      date: decode_date(&self.date)?,
      time: self.time,
      img_url: self.img_url,
      event_medium: decode_medium(&self.medium)?,
      total_slots,
      attendees_email: attendee_ids
        .iter()
        .map(|id| decode_uuid(id))
        .collect::<Result<_>>()?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw values read directly from an `attendees` row.
pub struct RawAttendee {
  pub attendee_id: String,
  pub email:       String,
  pub created_at:  String,
}

impl RawAttendee {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      attendee_id: row.get(0)?,
      email:       row.get(1)?,
      created_at:  row.get(2)?,
    })
  }

  pub fn into_attendee(self) -> Result<Attendee> {
    Ok(Attendee {
      attendee_id: decode_uuid(&self.attendee_id)?,
      email:       decode_email(&self.email)?,
      created_at:  decode_dt(&self.created_at)?,
    })
  }

  pub fn into_ref(self) -> Result<AttendeeRef> {
    Ok(AttendeeRef {
      id:    decode_uuid(&self.attendee_id)?,
      email: decode_email(&self.email)?,
    })
  }
}
