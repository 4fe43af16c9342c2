//! [`SqliteStore`] — the SQLite implementation of [`EventStore`].

use std::{collections::HashMap, path::Path};

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use rally_core::{
  attendee::{Attendee, EmailAddress},
  event::{Event, EventAttendees, NewEvent},
  store::{CapacityPolicy, EventStore, LinkOutcome},
};

use crate::{
  Result,
  encode::{
    EVENT_COLUMNS, RawAttendee, RawEvent, encode_date, encode_dt, encode_medium,
    encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Rally event store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Close the underlying connection. Calls on any remaining clone of this
  /// store fail afterwards.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── EventStore impl ─────────────────────────────────────────────────────────

impl EventStore for SqliteStore {
  type Error = crate::Error;

  // ── Events ────────────────────────────────────────────────────────────────

  async fn create_event(&self, input: NewEvent) -> Result<Event> {
    let now = Utc::now();
    let event = Event {
      event_id:        Uuid::new_v4(),
      title:           input.title,
      description:     input.description,
      date:            input.date,
      time:            input.time,
      img_url:         input.img_url,
      event_medium:    input.event_medium,
      total_slots:     input.total_slots,
      attendees_email: Vec::new(),
      created_at:      now,
      updated_at:      now,
    };

    let id_str      = encode_uuid(event.event_id);
    let title       = event.title.clone();
    let description = event.description.clone();
    let date_str    = encode_date(event.date);
    let time        = event.time.clone();
    let img_url     = event.img_url.clone();
    let medium_str  = encode_medium(event.event_medium);
    let total_slots = i64::from(event.total_slots);
    let at_str      = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO events (
             event_id, title, description, date, time,
             img_url, medium, total_slots, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
          rusqlite::params![
            id_str,
            title,
            description,
            date_str,
            time,
            img_url,
            medium_str,
            total_slots,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(event)
  }

  async fn list_events(&self) -> Result<Vec<Event>> {
    let (raws, links): (Vec<RawEvent>, Vec<(String, String)>) = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {EVENT_COLUMNS} FROM events ORDER BY rowid"
        ))?;
        let events = stmt
          .query_map([], RawEvent::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = conn.prepare(
          "SELECT event_id, attendee_id FROM event_attendees ORDER BY rowid",
        )?;
        let links = stmt
          .query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((events, links))
      })
      .await?;

    let mut by_event: HashMap<String, Vec<String>> = HashMap::new();
    for (event_id, attendee_id) in links {
      by_event.entry(event_id).or_default().push(attendee_id);
    }

    raws
      .into_iter()
      .map(|raw| {
        let ids = by_event.remove(&raw.event_id).unwrap_or_default();
        raw.into_event(&ids)
      })
      .collect()
  }

  async fn get_event(&self, id: Uuid) -> Result<Option<Event>> {
    let id_str = encode_uuid(id);

    let row: Option<(RawEvent, Vec<String>)> = self
      .conn
      .call(move |conn| {
        let raw = conn
          .query_row(
            &format!("SELECT {EVENT_COLUMNS} FROM events WHERE event_id = ?1"),
            rusqlite::params![id_str],
            RawEvent::from_row,
          )
          .optional()?;

        let Some(raw) = raw else { return Ok(None) };

        let mut stmt = conn.prepare(
          "SELECT attendee_id FROM event_attendees
           WHERE event_id = ?1 ORDER BY rowid",
        )?;
        let ids = stmt
          .query_map(rusqlite::params![id_str], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;

        Ok(Some((raw, ids)))
      })
      .await?;

    row.map(|(raw, ids)| raw.into_event(&ids)).transpose()
  }

  async fn event_attendees(&self, event_id: Uuid) -> Result<Option<EventAttendees>> {
    let id_str = encode_uuid(event_id);

    let row: Option<(String, Vec<RawAttendee>)> = self
      .conn
      .call(move |conn| {
        let title: Option<String> = conn
          .query_row(
            "SELECT title FROM events WHERE event_id = ?1",
            rusqlite::params![id_str],
            |row| row.get(0),
          )
          .optional()?;

        let Some(title) = title else { return Ok(None) };

        let mut stmt = conn.prepare(
          "SELECT a.attendee_id, a.email, a.created_at
           FROM event_attendees ea
           JOIN attendees a ON a.attendee_id = ea.attendee_id
           WHERE ea.event_id = ?1
           ORDER BY ea.rowid",
        )?;
        let attendees = stmt
          .query_map(rusqlite::params![id_str], RawAttendee::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Some((title, attendees)))
      })
      .await?;

    let Some((title, raws)) = row else { return Ok(None) };
    let attendees = raws
      .into_iter()
      .map(RawAttendee::into_ref)
      .collect::<Result<Vec<_>>>()?;

    Ok(Some(EventAttendees::new(event_id, title, attendees)))
  }

  // ── Attendees ─────────────────────────────────────────────────────────────

  async fn find_attendee(&self, email: &EmailAddress) -> Result<Option<Attendee>> {
    let email_str = email.as_str().to_owned();

    let raw: Option<RawAttendee> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT attendee_id, email, created_at FROM attendees WHERE email = ?1",
            rusqlite::params![email_str],
            RawAttendee::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawAttendee::into_attendee).transpose()
  }

  async fn get_or_create_attendee(&self, email: &EmailAddress) -> Result<Attendee> {
    let email_str = email.as_str().to_owned();
    let id_str    = encode_uuid(Uuid::new_v4());
    let at_str    = encode_dt(Utc::now());

    // The UNIQUE(email) constraint decides the race: a losing insert is a
    // no-op and the select returns the winner's row.
    let (created, raw): (bool, RawAttendee) = self
      .conn
      .call(move |conn| {
        let inserted = conn.execute(
          "INSERT INTO attendees (attendee_id, email, created_at)
           VALUES (?1, ?2, ?3)
           ON CONFLICT(email) DO NOTHING",
          rusqlite::params![id_str, email_str, at_str],
        )?;
        let raw = conn.query_row(
          "SELECT attendee_id, email, created_at FROM attendees WHERE email = ?1",
          rusqlite::params![email_str],
          RawAttendee::from_row,
        )?;
        Ok((inserted == 1, raw))
      })
      .await?;

    let attendee = raw.into_attendee()?;
    if created {
      tracing::debug!(attendee_id = %attendee.attendee_id, "attendee created");
    }
    Ok(attendee)
  }

  // ── Links ─────────────────────────────────────────────────────────────────

  async fn link_attendee(
    &self,
    event_id:    Uuid,
    attendee_id: Uuid,
    policy:      CapacityPolicy,
  ) -> Result<LinkOutcome> {
    let event_str    = encode_uuid(event_id);
    let attendee_str = encode_uuid(attendee_id);
    let at_str       = encode_dt(Utc::now());
    let enforce      = policy == CapacityPolicy::Enforced;

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let total_slots: Option<i64> = tx
          .query_row(
            "SELECT total_slots FROM events WHERE event_id = ?1",
            rusqlite::params![event_str],
            |row| row.get(0),
          )
          .optional()?;
        let Some(total_slots) = total_slots else {
          return Ok(LinkOutcome::EventMissing);
        };

        let linked = tx
          .query_row(
            "SELECT 1 FROM event_attendees WHERE event_id = ?1 AND attendee_id = ?2",
            rusqlite::params![event_str, attendee_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if linked {
          return Ok(LinkOutcome::AlreadyLinked);
        }

        if enforce {
          let count: i64 = tx.query_row(
            "SELECT COUNT(*) FROM event_attendees WHERE event_id = ?1",
            rusqlite::params![event_str],
            |row| row.get(0),
          )?;
          if count >= total_slots {
            return Ok(LinkOutcome::Full);
          }
        }

        tx.execute(
          "INSERT INTO event_attendees (event_id, attendee_id, joined_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![event_str, attendee_str, at_str],
        )?;
        tx.execute(
          "UPDATE events SET updated_at = ?2 WHERE event_id = ?1",
          rusqlite::params![event_str, at_str],
        )?;
        tx.commit()?;

        Ok(LinkOutcome::Linked)
      })
      .await?;

    Ok(outcome)
  }
}
