//! SQL schema for the Rally SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema revision for future migrations.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Listing order is rowid order, i.e. insertion order.
CREATE TABLE IF NOT EXISTS events (
    event_id     TEXT PRIMARY KEY,
    title        TEXT NOT NULL,
    description  TEXT NOT NULL,
    date         TEXT NOT NULL,   -- YYYY-MM-DD
    time         TEXT,            -- free-form display string
    img_url      TEXT NOT NULL,
    medium       TEXT NOT NULL DEFAULT 'virtual',  -- 'virtual' | 'physical'
    total_slots  INTEGER NOT NULL DEFAULT 50,
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);

-- One row per normalized email address.
CREATE TABLE IF NOT EXISTS attendees (
    attendee_id  TEXT PRIMARY KEY,
    email        TEXT NOT NULL UNIQUE,
    created_at   TEXT NOT NULL
);

-- Event membership; rowid order is join order.
CREATE TABLE IF NOT EXISTS event_attendees (
    event_id     TEXT NOT NULL REFERENCES events(event_id),
    attendee_id  TEXT NOT NULL REFERENCES attendees(attendee_id),
    joined_at    TEXT NOT NULL,
    UNIQUE (event_id, attendee_id)
);

CREATE INDEX IF NOT EXISTS event_attendees_attendee_idx
    ON event_attendees(attendee_id);

PRAGMA user_version = 1;
";
