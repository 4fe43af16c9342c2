//! Attendee identities — one record per normalized email address, shared by
//! every event the address has joined.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── EmailAddress ────────────────────────────────────────────────────────────

/// A trimmed, lower-cased email address.
///
/// The only constructor is [`EmailAddress::parse`], so every value of this
/// type is already normalized and safe to compare or store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
  pub fn parse(raw: &str) -> Result<Self> {
    let normalized = raw.trim().to_lowercase();
    if normalized.is_empty() {
      return Err(Error::Validation("email required".to_owned()));
    }

    Ok(Self(normalized))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for EmailAddress {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl AsRef<str> for EmailAddress {
  fn as_ref(&self) -> &str { &self.0 }
}

impl TryFrom<String> for EmailAddress {
  type Error = Error;

  fn try_from(value: String) -> Result<Self> { Self::parse(&value) }
}

impl From<EmailAddress> for String {
  fn from(value: EmailAddress) -> Self { value.0 }
}

// ─── Attendee ────────────────────────────────────────────────────────────────

/// A deduplicated attendee identity. Created on first signup, never updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
  pub attendee_id: Uuid,
  pub email:       EmailAddress,
  pub created_at:  DateTime<Utc>,
}

/// An attendee as listed on an event: just the identity id and its address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendeeRef {
  pub id:    Uuid,
  pub email: EmailAddress,
}
