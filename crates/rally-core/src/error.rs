//! Error types for `rally-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  /// Caller input is missing or malformed. The message names the field(s).
  #[error("{0}")]
  Validation(String),

  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  Conflict(String),

  #[error("event {event_id} is full ({total_slots} slots)")]
  EventFull { event_id: Uuid, total_slots: u32 },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error.
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }

  pub(crate) fn event_not_found() -> Self {
    Self::NotFound("event not found".to_owned())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
