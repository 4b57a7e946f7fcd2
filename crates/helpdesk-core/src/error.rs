//! Error types for `helpdesk-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{field} must not be empty")]
  EmptyField { field: &'static str },

  #[error("{field} must be greater than zero")]
  ZeroDuration { field: &'static str },

  #[error("unknown {kind} value: {value:?}")]
  UnknownVariant { kind: &'static str, value: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Reject blank strings for required text fields.
pub(crate) fn require_text(field: &'static str, value: &str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::EmptyField { field });
  }
  Ok(())
}
