//! Error value surfaced to presentation code through the state.

use serde::{Deserialize, Serialize};

/// Coarse classification of a failed search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
  /// Transport or remote failure
  Network,
  /// Malformed request, e.g. page out of range
  Validation,
  Unknown,
}

impl std::fmt::Display for ErrorKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ErrorKind::Network => f.write_str("network"),
      ErrorKind::Validation => f.write_str("validation"),
      ErrorKind::Unknown => f.write_str("unknown"),
    }
  }
}

/// Tagged error stored in the state after a failed search.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{kind} error: {message}")]
pub struct SearchError {
  pub kind: ErrorKind,
  pub message: String,
  /// Where the failure happened, e.g. "search seq=4"
  pub context: Option<String>,
}

impl SearchError {
  pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
    Self {
      kind,
      message: message.into(),
      context: None,
    }
  }

  pub fn network(message: impl Into<String>) -> Self {
    Self::new(ErrorKind::Network, message)
  }

  pub fn validation(message: impl Into<String>) -> Self {
    Self::new(ErrorKind::Validation, message)
  }

  pub fn unknown(message: impl Into<String>) -> Self {
    Self::new(ErrorKind::Unknown, message)
  }

  pub fn with_context(mut self, context: impl Into<String>) -> Self {
    self.context = Some(context.into());
    self
  }
}
