//! Remote search service - the seams the controller talks through
//!
//! [`SearchBackend`] covers the hot path (search, suggestions, click
//! telemetry). [`IndexAdmin`] covers one-shot maintenance calls that never
//! touch controller state. [`HttpBackend`] implements both over JSON/HTTP.

mod http;
pub mod types;

pub use http::HttpBackend;
pub use types::*;

use crate::domain::{
  error::{ErrorKind, SearchError},
  outcome::{SearchOutcome, Suggestion},
};

#[derive(Debug, Clone, thiserror::Error)]
pub enum RemoteError {
  #[error("Network error: {0}")]
  Network(String),
  #[error("Request timed out")]
  Timeout,
  #[error("Invalid request: {0}")]
  Validation(String),
  #[error("Remote returned {status}: {body}")]
  Status { status: u16, body: String },
  #[error("Unexpected response: {0}")]
  Decode(String),
  #[error("Client setup failed: {0}")]
  Setup(String),
}

impl RemoteError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      RemoteError::Network(_) | RemoteError::Timeout | RemoteError::Status { .. } => ErrorKind::Network,
      RemoteError::Validation(_) => ErrorKind::Validation,
      RemoteError::Decode(_) | RemoteError::Setup(_) => ErrorKind::Unknown,
    }
  }
}

impl From<RemoteError> for SearchError {
  fn from(err: RemoteError) -> Self {
    SearchError::new(err.kind(), err.to_string())
  }
}

/// Hot-path operations of the remote search service.
#[async_trait::async_trait]
pub trait SearchBackend: Send + Sync {
  async fn search(&self, request: &SearchRequest) -> Result<SearchOutcome, RemoteError>;
  async fn suggest(&self, request: &SuggestRequest) -> Result<Vec<Suggestion>, RemoteError>;
  async fn track_click(&self, event: &ClickEvent) -> Result<(), RemoteError>;
}

/// Admin-only index maintenance operations.
#[async_trait::async_trait]
pub trait IndexAdmin: Send + Sync {
  async fn update_index_entry(&self, entry: &IndexEntry) -> Result<(), RemoteError>;
  async fn remove_index_entry(&self, id: &str) -> Result<(), RemoteError>;
  async fn bulk_sync(&self, request: &BulkSyncRequest) -> Result<BulkSyncReport, RemoteError>;
  async fn get_metrics(&self) -> Result<SearchMetrics, RemoteError>;
  async fn clear_analytics(&self) -> Result<(), RemoteError>;
}
