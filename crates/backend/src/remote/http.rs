use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, trace, warn};

use super::{
  BulkSyncReport, BulkSyncRequest, ClickEvent, IndexAdmin, IndexEntry, RemoteError, SearchBackend, SearchMetrics,
  SearchRequest, SuggestRequest, SuggestResponse,
};
use crate::domain::{
  config::RemoteConfig,
  outcome::{SearchOutcome, Suggestion},
};

const API_KEY_ENV: &str = "QUARRY_API_KEY";

/// JSON/HTTP client for the remote search service.
#[derive(Debug, Clone)]
pub struct HttpBackend {
  client: reqwest::Client,
  base_url: Url,
  api_key: Option<String>,
}

impl HttpBackend {
  pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
    let base_url = Url::parse(&config.base_url)
      .map_err(|e| RemoteError::Setup(format!("invalid base_url {:?}: {e}", config.base_url)))?;
    if base_url.cannot_be_a_base() {
      return Err(RemoteError::Setup(format!("base_url {:?} cannot be a base", config.base_url)));
    }

    let client = reqwest::Client::builder()
      .timeout(Duration::from_millis(config.timeout_ms))
      .build()
      .map_err(|e| RemoteError::Setup(e.to_string()))?;

    let api_key = config.api_key.clone().or_else(Self::key_from_env);

    debug!(
      base_url = %base_url,
      timeout_ms = config.timeout_ms,
      has_api_key = api_key.is_some(),
      "HTTP search backend initialized"
    );

    Ok(Self {
      client,
      base_url,
      api_key,
    })
  }

  fn key_from_env() -> Option<String> {
    match std::env::var(API_KEY_ENV) {
      Ok(key) if !key.is_empty() => Some(key),
      _ => None,
    }
  }

  /// Join path segments onto the base URL, percent-encoding each segment.
  fn endpoint(&self, segments: &[&str]) -> Result<Url, RemoteError> {
    let mut url = self.base_url.clone();
    url
      .path_segments_mut()
      .map_err(|_| RemoteError::Setup("base_url cannot be a base".to_string()))?
      .pop_if_empty()
      .extend(segments);
    Ok(url)
  }

  fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
    let mut builder = self
      .client
      .request(method, url)
      .header("X-Request-Id", uuid::Uuid::new_v4().to_string());
    if let Some(key) = &self.api_key {
      builder = builder.bearer_auth(key);
    }
    builder
  }

  /// Send a request and map transport and status failures.
  async fn send(&self, builder: reqwest::RequestBuilder, op: &'static str) -> Result<reqwest::Response, RemoteError> {
    let start = Instant::now();

    let response = builder.send().await.map_err(|e| {
      warn!(op, error = %e, "Request to search service failed");
      map_reqwest_error(e)
    })?;

    let status = response.status();
    trace!(op, status = %status, elapsed_ms = start.elapsed().as_millis() as u64, "Received response");

    if status.is_success() {
      return Ok(response);
    }

    let status_code = status.as_u16();
    let body = response.text().await.unwrap_or_default();
    if status_code == 400 || status_code == 422 {
      debug!(op, status = %status, "Search service rejected request");
      return Err(RemoteError::Validation(if body.is_empty() {
        status.to_string()
      } else {
        body
      }));
    }

    warn!(op, status = %status, "Search service returned an error");
    Err(RemoteError::Status {
      status: status_code,
      body,
    })
  }

  async fn send_json<T: DeserializeOwned>(
    &self,
    builder: reqwest::RequestBuilder,
    op: &'static str,
  ) -> Result<T, RemoteError> {
    let response = self.send(builder, op).await?;
    response.json::<T>().await.map_err(map_reqwest_error)
  }
}

fn map_reqwest_error(e: reqwest::Error) -> RemoteError {
  if e.is_timeout() {
    RemoteError::Timeout
  } else if e.is_decode() {
    RemoteError::Decode(e.to_string())
  } else {
    RemoteError::Network(e.to_string())
  }
}

#[async_trait]
impl SearchBackend for HttpBackend {
  async fn search(&self, request: &SearchRequest) -> Result<SearchOutcome, RemoteError> {
    let url = self.endpoint(&["search"])?;
    self.send_json(self.request(Method::POST, url).json(request), "search").await
  }

  async fn suggest(&self, request: &SuggestRequest) -> Result<Vec<Suggestion>, RemoteError> {
    let url = self.endpoint(&["suggest"])?;
    let response: SuggestResponse = self
      .send_json(self.request(Method::POST, url).json(request), "suggest")
      .await?;
    Ok(response.suggestions)
  }

  async fn track_click(&self, event: &ClickEvent) -> Result<(), RemoteError> {
    let url = self.endpoint(&["clicks"])?;
    self.send(self.request(Method::POST, url).json(event), "track_click").await?;
    Ok(())
  }
}

#[async_trait]
impl IndexAdmin for HttpBackend {
  async fn update_index_entry(&self, entry: &IndexEntry) -> Result<(), RemoteError> {
    let url = self.endpoint(&["index", "entries", &entry.id])?;
    self
      .send(self.request(Method::PUT, url).json(entry), "update_index_entry")
      .await?;
    Ok(())
  }

  async fn remove_index_entry(&self, id: &str) -> Result<(), RemoteError> {
    let url = self.endpoint(&["index", "entries", id])?;
    self.send(self.request(Method::DELETE, url), "remove_index_entry").await?;
    Ok(())
  }

  async fn bulk_sync(&self, request: &BulkSyncRequest) -> Result<BulkSyncReport, RemoteError> {
    let url = self.endpoint(&["index", "sync"])?;
    self
      .send_json(self.request(Method::POST, url).json(request), "bulk_sync")
      .await
  }

  async fn get_metrics(&self) -> Result<SearchMetrics, RemoteError> {
    let url = self.endpoint(&["metrics"])?;
    self.send_json(self.request(Method::GET, url), "get_metrics").await
  }

  async fn clear_analytics(&self) -> Result<(), RemoteError> {
    let url = self.endpoint(&["analytics"])?;
    self.send(self.request(Method::DELETE, url), "clear_analytics").await?;
    Ok(())
  }
}
