//! Test helpers for controller and channel tests.
//!
//! `ScriptedBackend` answers every remote call from in-memory scripts:
//! per-query latency, per-query failures, canned suggestions. It records
//! every request so tests can assert on what reached the "network".

use std::{
  collections::HashMap,
  sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
  },
  time::Duration,
};

use async_trait::async_trait;

use crate::{
  controller::SearchController,
  domain::{
    config::Config,
    outcome::{Facet, FacetValue, Pagination, ResultRecord, SearchOutcome, Suggestion, SuggestionKind},
  },
  remote::{
    BulkSyncReport, BulkSyncRequest, ClickEvent, IndexAdmin, IndexEntry, RemoteError, SearchBackend, SearchMetrics,
    SearchRequest, SuggestRequest,
  },
};

/// Total hits the scripted service claims for every query.
pub const SCRIPTED_TOTAL: u64 = 45;

#[derive(Default)]
pub struct ScriptedBackend {
  search_latency: Mutex<HashMap<String, Duration>>,
  search_failures: Mutex<HashMap<String, RemoteError>>,
  suggestions: Mutex<HashMap<String, Vec<Suggestion>>>,
  suggest_latency: Mutex<Duration>,
  fail_suggest: AtomicBool,
  fail_clicks: AtomicBool,
  fail_admin: AtomicBool,
  searches: Mutex<Vec<SearchRequest>>,
  suggests: Mutex<Vec<SuggestRequest>>,
  clicks: Mutex<Vec<ClickEvent>>,
  admin_calls: AtomicUsize,
}

impl ScriptedBackend {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn set_search_latency(&self, query: &str, latency: Duration) {
    self.search_latency.lock().unwrap().insert(query.to_string(), latency);
  }

  pub fn fail_search(&self, query: &str, error: RemoteError) {
    self.search_failures.lock().unwrap().insert(query.to_string(), error);
  }

  pub fn heal_search(&self, query: &str) {
    self.search_failures.lock().unwrap().remove(query);
  }

  pub fn set_suggestions(&self, query: &str, texts: &[&str]) {
    let suggestions = texts
      .iter()
      .map(|t| Suggestion {
        text: t.to_string(),
        kind: SuggestionKind::Query,
        score: None,
        result_id: None,
      })
      .collect();
    self.suggestions.lock().unwrap().insert(query.to_string(), suggestions);
  }

  pub fn set_suggest_latency(&self, latency: Duration) {
    *self.suggest_latency.lock().unwrap() = latency;
  }

  pub fn set_fail_suggest(&self, fail: bool) {
    self.fail_suggest.store(fail, Ordering::SeqCst);
  }

  pub fn set_fail_clicks(&self, fail: bool) {
    self.fail_clicks.store(fail, Ordering::SeqCst);
  }

  pub fn set_fail_admin(&self, fail: bool) {
    self.fail_admin.store(fail, Ordering::SeqCst);
  }

  pub fn search_calls(&self) -> usize {
    self.searches.lock().unwrap().len()
  }

  pub fn search_requests(&self) -> Vec<SearchRequest> {
    self.searches.lock().unwrap().clone()
  }

  pub fn suggest_calls(&self) -> usize {
    self.suggests.lock().unwrap().len()
  }

  pub fn suggest_requests(&self) -> Vec<SuggestRequest> {
    self.suggests.lock().unwrap().clone()
  }

  pub fn clicks(&self) -> Vec<ClickEvent> {
    self.clicks.lock().unwrap().clone()
  }

  pub fn admin_calls(&self) -> usize {
    self.admin_calls.load(Ordering::SeqCst)
  }

  /// The outcome the scripted service produces for `request`.
  pub fn outcome_for(request: &SearchRequest) -> SearchOutcome {
    let offset = (request.page as u64 - 1) * request.page_size as u64;
    let count = SCRIPTED_TOTAL.saturating_sub(offset).min(request.page_size as u64);
    let results = (0..count)
      .map(|i| ResultRecord {
        id: format!("{}-{}", request.query, offset + i),
        title: format!("{} #{}", request.query, offset + i),
        kind: "course".to_string(),
        snippet: None,
        url: None,
        score: None,
        metadata: serde_json::Value::Null,
      })
      .collect();

    SearchOutcome {
      results,
      facets: vec![Facet {
        name: "type".to_string(),
        values: vec![FacetValue {
          value: format!("{}-facet", request.query),
          count: SCRIPTED_TOTAL,
        }],
      }],
      pagination: Pagination {
        total: SCRIPTED_TOTAL,
        page: request.page,
        page_size: request.page_size,
        has_more: offset + count < SCRIPTED_TOTAL,
      },
    }
  }

  fn admin_result(&self) -> Result<(), RemoteError> {
    self.admin_calls.fetch_add(1, Ordering::SeqCst);
    if self.fail_admin.load(Ordering::SeqCst) {
      return Err(RemoteError::Status {
        status: 503,
        body: "index unavailable".to_string(),
      });
    }
    Ok(())
  }
}

#[async_trait]
impl SearchBackend for ScriptedBackend {
  async fn search(&self, request: &SearchRequest) -> Result<SearchOutcome, RemoteError> {
    self.searches.lock().unwrap().push(request.clone());
    let latency = self.search_latency.lock().unwrap().get(&request.query).copied();
    if let Some(latency) = latency {
      tokio::time::sleep(latency).await;
    }
    let failure = self.search_failures.lock().unwrap().get(&request.query).cloned();
    if let Some(error) = failure {
      return Err(error);
    }
    Ok(Self::outcome_for(request))
  }

  async fn suggest(&self, request: &SuggestRequest) -> Result<Vec<Suggestion>, RemoteError> {
    self.suggests.lock().unwrap().push(request.clone());
    let latency = *self.suggest_latency.lock().unwrap();
    if !latency.is_zero() {
      tokio::time::sleep(latency).await;
    }
    if self.fail_suggest.load(Ordering::SeqCst) {
      return Err(RemoteError::Network("suggest service down".to_string()));
    }
    Ok(self.suggestions.lock().unwrap().get(&request.query).cloned().unwrap_or_default())
  }

  async fn track_click(&self, event: &ClickEvent) -> Result<(), RemoteError> {
    self.clicks.lock().unwrap().push(event.clone());
    if self.fail_clicks.load(Ordering::SeqCst) {
      return Err(RemoteError::Timeout);
    }
    Ok(())
  }
}

#[async_trait]
impl IndexAdmin for ScriptedBackend {
  async fn update_index_entry(&self, _entry: &IndexEntry) -> Result<(), RemoteError> {
    self.admin_result()
  }

  async fn remove_index_entry(&self, _id: &str) -> Result<(), RemoteError> {
    self.admin_result()
  }

  async fn bulk_sync(&self, request: &BulkSyncRequest) -> Result<BulkSyncReport, RemoteError> {
    self.admin_result()?;
    Ok(BulkSyncReport {
      indexed: request.entries.len() as u64,
      removed: 0,
      failed: Vec::new(),
    })
  }

  async fn get_metrics(&self) -> Result<SearchMetrics, RemoteError> {
    self.admin_result()?;
    Ok(SearchMetrics {
      total_searches: self.search_calls() as u64,
      ..Default::default()
    })
  }

  async fn clear_analytics(&self) -> Result<(), RemoteError> {
    self.admin_result()
  }
}

/// Config with caching off and no debounce, so every call is observable.
pub fn test_config() -> Config {
  let mut config = Config::default();
  config.search.cache_capacity = 0;
  config.suggest.debounce_ms = 0;
  config
}

pub struct TestContext {
  pub backend: Arc<ScriptedBackend>,
  pub controller: SearchController,
}

impl TestContext {
  pub fn new() -> Self {
    Self::with_config(test_config())
  }

  pub fn with_config(config: Config) -> Self {
    let backend = Arc::new(ScriptedBackend::new());
    let controller = SearchController::new(backend.clone(), &config);
    Self { backend, controller }
  }
}
