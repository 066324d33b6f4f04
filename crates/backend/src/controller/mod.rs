//! Search controller - the façade presentation code talks to
//!
//! One controller per UI context. It owns the [`State`], both channels and
//! the sequencing that keeps asynchronous responses from clobbering newer
//! intent:
//!
//! - setters are synchronous reducer transitions and never fetch
//! - [`SearchController::submit_search`] issues a ticket; only the newest
//!   ticket's response is applied
//! - suggestions are applied only while their text is still the live text
//! - after [`SearchController::dispose`] nothing is applied any more
//!
//! All transitions go through one `watch` sender, which both serializes them
//! and publishes each new snapshot to subscribers.

use std::{future::Future, sync::Arc};

use chrono::Utc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::{
  cache::ResultCache,
  channel::{SearchChannel, SuggestionChannel, Ticket},
  domain::{
    config::Config,
    outcome::SuggestionOutcome,
    query::{Filters, QueryState, SortDirection, SortField},
  },
  remote::{ClickEvent, SearchBackend, SearchRequest},
  state::{Action, State, reduce},
};

#[cfg(test)]
pub(crate) mod __tests__;

/// Explicit values that replace the current query for one search.
///
/// Overrides shape the request only; the stored query is left as it is.
#[derive(Debug, Clone, Default)]
pub struct SearchOverrides {
  pub text: Option<String>,
  pub filters: Option<Filters>,
  pub sort: Option<(SortField, SortDirection)>,
  pub page: Option<u32>,
  pub page_size: Option<u32>,
  pub include_facets: Option<bool>,
}

impl SearchOverrides {
  pub fn page(mut self, page: u32) -> Self {
    self.page = Some(page);
    self
  }

  pub fn page_size(mut self, page_size: u32) -> Self {
    self.page_size = Some(page_size);
    self
  }

  pub fn text(mut self, text: impl Into<String>) -> Self {
    self.text = Some(text.into());
    self
  }

  pub fn include_facets(mut self, include: bool) -> Self {
    self.include_facets = Some(include);
    self
  }

  /// Compose the effective request from `query` overlaid with these overrides.
  pub fn compose(self, query: &QueryState, include_facets: bool) -> SearchRequest {
    let (sort_field, sort_direction) = self.sort.unwrap_or((query.sort_field, query.sort_direction));
    SearchRequest {
      query: self.text.unwrap_or_else(|| query.text.clone()),
      filters: self.filters.unwrap_or_else(|| query.filters.clone()),
      sort_field,
      sort_direction,
      page: self.page.unwrap_or(query.page),
      page_size: self.page_size.unwrap_or(query.page_size),
      include_facets: self.include_facets.unwrap_or(include_facets),
    }
  }
}

/// How a submitted search ended from the state's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
  /// The response (success or failure) was applied to the state.
  Applied,
  /// A newer search or a clear was issued first; the response was dropped.
  Superseded,
  /// The controller was disposed; the response was dropped.
  Disposed,
}

struct Inner {
  state: watch::Sender<Arc<State>>,
  search: SearchChannel,
  suggest: SuggestionChannel,
  backend: Arc<dyn SearchBackend>,
  include_facets: bool,
  cancel: CancellationToken,
}

/// Caller-owned search controller. Clones share the same state.
#[derive(Clone)]
pub struct SearchController {
  inner: Arc<Inner>,
}

impl SearchController {
  pub fn new(backend: Arc<dyn SearchBackend>, config: &Config) -> Self {
    let max_page_size = config.max_page_size();
    let cache = (config.search.cache_capacity > 0).then(|| {
      ResultCache::new(
        config.search.cache_capacity,
        std::time::Duration::from_secs(config.search.cache_ttl_secs),
      )
    });

    let (state, _) = watch::channel(Arc::new(State::new(config.initial_page_size(), max_page_size)));

    debug!(
      max_page_size,
      cache = cache.is_some(),
      include_facets = config.search.include_facets,
      "Search controller created"
    );

    Self {
      inner: Arc::new(Inner {
        state,
        search: SearchChannel::new(backend.clone(), cache, max_page_size),
        suggest: SuggestionChannel::new(backend.clone(), &config.suggest),
        backend,
        include_facets: config.search.include_facets,
        cancel: CancellationToken::new(),
      }),
    }
  }

  // ==========================================================================
  // Read model
  // ==========================================================================

  /// Current snapshot.
  pub fn state(&self) -> Arc<State> {
    self.inner.state.borrow().clone()
  }

  /// Receiver that observes every published snapshot.
  pub fn subscribe(&self) -> watch::Receiver<Arc<State>> {
    self.inner.state.subscribe()
  }

  /// This controller's result cache, for registering with index maintenance.
  pub fn result_cache(&self) -> Option<ResultCache> {
    self.inner.search.cache().cloned()
  }

  /// Highest search sequence number issued so far.
  pub fn latest_sequence(&self) -> u64 {
    self.inner.search.latest()
  }

  // ==========================================================================
  // Lifecycle
  // ==========================================================================

  /// Tear the controller down. In-flight work may still finish, but nothing
  /// reaches the state afterwards.
  pub fn dispose(&self) {
    if !self.inner.cancel.is_cancelled() {
      info!(latest_seq = self.latest_sequence(), "Search controller disposed");
      self.inner.cancel.cancel();
    }
  }

  pub fn is_disposed(&self) -> bool {
    self.inner.cancel.is_cancelled()
  }

  // ==========================================================================
  // Setters
  // ==========================================================================

  pub fn set_query(&self, text: impl Into<String>) {
    self.dispatch(Action::SetQuery(text.into()));
  }

  pub fn set_filters(&self, partial: Filters) {
    self.dispatch(Action::SetFilters(partial));
  }

  pub fn set_sort(&self, field: SortField, direction: SortDirection) {
    self.dispatch(Action::SetSort(field, direction));
  }

  pub fn set_page(&self, page: u32) {
    self.dispatch(Action::SetPage(page));
  }

  pub fn set_page_size(&self, page_size: u32) {
    self.dispatch(Action::SetPageSize(page_size));
  }

  pub fn reset_filters(&self) {
    self.dispatch(Action::ResetFilters);
  }

  /// Clear text, results and suggestions. Filters and sort survive, and any
  /// search or suggestion still in flight is superseded.
  pub fn clear(&self) {
    if self.is_disposed() {
      return;
    }
    self.inner.state.send_modify(|state| {
      self.inner.search.supersede();
      self.inner.suggest.supersede();
      *state = Arc::new(reduce(state, Action::Clear));
    });
    trace!(action = "clear", "Applied action");
  }

  // ==========================================================================
  // Search
  // ==========================================================================

  /// Start a search for the current query overlaid with `overrides`.
  ///
  /// The request is composed, its ticket issued and `SearchStarted` applied
  /// before this returns. The returned future performs the remote call and
  /// applies the response if the ticket is still the newest.
  pub fn submit_search(&self, overrides: SearchOverrides) -> impl Future<Output = Settlement> + Send + 'static {
    let begun = self.begin_search(overrides);
    let this = self.clone();
    async move {
      match begun {
        Some((ticket, request)) => this.settle_search(ticket, request).await,
        None => Settlement::Disposed,
      }
    }
  }

  fn begin_search(&self, overrides: SearchOverrides) -> Option<(Ticket, SearchRequest)> {
    if self.is_disposed() {
      debug!("Search submitted to disposed controller");
      return None;
    }

    let mut begun = None;
    self.inner.state.send_modify(|state| {
      let request = overrides.compose(&state.query, self.inner.include_facets);
      let ticket = self.inner.search.issue();
      *state = Arc::new(reduce(state, Action::SearchStarted));
      begun = Some((ticket, request));
    });

    if let Some((ticket, request)) = &begun {
      debug!(seq = ticket.seq(), query = %request.query, page = request.page, "Search submitted");
    }
    begun
  }

  async fn settle_search(&self, ticket: Ticket, request: SearchRequest) -> Settlement {
    let action = match self.inner.search.execute(ticket, &request).await {
      Ok(outcome) => Action::SearchSucceeded { outcome, at: Utc::now() },
      Err(error) => Action::SearchFailed(error),
    };

    let mut settlement = Settlement::Superseded;
    self.inner.state.send_if_modified(|state| {
      if self.inner.cancel.is_cancelled() {
        settlement = Settlement::Disposed;
        return false;
      }
      if !self.inner.search.is_current(ticket) {
        return false;
      }
      *state = Arc::new(reduce(state, action));
      settlement = Settlement::Applied;
      true
    });

    match settlement {
      Settlement::Applied => trace!(seq = ticket.seq(), "Search response applied"),
      Settlement::Superseded => debug!(
        seq = ticket.seq(),
        latest = self.latest_sequence(),
        "Dropping superseded search response"
      ),
      Settlement::Disposed => debug!(seq = ticket.seq(), "Dropping search response after dispose"),
    }
    settlement
  }

  // ==========================================================================
  // Suggestions
  // ==========================================================================

  /// Fetch typeahead suggestions for `text`.
  ///
  /// Text shorter than the configured minimum yields an empty outcome
  /// without a remote call. Otherwise the call is debounced. Either way the
  /// result is installed only if `text` is still the live query text.
  /// Returns the installed outcome, or `None` when the call was debounced,
  /// went stale or failed. Failures are logged and never reach the state's
  /// error.
  pub async fn fetch_suggestions(&self, text: &str) -> Option<SuggestionOutcome> {
    if self.is_disposed() {
      return None;
    }

    let suggest = &self.inner.suggest;
    if !suggest.qualifies(text) {
      let outcome = SuggestionOutcome::empty(text);
      let installed = self.inner.state.send_if_modified(|state| {
        if state.query.text != text {
          return false;
        }
        suggest.supersede();
        *state = Arc::new(reduce(state, Action::SuggestionsReceived(outcome.clone())));
        true
      });
      if !installed {
        debug!(query = text, "Dropping short suggestion call for stale text");
      }
      return installed.then_some(outcome);
    }

    if !suggest.debounce().await {
      return None;
    }

    self.dispatch(Action::SuggestionsRequested { query: text.to_string() });

    match suggest.fetch(text).await {
      Ok(outcome) => {
        if self.apply_suggestions(outcome.clone()) {
          Some(outcome)
        } else {
          debug!(query = text, "Dropping stale suggestions");
          None
        }
      }
      Err(e) => {
        warn!(query = text, error = %e, "Suggestion fetch failed");
        self.dispatch(Action::SuggestionsFailed { query: text.to_string() });
        None
      }
    }
  }

  fn apply_suggestions(&self, outcome: SuggestionOutcome) -> bool {
    self.inner.state.send_if_modified(|state| {
      if self.inner.cancel.is_cancelled() || state.query.text != outcome.query {
        return false;
      }
      *state = Arc::new(reduce(state, Action::SuggestionsReceived(outcome)));
      true
    })
  }

  // ==========================================================================
  // Telemetry
  // ==========================================================================

  /// Report a click on a result. Fire-and-forget: the call runs in the
  /// background and failures are only logged.
  pub fn track_result_click(&self, result_id: impl Into<String>, position: u32) {
    if self.is_disposed() {
      return;
    }

    let event = ClickEvent {
      result_id: result_id.into(),
      position,
      query: self.state().query.text.clone(),
    };

    let Ok(runtime) = tokio::runtime::Handle::try_current() else {
      warn!(result_id = %event.result_id, "No async runtime, dropping click telemetry");
      return;
    };

    let backend = self.inner.backend.clone();
    runtime.spawn(async move {
      match backend.track_click(&event).await {
        Ok(()) => trace!(result_id = %event.result_id, position = event.position, "Click tracked"),
        Err(e) => warn!(result_id = %event.result_id, error = %e, "Click telemetry failed"),
      }
    });
  }

  fn dispatch(&self, action: Action) {
    if self.is_disposed() {
      debug!(action = action.name(), "Controller disposed, dropping action");
      return;
    }
    let name = action.name();
    self.inner.state.send_modify(|state| *state = Arc::new(reduce(state, action)));
    trace!(action = name, "Applied action");
  }
}

impl std::fmt::Debug for SearchController {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SearchController")
      .field("latest_seq", &self.latest_sequence())
      .field("disposed", &self.is_disposed())
      .finish()
  }
}
