use std::{
  sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
  },
  time::Duration,
};

use tracing::trace;

use crate::{
  domain::{
    config::SuggestConfig,
    outcome::{SuggestionKind, SuggestionOutcome},
  },
  remote::{RemoteError, SearchBackend, SuggestRequest},
};

/// Low-latency typeahead pipeline.
///
/// Calls are debounced: each one starts a new generation and only the
/// newest generation still standing after the quiet period reaches the
/// remote service. Results are tagged with the text they were fetched for;
/// the controller drops them if the live text moved on.
pub struct SuggestionChannel {
  backend: Arc<dyn SearchBackend>,
  min_chars: usize,
  debounce: Duration,
  limit: usize,
  types: Vec<SuggestionKind>,
  generation: AtomicU64,
}

impl SuggestionChannel {
  pub fn new(backend: Arc<dyn SearchBackend>, config: &SuggestConfig) -> Self {
    Self {
      backend,
      min_chars: config.min_chars,
      debounce: Duration::from_millis(config.debounce_ms),
      limit: config.limit,
      types: config.types.clone(),
      generation: AtomicU64::new(0),
    }
  }

  /// Whether `text` is long enough to ask the remote service.
  pub fn qualifies(&self, text: &str) -> bool {
    text.chars().count() >= self.min_chars
  }

  /// Drop any call still waiting out its quiet period.
  pub fn supersede(&self) {
    self.generation.fetch_add(1, Ordering::SeqCst);
  }

  /// Wait out the quiet period. Returns false if a newer call arrived
  /// meanwhile, in which case this one must not fetch.
  pub async fn debounce(&self) -> bool {
    let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
    if !self.debounce.is_zero() {
      tokio::time::sleep(self.debounce).await;
    }
    let current = self.generation.load(Ordering::SeqCst);
    if current != generation {
      trace!(generation, current, "Suggestion call debounced");
      return false;
    }
    true
  }

  /// Fetch suggestions for `text`, tagged with `text`.
  pub async fn fetch(&self, text: &str) -> Result<SuggestionOutcome, RemoteError> {
    let request = SuggestRequest {
      query: text.to_string(),
      types: self.types.clone(),
      limit: self.limit,
    };
    let suggestions = self.backend.suggest(&request).await?;
    trace!(query = text, count = suggestions.len(), "Suggestions fetched");
    Ok(SuggestionOutcome {
      query: text.to_string(),
      suggestions,
    })
  }
}
