use std::{
  sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
  },
  time::Instant,
};

use tracing::{debug, trace};

use crate::{
  cache::{CacheKey, ResultCache},
  domain::{error::SearchError, outcome::SearchOutcome},
  remote::{RemoteError, SearchBackend, SearchRequest},
};

/// Sequence number issued to one search invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
  pub fn seq(&self) -> u64 {
    self.0
  }
}

impl std::fmt::Display for Ticket {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "#{}", self.0)
  }
}

/// Executes full searches against the remote service.
///
/// Every invocation takes a [`Ticket`] from a monotonically increasing
/// counter. Only the highest ticket issued so far may be applied; anything
/// older is superseded no matter when it resolves.
pub struct SearchChannel {
  backend: Arc<dyn SearchBackend>,
  cache: Option<ResultCache>,
  issued: AtomicU64,
  max_page_size: u32,
}

impl SearchChannel {
  pub fn new(backend: Arc<dyn SearchBackend>, cache: Option<ResultCache>, max_page_size: u32) -> Self {
    Self {
      backend,
      cache,
      issued: AtomicU64::new(0),
      max_page_size: max_page_size.max(1),
    }
  }

  /// Issue the next ticket, superseding every earlier one.
  pub fn issue(&self) -> Ticket {
    Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
  }

  /// Supersede every issued ticket without starting a new search.
  pub fn supersede(&self) {
    self.issued.fetch_add(1, Ordering::SeqCst);
  }

  pub fn is_current(&self, ticket: Ticket) -> bool {
    self.issued.load(Ordering::SeqCst) == ticket.0
  }

  /// Highest sequence number handed out (or burned by `supersede`).
  pub fn latest(&self) -> u64 {
    self.issued.load(Ordering::SeqCst)
  }

  pub fn cache(&self) -> Option<&ResultCache> {
    self.cache.as_ref()
  }

  /// Reject request shapes the remote service would refuse anyway.
  pub fn validate(&self, request: &SearchRequest) -> Result<(), SearchError> {
    if request.page < 1 {
      return Err(SearchError::validation(format!("page must be at least 1, got {}", request.page)));
    }
    if request.page_size < 1 || request.page_size > self.max_page_size {
      return Err(SearchError::validation(format!(
        "page_size must be between 1 and {}, got {}",
        self.max_page_size, request.page_size
      )));
    }
    Ok(())
  }

  /// Run the search for `ticket`. The caller decides whether the result is
  /// still wanted; this only executes.
  pub async fn execute(&self, ticket: Ticket, request: &SearchRequest) -> Result<SearchOutcome, SearchError> {
    let context = format!("search seq={}", ticket.0);
    self.validate(request).map_err(|e| e.with_context(context.clone()))?;

    let start = Instant::now();
    trace!(seq = ticket.0, query = %request.query, page = request.page, "Executing search");

    let result = match &self.cache {
      Some(cache) => {
        let key = CacheKey::for_request(request);
        trace!(seq = ticket.0, key = %key, "Looking up result cache");
        cache
          .get_or_load(key, self.backend.search(request))
          .await
          .map(Arc::unwrap_or_clone)
          .map_err(|e| (*e).clone())
      }
      None => self.backend.search(request).await,
    };

    match result {
      Ok(outcome) => {
        debug!(
          seq = ticket.0,
          query = %request.query,
          results = outcome.results.len(),
          total = outcome.pagination.total,
          elapsed_ms = start.elapsed().as_millis() as u64,
          "Search completed"
        );
        Ok(outcome)
      }
      Err(e) => {
        debug!(seq = ticket.0, query = %request.query, error = %e, "Search failed");
        Err(SearchError::from(e).with_context(context))
      }
    }
  }
}
