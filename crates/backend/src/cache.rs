//! Result caching for the search channel
//!
//! [`CacheKey`] gives every effective search request a stable identity, so
//! two requests that mean the same thing share a cached outcome no matter how
//! their filters were assembled. [`ResultCache`] holds outcomes by that key
//! and coalesces concurrent identical lookups into one remote call.
//!
//! Entries are scoped to an invalidation epoch. A load still running when the
//! cache is invalidated finishes under the old epoch, so its outcome is never
//! served to lookups made after the invalidation.

use std::{
  future::Future,
  sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
  },
  time::Duration,
};

use moka::future::Cache;
use sha2::{Digest, Sha256};

use crate::{domain::outcome::SearchOutcome, remote::SearchRequest};

/// Stable identity of an effective search request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
  /// Derive the key from a composed request.
  ///
  /// Filters are ordered maps of ordered sets, so the serialized form is
  /// canonical and the digest only depends on the request's meaning.
  pub fn for_request(request: &SearchRequest) -> Self {
    let mut hasher = Sha256::new();
    match serde_json::to_vec(request) {
      Ok(bytes) => hasher.update(&bytes),
      // Unreachable for plain strings, maps and enums.
      Err(_) => hasher.update(format!("{request:?}").as_bytes()),
    }
    Self(hex::encode(hasher.finalize()))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl std::fmt::Display for CacheKey {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0[..12.min(self.0.len())])
  }
}

/// Bounded, TTL-limited outcome cache. Cheap to clone; clones share entries.
#[derive(Clone)]
pub struct ResultCache {
  cache: Cache<(u64, CacheKey), Arc<SearchOutcome>>,
  epoch: Arc<AtomicU64>,
}

impl ResultCache {
  pub fn new(capacity: u64, ttl: Duration) -> Self {
    Self {
      cache: Cache::builder().max_capacity(capacity).time_to_live(ttl).build(),
      epoch: Arc::new(AtomicU64::new(0)),
    }
  }

  fn epoch(&self) -> u64 {
    self.epoch.load(Ordering::SeqCst)
  }

  pub async fn get(&self, key: &CacheKey) -> Option<Arc<SearchOutcome>> {
    self.cache.get(&(self.epoch(), key.clone())).await
  }

  /// Return the cached outcome or run `load`, sharing one in-flight load
  /// between concurrent callers with the same key. Failures are not cached.
  pub async fn get_or_load<F, E>(&self, key: CacheKey, load: F) -> Result<Arc<SearchOutcome>, Arc<E>>
  where
    F: Future<Output = Result<SearchOutcome, E>>,
    E: Send + Sync + 'static,
  {
    let scoped = (self.epoch(), key);
    let result = self
      .cache
      .try_get_with(scoped.clone(), async move { load.await.map(Arc::new) })
      .await;

    // Invalidated while loading: the outcome may predate the change.
    if scoped.0 != self.epoch() {
      self.cache.invalidate(&scoped).await;
    }
    result
  }

  /// Drop every cached outcome, e.g. after the index changed. Loads already
  /// in flight are not cached once they finish.
  pub fn invalidate_all(&self) {
    self.epoch.fetch_add(1, Ordering::SeqCst);
    self.cache.invalidate_all();
  }

  pub fn entry_count(&self) -> u64 {
    self.cache.entry_count()
  }
}

impl std::fmt::Debug for ResultCache {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ResultCache")
      .field("entries", &self.cache.entry_count())
      .finish()
  }
}
