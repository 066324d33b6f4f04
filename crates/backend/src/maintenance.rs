//! Index maintenance - admin operations outside the live search loop.
//!
//! Each call is a plain request/response against the remote service. Nothing
//! here touches controller state; the only coupling is that writes to the
//! index invalidate the result caches registered with the façade, so the
//! next search sees the new index.

use std::{sync::Arc, time::Instant};

use tracing::{debug, info, warn};

use crate::{
  cache::ResultCache,
  remote::{BulkSyncReport, BulkSyncRequest, IndexAdmin, IndexEntry, RemoteError, SearchMetrics},
};

pub struct IndexMaintenance {
  admin: Arc<dyn IndexAdmin>,
  caches: Vec<ResultCache>,
}

impl IndexMaintenance {
  pub fn new(admin: Arc<dyn IndexAdmin>) -> Self {
    Self {
      admin,
      caches: Vec::new(),
    }
  }

  /// Builder form of [`IndexMaintenance::register`].
  pub fn with_cache(mut self, cache: Option<ResultCache>) -> Self {
    self.register(cache);
    self
  }

  /// Invalidate `cache` after every successful index write. `None` (a
  /// controller with caching disabled) is ignored.
  pub fn register(&mut self, cache: Option<ResultCache>) {
    if let Some(cache) = cache {
      self.caches.push(cache);
    }
  }

  pub async fn update_index_entry(&self, entry: &IndexEntry) -> Result<(), RemoteError> {
    let start = Instant::now();
    self.admin.update_index_entry(entry).await.inspect_err(|e| {
      warn!(id = %entry.id, error = %e, "Index update failed");
    })?;
    self.invalidate();
    info!(
      id = %entry.id,
      elapsed_ms = start.elapsed().as_millis() as u64,
      "Index entry updated"
    );
    Ok(())
  }

  pub async fn remove_index_entry(&self, id: &str) -> Result<(), RemoteError> {
    let start = Instant::now();
    self.admin.remove_index_entry(id).await.inspect_err(|e| {
      warn!(id, error = %e, "Index removal failed");
    })?;
    self.invalidate();
    info!(id, elapsed_ms = start.elapsed().as_millis() as u64, "Index entry removed");
    Ok(())
  }

  pub async fn bulk_sync(&self, request: &BulkSyncRequest) -> Result<BulkSyncReport, RemoteError> {
    let start = Instant::now();
    let report = self.admin.bulk_sync(request).await.inspect_err(|e| {
      warn!(entries = request.entries.len(), error = %e, "Bulk sync failed");
    })?;
    self.invalidate();
    info!(
      entries = request.entries.len(),
      replace = request.replace,
      indexed = report.indexed,
      removed = report.removed,
      failed = report.failed.len(),
      elapsed_ms = start.elapsed().as_millis() as u64,
      "Bulk sync complete"
    );
    Ok(report)
  }

  pub async fn get_metrics(&self) -> Result<SearchMetrics, RemoteError> {
    self.admin.get_metrics().await
  }

  pub async fn clear_analytics(&self) -> Result<(), RemoteError> {
    self.admin.clear_analytics().await?;
    info!("Search analytics cleared");
    Ok(())
  }

  fn invalidate(&self) {
    for cache in &self.caches {
      cache.invalidate_all();
    }
    if !self.caches.is_empty() {
      debug!(caches = self.caches.len(), "Invalidated result caches");
    }
  }
}

impl std::fmt::Debug for IndexMaintenance {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("IndexMaintenance")
      .field("caches", &self.caches.len())
      .finish()
  }
}
