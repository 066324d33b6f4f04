//! Index maintenance commands (admin)

use std::path::Path;

use anyhow::{Context, Result};
use quarry::{
  Config, IndexMaintenance,
  remote::{BulkSyncRequest, IndexEntry},
};

use super::connect;

fn maintenance(config: &Config) -> Result<IndexMaintenance> {
  Ok(IndexMaintenance::new(connect(config)?))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
  let content = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
  serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Create or replace one entry
pub async fn cmd_index_update(config: &Config, file: &Path) -> Result<()> {
  let entry: IndexEntry = read_json(file)?;
  maintenance(config)?
    .update_index_entry(&entry)
    .await
    .with_context(|| format!("Failed to update entry {}", entry.id))?;
  println!("Updated entry: {}", entry.id);
  Ok(())
}

/// Remove one entry
pub async fn cmd_index_remove(config: &Config, id: &str) -> Result<()> {
  maintenance(config)?
    .remove_index_entry(id)
    .await
    .with_context(|| format!("Failed to remove entry {}", id))?;
  println!("Removed entry: {}", id);
  Ok(())
}

/// Push a batch of entries
pub async fn cmd_index_sync(config: &Config, file: &Path, full: bool) -> Result<()> {
  let entries: Vec<IndexEntry> = read_json(file)?;
  let request = BulkSyncRequest { entries, replace: full };
  let report = maintenance(config)?
    .bulk_sync(&request)
    .await
    .context("Bulk sync failed")?;

  println!("Bulk sync complete");
  println!("  Indexed: {}", report.indexed);
  if full {
    println!("  Removed: {}", report.removed);
  }
  if !report.failed.is_empty() {
    println!("  Failed:  {}", report.failed.len());
    for failed in report.failed.iter().take(10) {
      println!("    - {}: {}", failed.id, failed.reason);
    }
    if report.failed.len() > 10 {
      println!("    ... and {} more", report.failed.len() - 10);
    }
  }
  Ok(())
}

/// Show search analytics
pub async fn cmd_index_metrics(config: &Config, json_output: bool) -> Result<()> {
  let metrics = maintenance(config)?
    .get_metrics()
    .await
    .context("Failed to get metrics")?;

  if json_output {
    println!("{}", serde_json::to_string_pretty(&metrics)?);
    return Ok(());
  }

  println!("Search Metrics");
  println!("==============\n");
  println!("Searches:       {}", metrics.total_searches);
  println!("Unique queries: {}", metrics.unique_queries);
  println!("Zero results:   {}", metrics.zero_result_searches);
  println!("Clicks:         {}", metrics.total_clicks);
  println!("Click-through:  {:.1}%", metrics.click_through_rate * 100.0);
  println!("Avg latency:    {:.1} ms", metrics.avg_latency_ms);
  println!("Indexed:        {}", metrics.indexed_entries);

  if !metrics.top_queries.is_empty() {
    println!("\n--- Top Queries ---");
    for q in metrics.top_queries.iter().take(10) {
      println!("  {:>6}  {}", q.count, q.query);
    }
  }
  if !metrics.zero_result_queries.is_empty() {
    println!("\n--- Zero-Result Queries ---");
    for q in metrics.zero_result_queries.iter().take(10) {
      println!("  {:>6}  {}", q.count, q.query);
    }
  }
  Ok(())
}

/// Reset search analytics
pub async fn cmd_clear_analytics(config: &Config) -> Result<()> {
  maintenance(config)?
    .clear_analytics()
    .await
    .context("Failed to clear analytics")?;
  println!("Search analytics cleared");
  Ok(())
}
