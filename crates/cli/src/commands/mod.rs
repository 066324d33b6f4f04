//! CLI command implementations

mod config;
mod index;
mod search;
mod shell;

pub use config::{cmd_config_init, cmd_config_path, cmd_config_show};
pub use index::{cmd_clear_analytics, cmd_index_metrics, cmd_index_remove, cmd_index_sync, cmd_index_update};
pub use search::{cmd_search, cmd_suggest};
pub use shell::cmd_shell;

use std::{collections::BTreeSet, sync::Arc};

use anyhow::{Context, Result, bail};
use quarry::{
  Config, HttpBackend, State,
  outcome::{SearchOutcome, SuggestionOutcome},
  query::facet,
};

/// Build the HTTP backend for the configured remote service.
fn connect(config: &Config) -> Result<Arc<HttpBackend>> {
  let backend = HttpBackend::new(&config.remote)
    .with_context(|| format!("Failed to set up client for {}", config.remote.base_url))?;
  Ok(Arc::new(backend))
}

/// Parse `FACET=V1,V2` into a facet selection. An empty value list selects
/// nothing, which removes the facet.
fn parse_filter(spec: &str) -> Result<(String, BTreeSet<String>)> {
  let Some((name, values)) = spec.split_once('=') else {
    bail!("Invalid filter: {}. Use FACET=VALUE[,VALUE...]", spec);
  };
  let name = name.trim();
  if name.is_empty() {
    bail!("Invalid filter: {}. Facet name is empty", spec);
  }
  let values = values.split(',').map(str::trim).filter(|v| !v.is_empty());
  Ok(facet(name, values))
}

/// Truncate text to `max` characters for one-line display
fn preview(text: &str, max: usize) -> String {
  let flat = text.replace('\n', " ");
  if flat.chars().count() > max {
    let cut: String = flat.chars().take(max).collect();
    format!("{}...", cut)
  } else {
    flat
  }
}

fn print_outcome(outcome: &SearchOutcome) {
  let p = &outcome.pagination;
  if outcome.results.is_empty() {
    println!("No results (page {} of {})", p.page, p.total_pages().max(1));
    return;
  }

  println!(
    "Page {} of {} ({} results total)\n",
    p.page,
    p.total_pages(),
    p.total
  );
  let offset = (p.page.saturating_sub(1) as u64) * p.page_size as u64;
  for (i, result) in outcome.results.iter().enumerate() {
    println!("{}. [{}] {}", offset + i as u64 + 1, result.kind, result.title);
    println!("   id: {}", result.id);
    if let Some(snippet) = &result.snippet {
      println!("   {}", preview(snippet, 160));
    }
    if let Some(url) = &result.url {
      println!("   {}", url);
    }
  }

  if !outcome.facets.is_empty() {
    println!("\nFacets:");
    for facet in &outcome.facets {
      let values: Vec<String> = facet.values.iter().map(|v| format!("{} ({})", v.value, v.count)).collect();
      println!("  {}: {}", facet.name, values.join(", "));
    }
  }

  if p.has_more {
    println!("\nMore results on page {}", p.page + 1);
  }
}

fn print_suggestions(outcome: &SuggestionOutcome) {
  if outcome.is_empty() {
    println!("No suggestions for: {}", outcome.query);
    return;
  }
  for suggestion in &outcome.suggestions {
    println!("  {} ({})", suggestion.text, suggestion.kind);
  }
}

/// Fail with the state's error, if any
fn ensure_no_error(state: &State) -> Result<()> {
  if let Some(error) = &state.error {
    match &error.context {
      Some(context) => bail!("{} ({})", error, context),
      None => bail!("{}", error),
    }
  }
  Ok(())
}
