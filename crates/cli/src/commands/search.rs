//! One-shot search and suggestion commands

use anyhow::{Context, Result, anyhow, bail};
use quarry::{
  Config, SearchController, SearchOverrides, Settlement,
  query::{Filters, SortDirection, SortField},
};
use tracing::debug;

use super::{connect, ensure_no_error, parse_filter, print_outcome, print_suggestions};

/// Run one search
#[allow(clippy::too_many_arguments)]
pub async fn cmd_search(
  config: &Config,
  query: &str,
  filters: &[String],
  sort: Option<&str>,
  direction: Option<&str>,
  page: Option<u32>,
  page_size: Option<u32>,
  no_facets: bool,
  json_output: bool,
) -> Result<()> {
  let filters = filters
    .iter()
    .map(|f| parse_filter(f))
    .collect::<Result<Filters>>()?;
  let sort_field = sort
    .map(str::parse::<SortField>)
    .transpose()
    .map_err(|e| anyhow!(e))?;
  let sort_direction = direction
    .map(str::parse::<SortDirection>)
    .transpose()
    .map_err(|e| anyhow!(e))?;

  let controller = SearchController::new(connect(config)?, config);
  controller.set_query(query);
  if !filters.is_empty() {
    controller.set_filters(filters);
  }
  if sort_field.is_some() || sort_direction.is_some() {
    let current = controller.state();
    controller.set_sort(
      sort_field.unwrap_or(current.query.sort_field),
      sort_direction.unwrap_or(current.query.sort_direction),
    );
  }
  if let Some(size) = page_size {
    controller.set_page_size(size);
  }
  // Page last: every other setter resets it
  if let Some(page) = page {
    controller.set_page(page);
  }

  let overrides = SearchOverrides::default().include_facets(!no_facets && config.search.include_facets);
  let settlement = controller.submit_search(overrides).await;
  debug!(?settlement, "Search settled");
  if settlement != Settlement::Applied {
    bail!("Search did not complete");
  }

  let state = controller.state();
  ensure_no_error(&state)?;
  let outcome = state.outcome.as_ref().context("Search returned no outcome")?;

  if json_output {
    println!("{}", serde_json::to_string_pretty(outcome)?);
    return Ok(());
  }
  print_outcome(outcome);
  Ok(())
}

/// Show suggestions for partial text
pub async fn cmd_suggest(config: &Config, text: &str, json_output: bool) -> Result<()> {
  let controller = SearchController::new(connect(config)?, config);
  controller.set_query(text);

  // Failures are swallowed by the controller and come back as nothing
  let Some(outcome) = controller.fetch_suggestions(text).await else {
    bail!("No suggestions available (service unreachable?)");
  };

  if json_output {
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    return Ok(());
  }
  print_suggestions(&outcome);
  Ok(())
}
