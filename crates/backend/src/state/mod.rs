//! Search session state and the reducer that advances it.
//!
//! `reduce` is the only place a [`State`] changes. It is pure: no I/O, no
//! clock, no randomness. Timestamps arrive inside the actions.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{
  error::SearchError,
  outcome::{Facet, Pagination, ResultRecord, SearchOutcome, SuggestionOutcome},
  query::{Filters, QueryState, SortDirection, SortField},
};

/// Aggregate read model exposed to presentation code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct State {
  pub query: QueryState,
  /// Last successful search; kept while a later search fails.
  pub outcome: Option<SearchOutcome>,
  /// Suggestions for `query.text`, never for an older text.
  pub suggestions: Option<SuggestionOutcome>,
  pub searching: bool,
  pub suggesting: bool,
  pub error: Option<SearchError>,
  pub last_searched_at: Option<DateTime<Utc>>,
  /// Upper bound applied to `query.page_size`.
  pub max_page_size: u32,
}

impl State {
  pub fn new(page_size: u32, max_page_size: u32) -> Self {
    let max_page_size = max_page_size.max(1);
    Self {
      query: QueryState::new(page_size.min(max_page_size)),
      outcome: None,
      suggestions: None,
      searching: false,
      suggesting: false,
      error: None,
      last_searched_at: None,
      max_page_size,
    }
  }

  pub fn results(&self) -> &[ResultRecord] {
    self.outcome.as_ref().map(|o| o.results.as_slice()).unwrap_or_default()
  }

  pub fn facets(&self) -> &[Facet] {
    self.outcome.as_ref().map(|o| o.facets.as_slice()).unwrap_or_default()
  }

  pub fn pagination(&self) -> Option<&Pagination> {
    self.outcome.as_ref().map(|o| &o.pagination)
  }

  pub fn has_more(&self) -> bool {
    self.pagination().is_some_and(|p| p.has_more)
  }

  pub fn suggestion_texts(&self) -> Vec<&str> {
    self
      .suggestions
      .as_ref()
      .map(|s| s.suggestions.iter().map(|s| s.text.as_str()).collect())
      .unwrap_or_default()
  }
}

/// Every transition the reducer understands.
#[derive(Debug, Clone)]
pub enum Action {
  SetQuery(String),
  /// Shallow merge per facet; an empty selection removes the facet.
  SetFilters(Filters),
  SetSort(SortField, SortDirection),
  SetPage(u32),
  SetPageSize(u32),
  SearchStarted,
  SearchSucceeded {
    outcome: SearchOutcome,
    at: DateTime<Utc>,
  },
  SearchFailed(SearchError),
  SuggestionsRequested {
    query: String,
  },
  SuggestionsReceived(SuggestionOutcome),
  SuggestionsFailed {
    query: String,
  },
  Clear,
  ResetFilters,
}

impl Action {
  /// Short name for logs.
  pub fn name(&self) -> &'static str {
    match self {
      Action::SetQuery(_) => "set_query",
      Action::SetFilters(_) => "set_filters",
      Action::SetSort(..) => "set_sort",
      Action::SetPage(_) => "set_page",
      Action::SetPageSize(_) => "set_page_size",
      Action::SearchStarted => "search_started",
      Action::SearchSucceeded { .. } => "search_succeeded",
      Action::SearchFailed(_) => "search_failed",
      Action::SuggestionsRequested { .. } => "suggestions_requested",
      Action::SuggestionsReceived(_) => "suggestions_received",
      Action::SuggestionsFailed { .. } => "suggestions_failed",
      Action::Clear => "clear",
      Action::ResetFilters => "reset_filters",
    }
  }
}

/// Produce the state that follows `state` under `action`.
pub fn reduce(state: &State, action: Action) -> State {
  let mut next = state.clone();

  match action {
    Action::SetQuery(text) => {
      if next.suggestions.as_ref().is_some_and(|s| s.query != text) {
        next.suggestions = None;
      }
      if text != next.query.text {
        next.suggesting = false;
      }
      next.query.text = text;
      next.query.page = 1;
    }
    Action::SetFilters(partial) => {
      for (facet, selected) in partial {
        if selected.is_empty() {
          next.query.filters.remove(&facet);
        } else {
          next.query.filters.insert(facet, selected);
        }
      }
      next.query.page = 1;
    }
    Action::SetSort(field, direction) => {
      next.query.sort_field = field;
      next.query.sort_direction = direction;
      next.query.page = 1;
    }
    Action::SetPage(page) => {
      next.query.page = page.max(1);
    }
    Action::SetPageSize(size) => {
      next.query.page_size = size.clamp(1, next.max_page_size);
      next.query.page = 1;
    }
    Action::SearchStarted => {
      next.searching = true;
      next.error = None;
    }
    Action::SearchSucceeded { outcome, at } => {
      next.searching = false;
      next.outcome = Some(outcome);
      next.last_searched_at = Some(at);
    }
    Action::SearchFailed(error) => {
      next.searching = false;
      next.error = Some(error);
    }
    Action::SuggestionsRequested { query } => {
      if query == next.query.text {
        next.suggesting = true;
      }
    }
    Action::SuggestionsReceived(outcome) => {
      if outcome.query == next.query.text {
        next.suggestions = Some(outcome);
        next.suggesting = false;
      }
    }
    Action::SuggestionsFailed { query } => {
      if query == next.query.text {
        next.suggesting = false;
      }
    }
    Action::Clear => {
      next.query.text.clear();
      next.query.page = 1;
      next.outcome = None;
      next.suggestions = None;
      next.error = None;
      next.searching = false;
      next.suggesting = false;
    }
    Action::ResetFilters => {
      next.query.filters.clear();
      next.query.page = 1;
    }
  }

  next
}
