//! Query state - the user's current search intent.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Selected values per facet. A missing key leaves that facet unconstrained.
///
/// Ordered maps keep the serialized form stable, which the cache key relies on.
pub type Filters = BTreeMap<String, BTreeSet<String>>;

/// Field the remote service orders results by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
  #[default]
  Relevance,
  Date,
  Title,
  Popularity,
}

impl SortField {
  pub fn as_str(&self) -> &'static str {
    match self {
      SortField::Relevance => "relevance",
      SortField::Date => "date",
      SortField::Title => "title",
      SortField::Popularity => "popularity",
    }
  }
}

impl std::str::FromStr for SortField {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "relevance" | "score" => Ok(SortField::Relevance),
      "date" | "recent" => Ok(SortField::Date),
      "title" | "name" => Ok(SortField::Title),
      "popularity" | "popular" => Ok(SortField::Popularity),
      _ => Err(format!(
        "Invalid sort field: {}. Use relevance, date, title, or popularity",
        s
      )),
    }
  }
}

impl std::fmt::Display for SortField {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
  Ascending,
  #[default]
  Descending,
}

impl SortDirection {
  pub fn as_str(&self) -> &'static str {
    match self {
      SortDirection::Ascending => "asc",
      SortDirection::Descending => "desc",
    }
  }
}

impl std::str::FromStr for SortDirection {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "asc" | "ascending" => Ok(SortDirection::Ascending),
      "desc" | "descending" => Ok(SortDirection::Descending),
      _ => Err(format!("Invalid sort direction: {}. Use asc or desc", s)),
    }
  }
}

impl std::fmt::Display for SortDirection {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Immutable snapshot of the search intent.
///
/// Transitions never edit a `QueryState` in place; the reducer builds the next
/// one from the previous.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryState {
  /// Free-form text, empty means no query.
  pub text: String,
  pub filters: Filters,
  pub sort_field: SortField,
  pub sort_direction: SortDirection,
  /// 1-based page number.
  pub page: u32,
  pub page_size: u32,
}

impl QueryState {
  pub fn new(page_size: u32) -> Self {
    Self {
      text: String::new(),
      filters: Filters::new(),
      sort_field: SortField::default(),
      sort_direction: SortDirection::default(),
      page: 1,
      page_size: page_size.max(1),
    }
  }

  pub fn has_text(&self) -> bool {
    !self.text.trim().is_empty()
  }

  /// Number of facets carrying at least one selected value.
  pub fn active_filter_count(&self) -> usize {
    self.filters.values().filter(|v| !v.is_empty()).count()
  }
}

/// Build a single-facet filter entry, mostly useful for callers and tests.
pub fn facet<I, S>(name: &str, values: I) -> (String, BTreeSet<String>)
where
  I: IntoIterator<Item = S>,
  S: Into<String>,
{
  (name.to_string(), values.into_iter().map(Into::into).collect())
}
