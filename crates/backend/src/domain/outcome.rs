//! Search and suggestion outcomes as returned by the remote service.

use serde::{Deserialize, Serialize};

/// A single ranked hit. Rank order is whatever the remote service returned.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
  pub id: String,
  pub title: String,
  /// Content type, e.g. "course", "quiz", "certificate", "reel"
  #[serde(rename = "type")]
  pub kind: String,
  pub snippet: Option<String>,
  pub url: Option<String>,
  pub score: Option<f32>,
  #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
  pub metadata: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetValue {
  pub value: String,
  pub count: u64,
}

/// One filterable dimension with per-value counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facet {
  pub name: String,
  pub values: Vec<FacetValue>,
}

impl Facet {
  pub fn count_for(&self, value: &str) -> Option<u64> {
    self.values.iter().find(|v| v.value == value).map(|v| v.count)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
  pub total: u64,
  pub page: u32,
  pub page_size: u32,
  pub has_more: bool,
}

impl Pagination {
  pub fn total_pages(&self) -> u64 {
    if self.page_size == 0 {
      return 0;
    }
    self.total.div_ceil(self.page_size as u64)
  }
}

/// Results, facets and pagination from one remote response.
///
/// The three parts are always installed together and never merged with
/// another response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
  pub results: Vec<ResultRecord>,
  #[serde(default)]
  pub facets: Vec<Facet>,
  pub pagination: Pagination,
}

impl SearchOutcome {
  pub fn facet(&self, name: &str) -> Option<&Facet> {
    self.facets.iter().find(|f| f.name == name)
  }
}

/// Source a suggestion was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
  /// A popular past query
  Query,
  /// A content title
  Title,
  Tag,
  Author,
}

impl SuggestionKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      SuggestionKind::Query => "query",
      SuggestionKind::Title => "title",
      SuggestionKind::Tag => "tag",
      SuggestionKind::Author => "author",
    }
  }
}

impl std::fmt::Display for SuggestionKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

impl std::str::FromStr for SuggestionKind {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "query" => Ok(SuggestionKind::Query),
      "title" => Ok(SuggestionKind::Title),
      "tag" => Ok(SuggestionKind::Tag),
      "author" => Ok(SuggestionKind::Author),
      _ => Err(format!("Invalid suggestion type: {}", s)),
    }
  }
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
  pub text: String,
  #[serde(rename = "type")]
  pub kind: SuggestionKind,
  pub score: Option<f32>,
  /// Set when the suggestion points at a concrete result
  pub result_id: Option<String>,
}

/// Suggestions tagged with the query text they were produced for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionOutcome {
  pub query: String,
  pub suggestions: Vec<Suggestion>,
}

impl SuggestionOutcome {
  pub fn empty(query: impl Into<String>) -> Self {
    Self {
      query: query.into(),
      suggestions: Vec::new(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.suggestions.is_empty()
  }
}
