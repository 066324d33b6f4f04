//! Wire types exchanged with the remote search service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
  outcome::{Suggestion, SuggestionKind},
  query::{Filters, QueryState, SortDirection, SortField},
};

/// Fully composed search request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
  pub query: String,
  pub filters: Filters,
  pub sort_field: SortField,
  pub sort_direction: SortDirection,
  pub page: u32,
  pub page_size: u32,
  pub include_facets: bool,
}

impl SearchRequest {
  pub fn from_query(query: &QueryState, include_facets: bool) -> Self {
    Self {
      query: query.text.clone(),
      filters: query.filters.clone(),
      sort_field: query.sort_field,
      sort_direction: query.sort_direction,
      page: query.page,
      page_size: query.page_size,
      include_facets,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestRequest {
  pub query: String,
  pub types: Vec<SuggestionKind>,
  pub limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestResponse {
  pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickEvent {
  pub result_id: String,
  /// 0-based position in the displayed result list
  pub position: u32,
  pub query: String,
}

/// A searchable document pushed into the remote index.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
  pub id: String,
  #[serde(rename = "type")]
  pub kind: String,
  pub title: String,
  pub body: Option<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub tags: Vec<String>,
  pub author: Option<String>,
  pub url: Option<String>,
  pub updated_at: Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
  pub metadata: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BulkSyncRequest {
  pub entries: Vec<IndexEntry>,
  /// Drop index entries absent from `entries`
  #[serde(default)]
  pub replace: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedEntry {
  pub id: String,
  pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BulkSyncReport {
  pub indexed: u64,
  #[serde(default)]
  pub removed: u64,
  #[serde(default)]
  pub failed: Vec<FailedEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryCount {
  pub query: String,
  pub count: u64,
}

/// Search analytics reported by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchMetrics {
  pub total_searches: u64,
  pub unique_queries: u64,
  pub zero_result_searches: u64,
  pub total_clicks: u64,
  pub click_through_rate: f64,
  pub avg_latency_ms: f64,
  pub indexed_entries: u64,
  pub top_queries: Vec<QueryCount>,
  pub zero_result_queries: Vec<QueryCount>,
}
