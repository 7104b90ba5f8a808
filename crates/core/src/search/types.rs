use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::facets::{range_query_for_token, DATE_BUCKETS};

/// Facet dimensions counted on every search.
pub const FACET_FIELDS: [&str; 3] = ["speakers", "location", "topics"];

/// Index field holding the event start timestamp.
pub const START_FIELD: &str = "start";

/// Filter restricting results to published events.
pub const PUBLISHED_FILTER: &str = "status:published";

/// One request against the search index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    pub query: String,
    pub filter_queries: Vec<String>,
    pub facet_fields: Vec<String>,
    pub facet_queries: Vec<String>,
    pub facet_min_count: u32,
    pub page: u32,
    pub rows: u32,
}

/// Builds the base request for a free-text query.
///
/// Always filters to published events, requests facet counts (minimum
/// count 1) over the three facet dimensions, and ORs in every date
/// bucket as a facet query so one search call also returns the count of
/// matches per bucket.
pub fn base_request(query: &str) -> SearchRequest {
    SearchRequest {
        query: if query.trim().is_empty() {
            "*:*".to_string()
        } else {
            query.to_string()
        },
        filter_queries: vec![PUBLISHED_FILTER.to_string()],
        facet_fields: FACET_FIELDS.iter().map(|f| f.to_string()).collect(),
        facet_queries: DATE_BUCKETS
            .iter()
            .map(|b| format!("{START_FIELD}:{}", b.range_query))
            .collect(),
        facet_min_count: 1,
        page: 0,
        rows: 20,
    }
}

impl SearchRequest {
    /// Narrows the request to one date bucket, resolved from its URL
    /// token. None for an unknown token.
    pub fn with_date_token(mut self, token: &str) -> Option<Self> {
        let range_query = range_query_for_token(token)?;
        self.filter_queries
            .push(format!("{START_FIELD}:{range_query}"));
        Some(self)
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }
}

/// One matching event from the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub start: Option<String>,
}

/// Facet counts returned alongside the hits, as (value, count) pairs in
/// the order the index reported them. Date bucket counts are keyed by
/// the bucket display name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetCounts {
    pub speakers: Vec<(String, u64)>,
    pub location: Vec<(String, u64)>,
    pub topics: Vec<(String, u64)>,
    pub date_buckets: Vec<(String, u64)>,
}

/// The outcome of one search call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResults {
    pub total: u64,
    pub hits: Vec<SearchHit>,
    pub facets: FacetCounts,
}

/// Errors from the search index boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("search index returned {status}")]
    Status { status: u16 },
    #[error("search request failed: {0}")]
    Transport(String),
    #[error("invalid search response: {0}")]
    InvalidResponse(String),
}

/// External search index boundary.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResults, SearchError>;
}
