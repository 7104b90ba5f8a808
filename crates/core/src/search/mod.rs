//! Search facet configuration and the search index boundary.
//!
//! Pure configuration and request building live here; the HTTP client
//! that talks to the index lives in the server crate.

mod facets;
mod types;

pub use facets::{
    bucket_name_for_range_query, range_query_for_token, DateBucket, DATE_BUCKETS,
};
pub use types::{
    base_request, FacetCounts, SearchError, SearchHit, SearchIndex, SearchRequest, SearchResults,
    FACET_FIELDS, PUBLISHED_FILTER, START_FIELD,
};
