//! Lookup gateway boundary and per-event enrichment.
//!
//! The gateway resolves opaque place/organisation/date identifiers to
//! descriptive resources. Callers never cache at the gateway itself; the
//! only caching is the request-scoped [`EnrichmentCache`] below.

mod cache;
mod types;

pub use cache::EnrichmentCache;
pub use types::{LookupError, LookupGateway, LookupKey, LookupKind, Resource};
