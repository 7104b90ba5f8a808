//! Application state with repository-based storage.
//!
//! This module defines the shared application state that is passed to all
//! request handlers. It holds repository trait objects for storage
//! abstraction plus the two external-service clients, with the storage
//! backend selected at compile time via feature flags.

use std::sync::Arc;

use lectern_core::lookup::LookupGateway;
use lectern_core::search::SearchIndex;
use lectern_core::storage::{
    EventRepository, GroupRepository, MembershipRepository, PersonRepository, TopicRepository,
};

use crate::config::Config;
use crate::lookup_gateway::LookupClient;
use crate::search_index::SolrSearchIndex;

/// Shared application state.
///
/// This is cloned for each request handler and contains shared resources
/// including repository trait objects for database access.
#[derive(Clone)]
pub struct AppState {
    pub events: Arc<dyn EventRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub persons: Arc<dyn PersonRepository>,
    pub topics: Arc<dyn TopicRepository>,
    pub memberships: Arc<dyn MembershipRepository>,
    /// Lookup gateway for place/organisation/date enrichment.
    pub lookup: Arc<dyn LookupGateway>,
    /// Search index boundary.
    pub search: Arc<dyn SearchIndex>,
}

impl AppState {
    /// Creates an AppState from one repository implementing every
    /// storage trait, plus the external-service clients.
    fn from_repository<R>(repository: Arc<R>, config: &Config) -> Self
    where
        R: EventRepository
            + GroupRepository
            + PersonRepository
            + TopicRepository
            + MembershipRepository
            + 'static,
    {
        Self {
            events: repository.clone(),
            groups: repository.clone(),
            persons: repository.clone(),
            topics: repository.clone(),
            memberships: repository,
            lookup: Arc::new(LookupClient::new(&config.lookup_base_url)),
            search: Arc::new(SolrSearchIndex::new(&config.search_base_url)),
        }
    }
}

#[cfg(feature = "sqlite")]
mod sqlite_backend {
    use super::*;
    use crate::storage::SqliteRepository;

    impl AppState {
        /// Creates AppState with SQLite storage.
        pub async fn new(config: &Config) -> Result<Self, anyhow::Error> {
            let repository = Arc::new(SqliteRepository::new(&config.sqlite_path).await?);
            Ok(Self::from_repository(repository, config))
        }
    }
}

#[cfg(feature = "inmemory")]
mod inmemory_backend {
    use super::*;
    use crate::storage::InMemoryRepository;

    impl AppState {
        /// Creates AppState with in-memory storage.
        /// Useful for development without any external dependencies.
        pub async fn new(config: &Config) -> Result<Self, anyhow::Error> {
            let repository = Arc::new(InMemoryRepository::new());
            Ok(Self::from_repository(repository, config))
        }
    }
}

// ============================================================================
// Test support - in-memory storage plus stubbed external services
// ============================================================================
