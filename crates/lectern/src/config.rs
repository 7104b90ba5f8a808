use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file (default: "lectern.db")
    /// Note: Only used when the `sqlite` feature is enabled.
    #[allow(dead_code)]
    pub sqlite_path: String,
    /// Base URL of the places/organisation/date lookup API
    /// (default: "http://localhost:8010/api")
    pub lookup_base_url: String,
    /// Base URL of the search index core
    /// (default: "http://localhost:8983/solr/talks")
    pub search_base_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `SQLITE_PATH` - SQLite database path (default: "lectern.db")
    /// - `LOOKUP_API_URL` - Lookup API base URL (default: "http://localhost:8010/api")
    /// - `SEARCH_URL` - Search index base URL (default: "http://localhost:8983/solr/talks")
    pub fn from_env() -> Self {
        Self {
            sqlite_path: env::var("SQLITE_PATH").unwrap_or_else(|_| "lectern.db".to_string()),
            lookup_base_url: env::var("LOOKUP_API_URL")
                .unwrap_or_else(|_| "http://localhost:8010/api".to_string()),
            search_base_url: env::var("SEARCH_URL")
                .unwrap_or_else(|_| "http://localhost:8983/solr/talks".to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
