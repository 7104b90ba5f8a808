use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// The kinds of identifier the lookup service can resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupKind {
    Location,
    Organisation,
    Date,
    /// Topic descriptions, fetched by canonical URI when a topic is
    /// first created pending a name.
    Topic,
}

impl LookupKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupKind::Location => "location",
            LookupKind::Organisation => "organisation",
            LookupKind::Date => "date",
            LookupKind::Topic => "topic",
        }
    }
}

/// Cache key for one lookup: the kind plus the identifier it was derived
/// from (a place id, an organisation id, or a formatted timestamp).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LookupKey {
    Location(String),
    Organisation(String),
    Date(String),
}

impl LookupKey {
    pub fn kind(&self) -> LookupKind {
        match self {
            LookupKey::Location(_) => LookupKind::Location,
            LookupKey::Organisation(_) => LookupKind::Organisation,
            LookupKey::Date(_) => LookupKind::Date,
        }
    }

    pub fn identifier(&self) -> &str {
        match self {
            LookupKey::Location(id) | LookupKey::Organisation(id) | LookupKey::Date(id) => id,
        }
    }
}

/// A resource returned by the lookup service.
///
/// The payload stays opaque JSON; only the display name is interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub identifier: String,
    pub data: Value,
}

impl Resource {
    pub fn new(identifier: impl Into<String>, data: Value) -> Self {
        Self {
            identifier: identifier.into(),
            data,
        }
    }

    /// The display name, if the service provided one.
    pub fn name(&self) -> Option<&str> {
        self.data.get("name").and_then(Value::as_str)
    }
}

/// Errors from the lookup service boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("lookup service returned {status} for {kind} {identifier}")]
    Status {
        kind: &'static str,
        identifier: String,
        status: u16,
    },
    #[error("lookup request failed: {0}")]
    Transport(String),
    #[error("invalid lookup response: {0}")]
    InvalidResponse(String),
}

/// External service resolving opaque identifiers to resources.
///
/// Implementations do not retry and do not cache; both concerns belong
/// to callers (and the only caching caller is the enrichment cache).
#[async_trait]
pub trait LookupGateway: Send + Sync {
    async fn fetch(&self, kind: LookupKind, identifier: &str) -> Result<Resource, LookupError>;
}
