//! HTTP client for the places/organisation/date lookup API.

use async_trait::async_trait;

use lectern_core::lookup::{LookupError, LookupGateway, LookupKind, Resource};

/// HTTP implementation of the lookup gateway.
///
/// No retries and no caching live here; a failed lookup is the caller's
/// problem (and the enrichment cache treats it as a soft miss).
#[derive(Debug, Clone)]
pub struct LookupClient {
    client: reqwest::Client,
    base_url: String,
}

impl LookupClient {
    /// Create a new client with the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Build the resource URL for a lookup. Topic descriptions are
    /// keyed by full URI, so they travel as a query parameter instead
    /// of a path segment.
    fn url(&self, kind: LookupKind, identifier: &str) -> String {
        match kind {
            LookupKind::Location => format!("{}/places/{}", self.base_url, identifier),
            LookupKind::Organisation => format!("{}/organisations/{}", self.base_url, identifier),
            LookupKind::Date => format!("{}/dates/{}", self.base_url, identifier),
            LookupKind::Topic => format!("{}/topics?uri={}", self.base_url, identifier),
        }
    }
}

#[async_trait]
impl LookupGateway for LookupClient {
    async fn fetch(&self, kind: LookupKind, identifier: &str) -> Result<Resource, LookupError> {
        let response = self
            .client
            .get(self.url(kind, identifier))
            .send()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status {
                kind: kind.as_str(),
                identifier: identifier.to_string(),
                status: status.as_u16(),
            });
        }

        let data = response
            .json()
            .await
            .map_err(|e| LookupError::InvalidResponse(e.to_string()))?;

        Ok(Resource::new(identifier, data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_per_kind() {
        let client = LookupClient::new("http://localhost:8010/api");
        assert_eq!(
            client.url(LookupKind::Location, "oxpoints:40002001"),
            "http://localhost:8010/api/places/oxpoints:40002001"
        );
        assert_eq!(
            client.url(LookupKind::Organisation, "dept-42"),
            "http://localhost:8010/api/organisations/dept-42"
        );
        assert_eq!(
            client.url(LookupKind::Date, "2024-01-01"),
            "http://localhost:8010/api/dates/2024-01-01"
        );
        assert_eq!(
            client.url(LookupKind::Topic, "http://example.org/topics/physics"),
            "http://localhost:8010/api/topics?uri=http://example.org/topics/physics"
        );
    }
}
