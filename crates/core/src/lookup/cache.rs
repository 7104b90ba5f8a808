use std::collections::HashMap;

use crate::events::Event;

use super::{LookupGateway, LookupKey, LookupKind, Resource};

/// Request-scoped enrichment for a single event.
///
/// Maps lookup keys to fetched resources. A cache is built fresh for one
/// in-memory event lifetime (typically one request) and is never shared
/// across requests or persisted.
///
/// Successes are cached; failures are not. A failed lookup is logged and
/// reported as absent, and the next resolve on the same key attempts the
/// fetch again, so a transient outage cannot pin "missing" for the rest
/// of the request.
#[derive(Debug, Default)]
pub struct EnrichmentCache {
    entries: HashMap<LookupKey, Resource>,
}

impl EnrichmentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derives the cache key for an event and kind.
    ///
    /// None when the event carries no reference for that kind (no
    /// location, no organiser, or no start date).
    fn key_for(event: &Event, kind: LookupKind) -> Option<LookupKey> {
        match kind {
            LookupKind::Location => event.location.clone().map(LookupKey::Location),
            LookupKind::Organisation => event.organiser.clone().map(LookupKey::Organisation),
            LookupKind::Date => event.start.map(|s| LookupKey::Date(s.to_rfc3339())),
            // Topics are not an event-level enrichment.
            LookupKind::Topic => None,
        }
    }

    /// Resolves enrichment for one kind, fetching through the gateway on
    /// a cache miss.
    pub async fn resolve(
        &mut self,
        gateway: &dyn LookupGateway,
        event: &Event,
        kind: LookupKind,
    ) -> Option<&Resource> {
        let key = Self::key_for(event, kind)?;

        if !self.entries.contains_key(&key) {
            match gateway.fetch(kind, key.identifier()).await {
                Ok(resource) => {
                    self.entries.insert(key.clone(), resource);
                }
                Err(err) => {
                    tracing::warn!(
                        kind = kind.as_str(),
                        identifier = key.identifier(),
                        error = %err,
                        "lookup failed, leaving enrichment absent"
                    );
                    return None;
                }
            }
        }

        self.entries.get(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::LookupError;

    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::json;

    /// Gateway double that counts calls and can be flipped between
    /// failing and succeeding.
    #[derive(Default)]
    struct FlippableGateway {
        calls: AtomicUsize,
        failing: AtomicBool,
    }

    impl FlippableGateway {
        fn failing() -> Self {
            let gateway = Self::default();
            gateway.failing.store(true, Ordering::SeqCst);
            gateway
        }

        fn recover(&self) {
            self.failing.store(false, Ordering::SeqCst);
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LookupGateway for FlippableGateway {
        async fn fetch(
            &self,
            kind: LookupKind,
            identifier: &str,
        ) -> Result<Resource, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                return Err(LookupError::Transport("connection refused".to_string()));
            }
            Ok(Resource::new(
                identifier,
                json!({"name": format!("{} resource", kind.as_str())}),
            ))
        }
    }

    fn located_event() -> Event {
        let mut event = Event::new("Enrichable");
        event.location = Some("oxpoints:40002001".to_string());
        event.organiser = Some("dept-physics".to_string());
        event
    }

    #[tokio::test]
    async fn test_failure_not_cached_then_success_cached() {
        let gateway = FlippableGateway::failing();
        let event = located_event();
        let mut cache = EnrichmentCache::new();

        // First call fails: absent result, nothing cached.
        let first = cache
            .resolve(&gateway, &event, LookupKind::Location)
            .await
            .cloned();
        assert!(first.is_none());
        assert!(cache.is_empty());
        assert_eq!(gateway.calls(), 1);

        // Gateway recovers: second call fetches and caches.
        gateway.recover();
        let second = cache
            .resolve(&gateway, &event, LookupKind::Location)
            .await
            .cloned();
        assert!(second.is_some());
        assert_eq!(cache.len(), 1);
        assert_eq!(gateway.calls(), 2);

        // Third call is served from the cache.
        let third = cache
            .resolve(&gateway, &event, LookupKind::Location)
            .await
            .cloned();
        assert_eq!(third, second);
        assert_eq!(gateway.calls(), 2);
    }

    #[tokio::test]
    async fn test_absent_reference_skips_gateway() {
        let gateway = FlippableGateway::default();
        let event = Event::new("Bare");
        let mut cache = EnrichmentCache::new();

        assert!(cache
            .resolve(&gateway, &event, LookupKind::Location)
            .await
            .is_none());
        assert!(cache
            .resolve(&gateway, &event, LookupKind::Date)
            .await
            .is_none());
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_kinds_cached_independently() {
        let gateway = FlippableGateway::default();
        let event = located_event().with_start(Utc::now());
        let mut cache = EnrichmentCache::new();

        assert!(cache
            .resolve(&gateway, &event, LookupKind::Location)
            .await
            .is_some());
        assert!(cache
            .resolve(&gateway, &event, LookupKind::Organisation)
            .await
            .is_some());
        assert!(cache
            .resolve(&gateway, &event, LookupKind::Date)
            .await
            .is_some());
        assert_eq!(cache.len(), 3);
        assert_eq!(gateway.calls(), 3);
    }
}
