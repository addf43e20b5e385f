use std::sync::Arc;
use std::time::Duration;

use nexus_common::RequestId;
use nexus_extensions::{Event, ExtensionBus, RequestCached};
use nexus_provider_core::{CompletionRequest, CompletionResponse};

use crate::key::completion_key;
use crate::semantic::Matcher;
use crate::stats::CacheStats;
use crate::store::ExactStore;

/// Response cache fronting the provider call (spec §4.6). The semantic
/// layer is optional: without a configured matcher, a miss on the exact
/// store is simply a miss.
pub struct CacheEngine {
    store: ExactStore,
    matcher: Option<Box<dyn Matcher>>,
    threshold: f64,
    stats: CacheStats,
    bus: Arc<ExtensionBus>,
}

impl CacheEngine {
    pub fn new(max_size: usize, ttl: Duration, bus: Arc<ExtensionBus>) -> Self {
        Self {
            store: ExactStore::new(max_size, ttl),
            matcher: None,
            threshold: 0.85,
            stats: CacheStats::new(),
            bus,
        }
    }

    pub fn with_matcher(mut self, matcher: Box<dyn Matcher>) -> Self {
        self.matcher = Some(matcher);
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Looks up a cached response for `request`. On hit, emits
    /// `request.cached` and returns it; on miss (exact or semantic),
    /// returns `None`.
    pub async fn get(
        &self,
        request_id: RequestId,
        request: &CompletionRequest,
    ) -> Option<CompletionResponse> {
        let key = completion_key(request);
        let hit = match self.store.get(&key) {
            Some(hit) => Some(hit),
            None => self.semantic_fallback(&key, request),
        };

        if hit.is_some() {
            self.stats.record_hit();
            self.bus
                .emit(Event::RequestCached(RequestCached {
                    request_id,
                    cache_key: key,
                }))
                .await;
        } else {
            self.stats.record_miss();
        }
        hit
    }

    fn semantic_fallback(
        &self,
        key: &str,
        request: &CompletionRequest,
    ) -> Option<CompletionResponse> {
        let matcher = self.matcher.as_ref()?;
        let text = query_text(request);
        let (matched_key, score) = matcher.best_match(&text)?;
        if score < self.threshold {
            return None;
        }
        let _ = key;
        self.store.get(&matched_key)
    }

    pub fn set(&self, request: &CompletionRequest, value: CompletionResponse) {
        let key = completion_key(request);
        self.store.set(key.clone(), value);
        if let Some(matcher) = &self.matcher {
            matcher.index(&key, &query_text(request));
        }
    }

    pub fn delete(&self, request: &CompletionRequest) {
        let key = completion_key(request);
        self.store.delete(&key);
        if let Some(matcher) = &self.matcher {
            matcher.remove(&key);
        }
    }

    pub fn clear(&self) {
        self.store.clear();
    }
}

/// Text the semantic matcher indexes and queries against: the concatenated
/// plain text of every message, since the matcher is meant to capture
/// "does this request mean roughly the same thing," not exact framing.
fn query_text(request: &CompletionRequest) -> String {
    request
        .messages
        .iter()
        .map(|m| m.content.as_plain_text())
        .collect::<Vec<_>>()
        .join(" ")
}

impl Default for CacheEngine {
    fn default() -> Self {
        Self::new(1000, Duration::from_secs(600), Arc::new(ExtensionBus::new()))
    }
}
