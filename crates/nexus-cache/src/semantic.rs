use std::sync::Mutex;

use nexus_provider_core::CompletionResponse;

use crate::store::ExactStore;

/// A best-effort similarity oracle over indexed cache keys. Implementations
/// might embed the request text and do a nearest-neighbor search; the
/// default `Default` implementation here never matches anything, which
/// keeps a semantic layer with no configured matcher a safe no-op.
pub trait Matcher: Send + Sync {
    /// Indexes `key` under `text` so a future query can find it. Indexing
    /// failures are non-fatal (spec §4.6) and simply not recorded.
    fn index(&self, key: &str, text: &str);

    /// Removes `key` from the index, best-effort.
    fn remove(&self, key: &str);

    /// Returns the best matching key for `text` and its similarity score,
    /// if the index has anything to offer.
    fn best_match(&self, text: &str) -> Option<(String, f64)>;
}

/// A trivial in-memory matcher: exact-text equality only. Useful as a
/// default and in tests; real deployments supply an embedding-backed
/// matcher behind the same trait.
#[derive(Default)]
pub struct ExactTextMatcher {
    index: Mutex<Vec<(String, String)>>,
}

impl Matcher for ExactTextMatcher {
    fn index(&self, key: &str, text: &str) {
        let mut index = self.index.lock().expect("matcher lock poisoned");
        index.push((key.to_string(), text.to_string()));
    }

    fn remove(&self, key: &str) {
        let mut index = self.index.lock().expect("matcher lock poisoned");
        index.retain(|(k, _)| k != key);
    }

    fn best_match(&self, text: &str) -> Option<(String, f64)> {
        let index = self.index.lock().expect("matcher lock poisoned");
        index
            .iter()
            .find(|(_, indexed_text)| indexed_text == text)
            .map(|(key, _)| (key.clone(), 1.0))
    }
}

/// Wraps an [`ExactStore`] with an optional similarity layer (spec §4.6).
/// On an exact miss, the matcher is queried for the best key within
/// `threshold`; a qualifying match re-queries the exact store under that
/// key instead.
pub struct SemanticCache<M: Matcher> {
    store: ExactStore,
    matcher: M,
    threshold: f64,
}

impl<M: Matcher> SemanticCache<M> {
    pub fn new(store: ExactStore, matcher: M) -> Self {
        Self {
            store,
            matcher,
            threshold: 0.85,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn get(&self, key: &str, text: &str) -> Option<CompletionResponse> {
        if let Some(hit) = self.store.get(key) {
            return Some(hit);
        }
        let (matched_key, score) = self.matcher.best_match(text)?;
        if score < self.threshold {
            return None;
        }
        self.store.get(&matched_key)
    }

    pub fn set(&self, key: String, text: &str, value: CompletionResponse) {
        self.store.set(key.clone(), value);
        self.matcher.index(&key, text);
    }

    pub fn delete(&self, key: &str) {
        self.store.delete(key);
        self.matcher.remove(key);
    }

    pub fn clear(&self) {
        self.store.clear();
    }
}
