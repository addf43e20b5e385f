use std::sync::Mutex;
use std::time::{Duration, Instant};

use lru::LruCache;
use std::num::NonZeroUsize;

use nexus_provider_core::CompletionResponse;

struct Entry {
    value: CompletionResponse,
    expires_at: Instant,
}

/// Fixed-size, TTL-bounded exact-key store (spec §4.6). `maxSize` defaults
/// to 1000 entries, `ttl` to 10 minutes.
pub struct ExactStore {
    ttl: Duration,
    entries: Mutex<LruCache<String, Entry>>,
}

impl ExactStore {
    pub fn new(max_size: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(max_size).unwrap_or(NonZeroUsize::new(1).unwrap());
        Self {
            ttl,
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// On hit, promotes the entry to the MRU end. An expired entry is
    /// evicted and reported as a miss.
    pub fn get(&self, key: &str) -> Option<CompletionResponse> {
        let mut entries = self.entries.lock().expect("cache store lock poisoned");
        let expired = match entries.peek(key) {
            Some(entry) => Instant::now() >= entry.expires_at,
            None => return None,
        };
        if expired {
            entries.pop(key);
            return None;
        }
        entries.get(key).map(|entry| entry.value.clone())
    }

    pub fn set(&self, key: String, value: CompletionResponse) {
        let mut entries = self.entries.lock().expect("cache store lock poisoned");
        entries.put(
            key,
            Entry {
                value,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    pub fn delete(&self, key: &str) {
        let mut entries = self.entries.lock().expect("cache store lock poisoned");
        entries.pop(key);
    }

    pub fn clear(&self) {
        let mut entries = self.entries.lock().expect("cache store lock poisoned");
        entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache store lock poisoned").len()
    }
}

impl Default for ExactStore {
    fn default() -> Self {
        Self::new(1000, Duration::from_secs(600))
    }
}
