use std::collections::HashMap;
use std::sync::Arc;

use crate::provider::Provider;

/// Maps a provider name to its handle. Long-lived, built once at engine
/// construction; reads are lock-free after that since the map itself is
/// never mutated post-build (spec §5: "per-engine-instance, read-mostly").
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, provider: Arc<dyn Provider>) {
        self.providers.insert(provider.name().to_string(), provider);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }
}
