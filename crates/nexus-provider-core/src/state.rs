use std::collections::HashMap;

use serde_json::Value;

/// Mutable scratch space middlewares use to share data within one request.
/// Lives exactly as long as the request; never shared across requests.
#[derive(Debug, Clone, Default)]
pub struct PipelineState {
    values: HashMap<String, Value>,
}

impl PipelineState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}
