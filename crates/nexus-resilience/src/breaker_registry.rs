use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::breaker::CircuitBreaker;

/// Per-provider circuit breakers, created lazily on first use and shared
/// for the lifetime of the engine (spec §5: "circuit-breaker map: shared
/// across requests; mutated with single-writer discipline").
#[derive(Default)]
pub struct BreakerRegistry {
    threshold: u32,
    timeout: Duration,
    breakers: Mutex<HashMap<String, Arc<CircuitBreaker>>>,
}

impl BreakerRegistry {
    pub fn new(threshold: u32, timeout: Duration) -> Self {
        Self {
            threshold,
            timeout,
            breakers: Mutex::new(HashMap::new()),
        }
    }

    pub fn get_or_create(&self, provider: &str) -> Arc<CircuitBreaker> {
        let mut breakers = self.breakers.lock().expect("breaker registry lock poisoned");
        breakers
            .entry(provider.to_string())
            .or_insert_with(|| Arc::new(CircuitBreaker::new(self.threshold, self.timeout)))
            .clone()
    }
}
