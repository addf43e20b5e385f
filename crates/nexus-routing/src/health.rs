use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
struct HealthSample {
    latency: Duration,
    healthy: bool,
}

/// Shared, request-external record of the latest observed latency and
/// health for each provider. Updated after every provider call; read by the
/// candidate builder when scoring candidates for the next request.
#[derive(Default)]
pub struct HealthTracker {
    samples: RwLock<HashMap<String, HealthSample>>,
}

impl HealthTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, provider: &str, latency: Duration, healthy: bool) {
        self.samples
            .write()
            .expect("health tracker lock poisoned")
            .insert(provider.to_string(), HealthSample { latency, healthy });
    }

    /// `(latency, healthy)` for a provider that has never reported is a
    /// zero latency, healthy default: an unseen provider is assumed
    /// healthy until proven otherwise, matching the breaker's own
    /// closed-by-default posture.
    pub fn observe(&self, provider: &str) -> (Duration, bool) {
        self.samples
            .read()
            .expect("health tracker lock poisoned")
            .get(provider)
            .map(|s| (s.latency, s.healthy))
            .unwrap_or((Duration::ZERO, true))
    }
}
