use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct ResiliencePolicy {
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub retry_backoff: f64,
    pub timeout: Duration,
    pub circuit_threshold: u32,
    pub circuit_timeout: Duration,
}

impl Default for ResiliencePolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            retry_delay: Duration::from_millis(500),
            retry_backoff: 2.0,
            timeout: Duration::from_secs(30),
            circuit_threshold: 5,
            circuit_timeout: Duration::from_secs(30),
        }
    }
}
