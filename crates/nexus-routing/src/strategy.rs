use std::sync::atomic::{AtomicUsize, Ordering};

use nexus_provider_core::{CompletionRequest, GatewayError, GatewayResult};
use rand::Rng;

use crate::candidate::Candidate;

pub const NO_HEALTHY_PROVIDERS: &str = "no healthy providers";

/// A policy selecting one candidate from the list built for this request.
/// Implementations must return a healthy candidate or
/// [`NO_HEALTHY_PROVIDERS`] (spec §4.3).
pub trait RoutingStrategy: Send + Sync {
    fn select(&self, req: &CompletionRequest, candidates: &[Candidate]) -> GatewayResult<Candidate>;
}

fn no_healthy_providers() -> GatewayError {
    GatewayError::InvalidInput(NO_HEALTHY_PROVIDERS.to_string())
}

fn healthy(candidates: &[Candidate]) -> impl Iterator<Item = (usize, &Candidate)> {
    candidates.iter().enumerate().filter(|(_, c)| c.healthy)
}

/// Try candidates in registry order; first healthy wins.
pub struct Priority;

impl RoutingStrategy for Priority {
    fn select(&self, _req: &CompletionRequest, candidates: &[Candidate]) -> GatewayResult<Candidate> {
        healthy(candidates)
            .next()
            .map(|(_, c)| c.clone())
            .ok_or_else(no_healthy_providers)
    }
}

/// Lowest cost among healthy candidates; ties broken by input order.
pub struct CostOptimized;

impl RoutingStrategy for CostOptimized {
    fn select(&self, _req: &CompletionRequest, candidates: &[Candidate]) -> GatewayResult<Candidate> {
        healthy(candidates)
            .min_by(|(ia, a), (ib, b)| {
                a.cost
                    .partial_cmp(&b.cost)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(ia.cmp(ib))
            })
            .map(|(_, c)| c.clone())
            .ok_or_else(no_healthy_providers)
    }
}

/// Lowest positive latency among healthy candidates; ties broken by input
/// order. A latency of zero (never observed) is treated as "no signal" and
/// sorts after any positive observation.
pub struct LatencyOptimized;

impl RoutingStrategy for LatencyOptimized {
    fn select(&self, _req: &CompletionRequest, candidates: &[Candidate]) -> GatewayResult<Candidate> {
        healthy(candidates)
            .min_by(|(ia, a), (ib, b)| {
                let key = |c: &Candidate| {
                    if c.latency.is_zero() {
                        (1u8, c.latency)
                    } else {
                        (0u8, c.latency)
                    }
                };
                key(a).cmp(&key(b)).then(ia.cmp(ib))
            })
            .map(|(_, c)| c.clone())
            .ok_or_else(no_healthy_providers)
    }
}

/// Next healthy index modulo the healthy-candidate count; the counter is
/// strategy-scoped and monotonically increasing, incremented atomically
/// under concurrent use (spec §4.3, §8).
#[derive(Default)]
pub struct RoundRobin {
    counter: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RoutingStrategy for RoundRobin {
    fn select(&self, _req: &CompletionRequest, candidates: &[Candidate]) -> GatewayResult<Candidate> {
        let healthy_candidates: Vec<&Candidate> = healthy(candidates).map(|(_, c)| c).collect();
        if healthy_candidates.is_empty() {
            return Err(no_healthy_providers());
        }
        let index = self.counter.fetch_add(1, Ordering::Relaxed) % healthy_candidates.len();
        Ok(healthy_candidates[index].clone())
    }
}

/// Weighted random over healthy candidates; an unspecified weight defaults
/// to 1.0. Draws uniform in `[0, sum(weights))` and consumes weights in
/// candidate order (spec §4.3).
pub struct Weighted {
    weight_of: Box<dyn Fn(&Candidate) -> f64 + Send + Sync>,
}

impl Weighted {
    /// `weight_of` maps a candidate to its configured weight (e.g. looked
    /// up from the resolved alias targets); candidates it has no opinion on
    /// should return `1.0`.
    pub fn new(weight_of: impl Fn(&Candidate) -> f64 + Send + Sync + 'static) -> Self {
        Self {
            weight_of: Box::new(weight_of),
        }
    }

    pub fn uniform() -> Self {
        Self::new(|_| 1.0)
    }
}

impl RoutingStrategy for Weighted {
    fn select(&self, _req: &CompletionRequest, candidates: &[Candidate]) -> GatewayResult<Candidate> {
        let weighted: Vec<(f64, &Candidate)> = healthy(candidates)
            .map(|(_, c)| ((self.weight_of)(c), c))
            .collect();
        if weighted.is_empty() {
            return Err(no_healthy_providers());
        }

        let total: f64 = weighted.iter().map(|(w, _)| w).sum();
        if total <= 0.0 {
            return Ok(weighted[0].1.clone());
        }

        let mut roll = rand::rng().random_range(0.0..total);
        for (weight, candidate) in &weighted {
            if roll < *weight {
                return Ok((*candidate).clone());
            }
            roll -= weight;
        }
        Ok(weighted.last().unwrap().1.clone())
    }
}
