use std::sync::Arc;
use std::time::Duration;

use nexus_provider_core::{GatewayError, GatewayResult, Provider, ProviderRegistry};

use crate::alias::Target;
use crate::health::HealthTracker;

/// A concrete `(provider, model)` option, annotated for the router. Built
/// fresh per request from a resolved target list; never cached (spec §3).
#[derive(Clone)]
pub struct Candidate {
    pub provider: Arc<dyn Provider>,
    pub model: String,
    pub cost: f64,
    pub latency: Duration,
    pub healthy: bool,
}

impl std::fmt::Debug for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Candidate")
            .field("provider", &self.provider.name())
            .field("model", &self.model)
            .field("cost", &self.cost)
            .field("latency", &self.latency)
            .field("healthy", &self.healthy)
            .finish()
    }
}

impl Candidate {
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }
}

pub struct CandidateBuilder<'a> {
    registry: &'a ProviderRegistry,
    health: &'a HealthTracker,
}

impl<'a> CandidateBuilder<'a> {
    pub fn new(registry: &'a ProviderRegistry, health: &'a HealthTracker) -> Self {
        Self { registry, health }
    }

    /// Builds candidates for a resolved target list, preserving input
    /// order. Unhealthy providers are included, not dropped; the routing
    /// strategy decides what to do with them (spec §4.2).
    pub async fn build(&self, targets: &[Target]) -> GatewayResult<Vec<Candidate>> {
        let mut candidates = Vec::with_capacity(targets.len());
        for target in targets {
            let provider = self.registry.get(&target.provider).ok_or_else(|| {
                GatewayError::InvalidInput(format!("unknown provider {}", target.provider))
            })?;

            let pricing = provider
                .models()
                .await?
                .into_iter()
                .find(|m| m.id == target.model)
                .map(|m| m.pricing.output_per_million_usd)
                .unwrap_or(0.0);

            let (latency, healthy) = self.health.observe(&target.provider);

            candidates.push(Candidate {
                provider,
                model: target.model.clone(),
                cost: pricing,
                latency,
                healthy,
            });
        }
        Ok(candidates)
    }
}
