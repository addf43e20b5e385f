use std::sync::Arc;

use async_trait::async_trait;
use nexus_common::TenantId;
use nexus_provider_core::{CompletionRequest, CompletionResponse, GatewayError, GatewayResult};
use nexus_resilience::ResilienceExecutor;
use nexus_routing::{AliasRegistry, Candidate, CandidateBuilder, HealthTracker, RoutingStrategy, Target};
use nexus_provider_core::ProviderRegistry;

use crate::context::RequestContext;
use crate::middleware::Terminal;

/// The default 300–399 band: alias resolution, candidate scoring, routing
/// selection, and the resilience-wrapped provider call (spec §2, §4.2–§4.4).
pub struct RoutingTerminal {
    aliases: Arc<AliasRegistry>,
    providers: Arc<ProviderRegistry>,
    health: Arc<HealthTracker>,
    strategy: Arc<dyn RoutingStrategy>,
    executor: Arc<ResilienceExecutor>,
}

impl RoutingTerminal {
    pub fn new(
        aliases: Arc<AliasRegistry>,
        providers: Arc<ProviderRegistry>,
        health: Arc<HealthTracker>,
        strategy: Arc<dyn RoutingStrategy>,
        executor: Arc<ResilienceExecutor>,
    ) -> Self {
        Self {
            aliases,
            providers,
            health,
            strategy,
            executor,
        }
    }

    /// An alias the registry doesn't know about is treated as a concrete
    /// `provider/model` pair (spec §4.2: "caller treats name as concrete").
    fn targets_for(&self, model: &str, tenant: Option<TenantId>) -> GatewayResult<Vec<Target>> {
        if let Some(targets) = self.aliases.resolve(model, tenant) {
            return Ok(targets);
        }
        let (provider, model) = model.split_once('/').ok_or_else(|| {
            GatewayError::InvalidInput(format!(
                "unknown alias {model:?} and not a concrete provider/model pair"
            ))
        })?;
        Ok(vec![Target::new(provider, model)])
    }

    /// Shared by [`Terminal::call`] and the engine's streaming/embedding
    /// paths, which bypass the typed middleware chain but still need alias
    /// resolution, candidate scoring and strategy selection (spec §2).
    pub(crate) async fn select(
        &self,
        req: &CompletionRequest,
        tenant: Option<TenantId>,
    ) -> GatewayResult<(Candidate, Vec<Candidate>)> {
        let targets = self.targets_for(&req.model, tenant)?;
        let builder = CandidateBuilder::new(&self.providers, &self.health);
        let candidates = builder.build(&targets).await?;

        let primary = self.strategy.select(req, &candidates)?;
        let fallbacks: Vec<_> = candidates
            .iter()
            .filter(|c| c.provider_name() != primary.provider_name())
            .cloned()
            .collect();
        Ok((primary, fallbacks))
    }

    pub(crate) fn executor(&self) -> &Arc<ResilienceExecutor> {
        &self.executor
    }
}

#[async_trait]
impl Terminal for RoutingTerminal {
    async fn call(
        &self,
        ctx: &mut RequestContext,
        request: CompletionRequest,
    ) -> GatewayResult<CompletionResponse> {
        let (primary, fallbacks) = self.select(&request, ctx.tenant_id).await?;

        let response = self
            .executor
            .execute(ctx.request_id, &primary, &fallbacks, &ctx.cancel, |candidate| {
                let request = request.clone();
                let provider = candidate.provider.clone();
                async move { provider.complete(request).await }
            })
            .await?;

        ctx.provider_name = Some(response.provider.clone());
        Ok(response)
    }
}
