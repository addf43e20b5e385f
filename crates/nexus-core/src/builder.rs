use std::sync::Arc;
use std::time::Duration;

use nexus_cache::CacheEngine;
use nexus_extensions::{Extension, ExtensionBus};
use nexus_guardrails::{Guard, GuardrailEngine};
use nexus_provider_core::{GatewayError, Provider, ProviderRegistry};
use nexus_resilience::{ResilienceExecutor, ResiliencePolicy};
use nexus_routing::{Alias, AliasRegistry, HealthTracker, RoutingStrategy};
use nexus_transform::{Transform, TransformRegistry};

use crate::builtins::{
    BudgetMiddleware, BudgetSource, CacheMiddleware, InputGuardrailMiddleware,
    InputTransformMiddleware, OutputStageMiddleware, UsageMiddleware, UsageSink,
};
use crate::engine::GatewayEngine;
use crate::middleware::{Middleware, MiddlewareChain};
use crate::terminal::RoutingTerminal;

/// Assembles a [`GatewayEngine`] from its pluggable parts (spec §6). Nothing
/// is wired by default except the resilience policy and the extension bus:
/// an engine with no routing strategy configured fails fast at `build()`
/// rather than guessing at one, since no strategy is safe to assume.
pub struct EngineBuilder {
    providers: ProviderRegistry,
    aliases: AliasRegistry,
    strategy: Option<Arc<dyn RoutingStrategy>>,
    policy: ResiliencePolicy,
    cache: Option<Arc<CacheEngine>>,
    guardrails: GuardrailEngine,
    transforms: TransformRegistry,
    extra_middlewares: Vec<Arc<dyn Middleware>>,
    budget_source: Option<Arc<dyn BudgetSource>>,
    usage_sink: Option<Arc<dyn UsageSink>>,
    extensions: Vec<Arc<dyn Extension>>,
    bus: Arc<ExtensionBus>,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            providers: ProviderRegistry::new(),
            aliases: AliasRegistry::new(),
            strategy: None,
            policy: ResiliencePolicy::default(),
            cache: None,
            guardrails: GuardrailEngine::new(),
            transforms: TransformRegistry::new(),
            extra_middlewares: Vec::new(),
            budget_source: None,
            usage_sink: None,
            extensions: Vec::new(),
            bus: Arc::new(ExtensionBus::new()),
        }
    }
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.providers.register(provider);
        self
    }

    pub fn with_alias(mut self, alias: Alias) -> Self {
        self.aliases.register(alias);
        self
    }

    pub fn with_routing_strategy(mut self, strategy: Arc<dyn RoutingStrategy>) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn with_resilience_policy(mut self, policy: ResiliencePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_cache(mut self, max_size: usize, ttl: Duration) -> Self {
        self.cache = Some(Arc::new(CacheEngine::new(max_size, ttl, self.bus.clone())));
        self
    }

    pub fn with_guard(mut self, guard: Arc<dyn Guard>) -> Self {
        self.guardrails.register(guard);
        self
    }

    pub fn with_transform(mut self, transform: Arc<dyn Transform>) -> Self {
        self.transforms.register(transform);
        self
    }

    pub fn with_budget_source(mut self, source: Arc<dyn BudgetSource>) -> Self {
        self.budget_source = Some(source);
        self
    }

    pub fn with_usage_sink(mut self, sink: Arc<dyn UsageSink>) -> Self {
        self.usage_sink = Some(sink);
        self
    }

    pub fn with_extension(mut self, extension: Arc<dyn Extension>) -> Self {
        self.extensions.push(extension);
        self
    }

    /// A middleware outside the built-in bands, e.g. auth or rate-limiting
    /// (0–99), which this crate leaves to the caller (spec §1, §4.1).
    pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.extra_middlewares.push(middleware);
        self
    }

    pub async fn build(self) -> Result<GatewayEngine, GatewayError> {
        let strategy = self.strategy.ok_or_else(|| {
            GatewayError::InvalidInput("no routing strategy configured".into())
        })?;

        for extension in self.extensions {
            self.bus.register(extension).await;
        }

        let providers = Arc::new(self.providers);
        let aliases = Arc::new(self.aliases);
        let health = Arc::new(HealthTracker::new());
        let executor = Arc::new(ResilienceExecutor::new(self.policy, self.bus.clone()));
        let routing = Arc::new(RoutingTerminal::new(
            aliases, providers, health, strategy, executor,
        ));

        let guardrails = Arc::new(self.guardrails);
        let transforms = Arc::new(self.transforms);

        let mut middlewares = self.extra_middlewares;
        if let Some(source) = self.budget_source {
            middlewares.push(Arc::new(BudgetMiddleware::new(source, self.bus.clone())));
        }
        middlewares.push(Arc::new(InputGuardrailMiddleware::new(
            guardrails.clone(),
            self.bus.clone(),
        )));
        middlewares.push(Arc::new(InputTransformMiddleware::new(transforms.clone())));
        // No default cache (spec §6): only wired when the caller opts in
        // with `with_cache`, since caching changes response semantics.
        if let Some(cache) = self.cache {
            middlewares.push(Arc::new(CacheMiddleware::new(cache)));
        }
        middlewares.push(Arc::new(OutputStageMiddleware::new(
            guardrails,
            transforms,
            self.bus.clone(),
        )));
        // Registered here but sorts to the true outermost position (see
        // UsageMiddleware::priority): it must see the response after every
        // other band, including output guardrails/transforms, has run.
        middlewares.push(Arc::new(UsageMiddleware::new(self.usage_sink)));

        Ok(GatewayEngine::new(
            MiddlewareChain::new(middlewares),
            routing,
            self.bus.clone(),
        ))
    }
}
