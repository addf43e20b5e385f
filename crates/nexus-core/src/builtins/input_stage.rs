use async_trait::async_trait;
use std::sync::Arc;

use nexus_common::RequestId;
use nexus_extensions::ExtensionBus;
use nexus_guardrails::{GuardrailEngine, Phase as GuardPhase};
use nexus_provider_core::{CompletionRequest, CompletionResponse, GatewayError, GatewayResult};
use nexus_transform::TransformRegistry;

use crate::context::RequestContext;
use crate::middleware::{Middleware, Next};

/// 100–199 band: runs input guardrails over the request messages. A block
/// aborts the chain with `GuardrailBlocked`; a redact overwrites the
/// running message set before it reaches later stages (spec §4.1, §4.7).
pub struct InputGuardrailMiddleware {
    engine: Arc<GuardrailEngine>,
    bus: Arc<ExtensionBus>,
}

impl InputGuardrailMiddleware {
    pub fn new(engine: Arc<GuardrailEngine>, bus: Arc<ExtensionBus>) -> Self {
        Self { engine, bus }
    }
}

#[async_trait]
impl Middleware for InputGuardrailMiddleware {
    fn name(&self) -> &str {
        "input_guardrails"
    }
    fn priority(&self) -> i32 {
        100
    }

    async fn process(
        &self,
        ctx: &mut RequestContext,
        mut request: CompletionRequest,
        next: Next<'_>,
    ) -> GatewayResult<CompletionResponse> {
        let outcome = self
            .engine
            .check(ctx.request_id, GuardPhase::Input, request.messages.clone(), &self.bus)
            .await;
        if !outcome.allow {
            return Err(GatewayError::GuardrailBlocked {
                guard: outcome.blocked_guard.unwrap_or_default(),
                reason: outcome.block_reason.unwrap_or_default(),
            });
        }
        request.messages = outcome.messages;
        next.call(ctx, request).await
    }
}

/// 200–299 band: runs registered input transforms over the request in
/// place (spec §4.1, §4.8). Cache lookup lives in [`CacheMiddleware`],
/// which sits in the same band but is registered separately so an engine
/// without a configured cache pays nothing for it.
pub struct InputTransformMiddleware {
    transforms: Arc<TransformRegistry>,
}

impl InputTransformMiddleware {
    pub fn new(transforms: Arc<TransformRegistry>) -> Self {
        Self { transforms }
    }
}

#[async_trait]
impl Middleware for InputTransformMiddleware {
    fn name(&self) -> &str {
        "input_transforms"
    }
    fn priority(&self) -> i32 {
        210
    }

    async fn process(
        &self,
        ctx: &mut RequestContext,
        mut request: CompletionRequest,
        next: Next<'_>,
    ) -> GatewayResult<CompletionResponse> {
        self.transforms.apply_input(&mut request).await?;
        next.call(ctx, request).await
    }
}

/// 200–299 band: serves a cached response on hit, skipping the terminal
/// call entirely; stores the terminal's response on miss (spec §4.1,
/// §4.6).
pub struct CacheMiddleware {
    cache: Arc<nexus_cache::CacheEngine>,
}

impl CacheMiddleware {
    pub fn new(cache: Arc<nexus_cache::CacheEngine>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl Middleware for CacheMiddleware {
    fn name(&self) -> &str {
        "cache"
    }
    fn priority(&self) -> i32 {
        220
    }

    async fn process(
        &self,
        ctx: &mut RequestContext,
        request: CompletionRequest,
        next: Next<'_>,
    ) -> GatewayResult<CompletionResponse> {
        if let Some(hit) = self.cache.get(request_id(ctx), &request).await {
            ctx.cache_hit = true;
            return Ok(hit);
        }
        let response = next.call(ctx, request.clone()).await?;
        self.cache.set(&request, response.clone());
        Ok(response)
    }
}

fn request_id(ctx: &RequestContext) -> RequestId {
    ctx.request_id
}
