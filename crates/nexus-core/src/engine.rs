use std::sync::Arc;

use nexus_extensions::{Event, ExtensionBus, RequestCompleted, RequestFailed, RequestReceived};
use nexus_provider_core::{
    CompletionRequest, CompletionResponse, CompletionStream, EmbeddingRequest, EmbeddingResponse,
    GatewayResult,
};

use tracing::instrument;

use crate::context::RequestContext;
use crate::middleware::{MiddlewareChain, Terminal};
use crate::terminal::RoutingTerminal;

/// The assembled pipeline: a priority-ordered middleware chain in front of
/// a routing terminal (spec §2, §4.1). Built once via [`crate::builder::EngineBuilder`]
/// and shared across requests.
pub struct GatewayEngine {
    chain: MiddlewareChain,
    routing: Arc<RoutingTerminal>,
    bus: Arc<ExtensionBus>,
}

impl GatewayEngine {
    pub(crate) fn new(chain: MiddlewareChain, routing: Arc<RoutingTerminal>, bus: Arc<ExtensionBus>) -> Self {
        Self { chain, routing, bus }
    }

    /// Emits `request.received` before a request enters the pipeline, from
    /// the one frame that wraps every path (chain or direct dispatch), so
    /// every emitted request id later gets exactly one of
    /// completed|failed|cached (spec §4.9, §8).
    async fn emit_received(&self, ctx: &RequestContext, model: &str) {
        self.bus
            .emit(Event::RequestReceived(RequestReceived {
                request_id: ctx.request_id,
                tenant_id: ctx.tenant_id,
                key_id: ctx.key_id,
                model: model.to_string(),
            }))
            .await;
    }

    /// Emits the terminal lifecycle event for a finished request. A cache
    /// hit already emitted `request.cached` from inside the cache engine,
    /// so it is not re-announced as completed here (spec §8's "exactly
    /// one").
    async fn emit_outcome<T>(&self, ctx: &RequestContext, model: &str, result: &GatewayResult<T>) {
        match result {
            Ok(_) if ctx.cache_hit => {}
            Ok(_) => {
                self.bus
                    .emit(Event::RequestCompleted(RequestCompleted {
                        request_id: ctx.request_id,
                        provider: ctx.provider_name.clone().unwrap_or_default(),
                        model: model.to_string(),
                        latency_ms: ctx.elapsed().as_millis() as u64,
                    }))
                    .await;
            }
            Err(err) => {
                self.bus
                    .emit(Event::RequestFailed(RequestFailed {
                        request_id: ctx.request_id,
                        reason: err.to_string(),
                    }))
                    .await;
            }
        }
    }

    /// Runs a chat completion through the full middleware chain (spec §2).
    #[instrument(skip_all, fields(request_id = %ctx.request_id, model = %request.model))]
    pub async fn complete(
        &self,
        ctx: &mut RequestContext,
        request: CompletionRequest,
    ) -> GatewayResult<CompletionResponse> {
        let model = request.model.clone();
        self.emit_received(ctx, &model).await;
        let result = self.chain.run(ctx, request, self.routing.as_ref() as &dyn Terminal).await;
        self.emit_outcome(ctx, &model, &result).await;
        result
    }

    /// Routes and resiliently dispatches a streaming completion directly to
    /// the provider. Streaming bypasses the typed middleware chain, which is
    /// built around a single materialized [`CompletionResponse`] (spec §2);
    /// cache, guardrail and transform stages that need to see streamed text
    /// operate on the stream returned here instead (spec §4.6–§4.8).
    #[instrument(skip_all, fields(request_id = %ctx.request_id, model = %request.model))]
    pub async fn complete_stream(
        &self,
        ctx: &mut RequestContext,
        request: CompletionRequest,
    ) -> GatewayResult<CompletionStream> {
        let model = request.model.clone();
        self.emit_received(ctx, &model).await;
        let result = self.complete_stream_inner(ctx, request).await;
        self.emit_outcome(ctx, &model, &result).await;
        result
    }

    async fn complete_stream_inner(
        &self,
        ctx: &mut RequestContext,
        request: CompletionRequest,
    ) -> GatewayResult<CompletionStream> {
        let (primary, fallbacks) = self.routing.select(&request, ctx.tenant_id).await?;
        let response = self
            .routing
            .executor()
            .execute(ctx.request_id, &primary, &fallbacks, &ctx.cancel, |candidate| {
                let request = request.clone();
                let provider = candidate.provider.clone();
                async move { provider.complete_stream(request).await }
            })
            .await?;
        ctx.provider_name = Some(primary.provider_name().to_string());
        Ok(response)
    }

    /// Routes and resiliently dispatches an embedding request. Embeddings
    /// never pass through the completion-typed middleware chain either, but
    /// share the same alias resolution, candidate scoring and resilience
    /// machinery (spec §2, §4.5). Routing strategies only ever read the
    /// candidate list, so an equivalent [`CompletionRequest`] carrying just
    /// the model name is enough to drive selection.
    #[instrument(skip_all, fields(request_id = %ctx.request_id, model = %request.model))]
    pub async fn embed(
        &self,
        ctx: &mut RequestContext,
        request: EmbeddingRequest,
    ) -> GatewayResult<EmbeddingResponse> {
        let model = request.model.clone();
        self.emit_received(ctx, &model).await;
        let result = self.embed_inner(ctx, request).await;
        self.emit_outcome(ctx, &model, &result).await;
        result
    }

    async fn embed_inner(
        &self,
        ctx: &mut RequestContext,
        request: EmbeddingRequest,
    ) -> GatewayResult<EmbeddingResponse> {
        let routing_request = CompletionRequest::new(request.model.clone(), Vec::new());
        let (primary, fallbacks) = self.routing.select(&routing_request, ctx.tenant_id).await?;
        let response = self
            .routing
            .executor()
            .execute(ctx.request_id, &primary, &fallbacks, &ctx.cancel, |candidate| {
                let request = request.clone();
                let provider = candidate.provider.clone();
                async move { provider.embed(request).await }
            })
            .await?;
        ctx.provider_name = Some(primary.provider_name().to_string());
        Ok(response)
    }
}
