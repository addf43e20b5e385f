use async_trait::async_trait;
use std::sync::Arc;

use nexus_common::{KeyId, RequestId, TenantId, UsageId};
use nexus_provider_core::{CompletionRequest, CompletionResponse, GatewayResult};

use crate::context::RequestContext;
use crate::middleware::{Middleware, Next};

/// One usage observation. Persistence is an external collaborator (spec
/// §1); the engine only ever constructs the record and hands it off
/// fire-and-forget (spec §1's "cross-region consistency of usage
/// accounting" non-goal).
#[derive(Debug, Clone)]
pub struct UsageRecord {
    pub id: UsageId,
    pub tenant_id: Option<TenantId>,
    pub key_id: Option<KeyId>,
    pub request_id: RequestId,
    pub provider: Option<String>,
    pub model: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
    pub cached: bool,
    pub latency: std::time::Duration,
}

/// Best-effort usage sink. A failing sink never fails the request, since
/// the call happens after the response is already decided.
pub trait UsageSink: Send + Sync {
    fn record(&self, record: UsageRecord);
}

/// Priority below the 0–99 band, not in the nominal 500–599 one: this
/// middleware wraps every other band, so it only sees a response after
/// output guardrails and output transforms have already run on it, and
/// never runs at all for a request an earlier band rejected. The
/// `request.completed`/`request.failed` lifecycle events are the engine's
/// responsibility, not this middleware's (spec §4.9, §8): the engine is
/// the only frame that also covers streaming and embeddings, neither of
/// which passes through this chain.
pub struct UsageMiddleware {
    sink: Option<Arc<dyn UsageSink>>,
}

impl UsageMiddleware {
    pub fn new(sink: Option<Arc<dyn UsageSink>>) -> Self {
        Self { sink }
    }
}

#[async_trait]
impl Middleware for UsageMiddleware {
    fn name(&self) -> &str {
        "usage"
    }
    fn priority(&self) -> i32 {
        -10
    }

    async fn process(
        &self,
        ctx: &mut RequestContext,
        request: CompletionRequest,
        next: Next<'_>,
    ) -> GatewayResult<CompletionResponse> {
        let model = request.model.clone();
        let response = next.call(ctx, request).await?;
        if let Some(sink) = &self.sink {
            sink.record(UsageRecord {
                id: UsageId::new(),
                tenant_id: ctx.tenant_id,
                key_id: ctx.key_id,
                request_id: ctx.request_id,
                provider: Some(response.provider.clone()),
                model,
                prompt_tokens: response.usage.prompt_tokens,
                completion_tokens: response.usage.completion_tokens,
                total_tokens: response.usage.total_tokens,
                cached: ctx.cache_hit,
                latency: ctx.elapsed(),
            });
        }
        Ok(response)
    }
}
