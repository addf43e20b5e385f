use async_trait::async_trait;
use std::sync::Arc;

use nexus_extensions::ExtensionBus;
use nexus_guardrails::{GuardrailEngine, Phase as GuardPhase};
use nexus_provider_core::{CompletionRequest, CompletionResponse, GatewayError, GatewayResult};
use nexus_transform::TransformRegistry;

use crate::context::RequestContext;
use crate::middleware::{Middleware, Next};

/// 400–499 band: runs output guardrails and output transforms over the
/// terminal response's choices (spec §4.1, §4.7, §4.8).
pub struct OutputStageMiddleware {
    guardrails: Arc<GuardrailEngine>,
    transforms: Arc<TransformRegistry>,
    bus: Arc<ExtensionBus>,
}

impl OutputStageMiddleware {
    pub fn new(
        guardrails: Arc<GuardrailEngine>,
        transforms: Arc<TransformRegistry>,
        bus: Arc<ExtensionBus>,
    ) -> Self {
        Self {
            guardrails,
            transforms,
            bus,
        }
    }
}

#[async_trait]
impl Middleware for OutputStageMiddleware {
    fn name(&self) -> &str {
        "output_stage"
    }
    fn priority(&self) -> i32 {
        420
    }

    async fn process(
        &self,
        ctx: &mut RequestContext,
        request: CompletionRequest,
        next: Next<'_>,
    ) -> GatewayResult<CompletionResponse> {
        let mut response = next.call(ctx, request).await?;

        let messages: Vec<_> = response.choices.iter().map(|c| c.message.clone()).collect();
        let outcome = self
            .guardrails
            .check(ctx.request_id, GuardPhase::Output, messages, &self.bus)
            .await;
        if !outcome.allow {
            return Err(GatewayError::GuardrailBlocked {
                guard: outcome.blocked_guard.unwrap_or_default(),
                reason: outcome.block_reason.unwrap_or_default(),
            });
        }
        for (choice, message) in response.choices.iter_mut().zip(outcome.messages) {
            choice.message = message;
        }

        self.transforms.apply_output(&mut response).await?;
        Ok(response)
    }
}

