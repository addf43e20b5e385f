use std::time::Duration;

use async_trait::async_trait;
use nexus_provider_core::{
    Capabilities, Choice, CompletionRequest, CompletionResponse, CompletionStream,
    EmbeddingRequest, EmbeddingResponse, FinishReason, GatewayError, GatewayResult, Message,
    Model, Provider, Role, Usage,
};

/// An in-process stand-in for a real provider adapter, which is out of
/// scope here. This binary exists to drive the pipeline end to end, not to
/// talk to a real upstream.
pub(crate) struct DemoProvider;

#[async_trait]
impl Provider for DemoProvider {
    fn name(&self) -> &str {
        "demo"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::chat_only()
    }

    async fn models(&self) -> GatewayResult<Vec<Model>> {
        Ok(vec![])
    }

    async fn complete(&self, req: CompletionRequest) -> GatewayResult<CompletionResponse> {
        let last_user = req
            .messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_plain_text())
            .unwrap_or_default();

        Ok(CompletionResponse {
            provider: self.name().to_string(),
            model: req.model,
            created: 0,
            choices: vec![Choice {
                index: 0,
                message: Message::new(Role::Assistant, format!("echo: {last_user}")),
                finish_reason: FinishReason::Stop,
            }],
            usage: Usage {
                prompt_tokens: last_user.split_whitespace().count() as u32,
                completion_tokens: last_user.split_whitespace().count() as u32,
                total_tokens: last_user.split_whitespace().count() as u32 * 2,
            },
            latency: Duration::from_millis(1),
        })
    }

    async fn complete_stream(&self, _req: CompletionRequest) -> GatewayResult<CompletionStream> {
        Err(GatewayError::NotSupported("streaming not implemented in the demo provider".into()))
    }

    async fn embed(&self, _req: EmbeddingRequest) -> GatewayResult<EmbeddingResponse> {
        Err(GatewayError::NotSupported("embeddings not implemented in the demo provider".into()))
    }

    async fn healthy(&self) -> bool {
        true
    }
}
