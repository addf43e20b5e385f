use async_trait::async_trait;

use crate::capabilities::{Capabilities, Model};
use crate::error::GatewayResult;
use crate::request::{CompletionRequest, EmbeddingRequest};
use crate::response::{CompletionResponse, EmbeddingResponse};
use crate::stream::CompletionStream;

/// The uniform contract every provider adapter implements. Concrete
/// adapters (OpenAI, Anthropic, Bedrock, ...) are out of scope for this
/// workspace; only this port and the pipeline that calls through it are
/// core (spec §6).
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    fn capabilities(&self) -> Capabilities;

    async fn models(&self) -> GatewayResult<Vec<Model>>;

    async fn complete(&self, req: CompletionRequest) -> GatewayResult<CompletionResponse>;

    async fn complete_stream(&self, req: CompletionRequest) -> GatewayResult<CompletionStream>;

    /// Providers that cannot embed return `GatewayError::NotSupported`
    /// rather than a sentinel value, so the pipeline's normal error path
    /// handles it without a special case.
    async fn embed(&self, req: EmbeddingRequest) -> GatewayResult<EmbeddingResponse>;

    async fn healthy(&self) -> bool;
}
