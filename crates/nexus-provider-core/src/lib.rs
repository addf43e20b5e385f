//! The Provider Port: the uniform capability contract a gateway calls, plus
//! the unified request/response/stream data model every other crate in the
//! workspace builds on. Intentionally free of cache/routing/guardrail
//! concerns; those layer on top, not in here.

pub mod capabilities;
pub mod error;
pub mod message;
pub mod provider;
pub mod registry;
pub mod request;
pub mod response;
pub mod state;
pub mod stream;

pub use capabilities::{Capabilities, Model, Pricing};
pub use error::{GatewayError, GatewayResult};
pub use message::{
    Content, ContentPart, FinishReason, Message, Role, ResponseFormat, ToolCall, ToolCallFunction,
    ToolCallKind, ToolDeclaration,
};
pub use provider::Provider;
pub use registry::ProviderRegistry;
pub use request::{CompletionRequest, EmbeddingRequest, Request};
pub use response::{Choice, CompletionResponse, EmbeddingResponse, Usage};
pub use state::PipelineState;
pub use stream::{Chunk, ChunkDelta, CompletionStream, RawCompletionStream};
