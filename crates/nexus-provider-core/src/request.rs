use crate::message::{Message, ResponseFormat, ToolDeclaration};
use crate::state::PipelineState;

/// One of the three discriminated request shapes the engine accepts.
/// `CompletionRequest::stream` distinguishes a buffered completion from a
/// streaming one; embeddings are a distinct shape entirely.
#[derive(Debug, Clone)]
pub enum Request {
    Completion(CompletionRequest),
    Embedding(EmbeddingRequest),
}

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Logical alias name or a concrete `provider/model` id.
    pub model: String,
    pub messages: Vec<Message>,
    pub system: Option<String>,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub max_tokens: Option<u32>,
    pub stop: Vec<String>,
    pub tools: Vec<ToolDeclaration>,
    pub response_format: Option<ResponseFormat>,
    pub stream: bool,
    pub state: PipelineState,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            system: None,
            temperature: None,
            top_p: None,
            max_tokens: None,
            stop: Vec::new(),
            tools: Vec::new(),
            response_format: None,
            stream: false,
            state: PipelineState::new(),
        }
    }

    pub fn streaming(mut self) -> Self {
        self.stream = true;
        self
    }

    /// Index of the last message sent by the user; `None` if there is none
    /// (e.g. the request is assistant-primed only).
    pub fn last_user_message_index(&self) -> Option<usize> {
        self.messages
            .iter()
            .enumerate()
            .rev()
            .find(|(_, m)| matches!(m.role, crate::message::Role::User))
            .map(|(i, _)| i)
    }

    /// Count of leading system messages, used by transforms that must
    /// insert material "after any leading system messages."
    pub fn leading_system_count(&self) -> usize {
        self.messages
            .iter()
            .take_while(|m| matches!(m.role, crate::message::Role::System))
            .count()
    }
}

#[derive(Debug, Clone)]
pub struct EmbeddingRequest {
    pub model: String,
    pub input: Vec<String>,
    pub state: PipelineState,
}

impl EmbeddingRequest {
    pub fn new(model: impl Into<String>, input: Vec<String>) -> Self {
        Self {
            model: model.into(),
            input,
            state: PipelineState::new(),
        }
    }
}
