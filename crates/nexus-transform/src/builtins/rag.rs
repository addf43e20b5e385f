use async_trait::async_trait;

use nexus_provider_core::{CompletionRequest, GatewayResult, Message};

use crate::types::{Phase, Transform};

const DEFAULT_MAX_RESULTS: usize = 5;

/// A retrieval backend the RAG transform queries for context chunks (spec
/// §4.8).
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, query: &str, max_results: usize) -> anyhow::Result<Vec<String>>;
}

/// Extracts the last user message as a query, retrieves up to
/// `max_results` chunks, and injects them as a system message immediately
/// after any leading system messages. Retrieval errors are swallowed: the
/// request proceeds without context rather than failing the pipeline.
pub struct RagTransform<R: Retriever> {
    retriever: R,
    max_results: usize,
}

impl<R: Retriever> RagTransform<R> {
    pub fn new(retriever: R) -> Self {
        Self {
            retriever,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    fn format_context(chunks: &[String]) -> String {
        let mut text = String::from("Here is relevant context…\n");
        for (i, chunk) in chunks.iter().enumerate() {
            text.push_str(&format!("[{}] {}\n", i + 1, chunk));
        }
        text
    }
}

#[async_trait]
impl<R: Retriever + Send + Sync> Transform for RagTransform<R> {
    fn name(&self) -> &str {
        "rag"
    }

    fn phase(&self) -> Phase {
        Phase::Input
    }

    async fn apply_input(&self, request: &mut CompletionRequest) -> GatewayResult<()> {
        let Some(query_index) = request.last_user_message_index() else {
            return Ok(());
        };
        let query = request.messages[query_index].content.as_plain_text();

        let chunks = match self.retriever.retrieve(&query, self.max_results).await {
            Ok(chunks) if !chunks.is_empty() => chunks,
            Ok(_) => return Ok(()),
            Err(err) => {
                tracing::warn!(error = %err, "rag retrieval failed, continuing without context");
                return Ok(());
            }
        };

        let insert_at = request.leading_system_count();
        request
            .messages
            .insert(insert_at, Message::system(Self::format_context(&chunks)));
        Ok(())
    }
}
