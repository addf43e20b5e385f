use async_trait::async_trait;

use crate::error::GatewayError;
use crate::message::FinishReason;
use crate::response::Usage;

#[derive(Debug, Clone, Default)]
pub struct ChunkDelta {
    pub role: Option<crate::message::Role>,
    pub content: Option<String>,
    pub tool_call_fragment: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Chunk {
    pub id: String,
    pub provider: String,
    pub model: String,
    pub delta: ChunkDelta,
    pub finish_reason: Option<FinishReason>,
}

/// What a provider adapter implements: a raw, single-use source of chunks.
/// The engine never hands this to a consumer directly; it always wraps it
/// in [`CompletionStream`], which enforces the release-exactly-once and
/// no-read-after-release invariants that the raw source does not have to.
#[async_trait]
pub trait RawCompletionStream: Send {
    async fn next_chunk(&mut self) -> Option<Result<Chunk, GatewayError>>;

    /// Release any transport resources (e.g. an open HTTP connection).
    /// Called exactly once by the owning [`CompletionStream`].
    async fn release(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamState {
    Active,
    Exhausted,
    Released,
}

/// A lazy, finite, non-restartable sequence of chunks. Exactly one consumer
/// owns an instance; it must call [`release`](Self::release) when done, even
/// after natural exhaustion, or the underlying transport resource leaks.
pub struct CompletionStream {
    inner: Box<dyn RawCompletionStream>,
    state: StreamState,
    usage: Option<Usage>,
}

impl CompletionStream {
    pub fn new(inner: Box<dyn RawCompletionStream>) -> Self {
        Self {
            inner,
            state: StreamState::Active,
            usage: None,
        }
    }

    /// Pull the next chunk. Returns `None` on natural exhaustion (after
    /// which [`usage`](Self::usage) becomes readable). Calling this after
    /// [`release`](Self::release) is a programming error.
    pub async fn next(&mut self) -> Option<Result<Chunk, GatewayError>> {
        match self.state {
            StreamState::Released => {
                return Some(Err(GatewayError::Internal(
                    "stream read after release".into(),
                )));
            }
            StreamState::Exhausted => return None,
            StreamState::Active => {}
        }

        match self.inner.next_chunk().await {
            Some(Ok(chunk)) => Some(Ok(chunk)),
            Some(Err(err)) => {
                self.state = StreamState::Exhausted;
                Some(Err(err))
            }
            None => {
                self.state = StreamState::Exhausted;
                None
            }
        }
    }

    /// Usage totals, readable only once the stream has been exhausted by
    /// [`next`](Self::next) returning `None`.
    pub fn usage(&self) -> Option<&Usage> {
        if self.state == StreamState::Active {
            return None;
        }
        self.usage.as_ref()
    }

    pub fn set_usage(&mut self, usage: Usage) {
        self.usage = Some(usage);
    }

    /// Releases the underlying transport resource. Idempotent: releasing an
    /// already-released stream is a no-op rather than a panic, since a
    /// defensive `drop`-path release is common.
    pub async fn release(&mut self) {
        if self.state == StreamState::Released {
            return;
        }
        self.inner.release().await;
        self.state = StreamState::Released;
    }

    pub fn is_released(&self) -> bool {
        self.state == StreamState::Released
    }
}
