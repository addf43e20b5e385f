use nexus_provider_core::{Chunk, CompletionStream, GatewayError};

/// Blocked by a chunk-aware guard during streaming (spec §4.7). Kept
/// distinct from transport errors so a consumer can tell "the model said
/// something we redact" from "the connection dropped."
#[derive(Debug, Clone)]
pub struct StreamGuardError {
    pub guard_name: String,
    pub reason: String,
}

impl std::fmt::Display for StreamGuardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "guard {} blocked the stream: {}", self.guard_name, self.reason)
    }
}

impl std::error::Error for StreamGuardError {}

#[derive(Debug)]
pub enum GuardedStreamError {
    Transport(GatewayError),
    Blocked(StreamGuardError),
}

impl std::fmt::Display for GuardedStreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GuardedStreamError::Transport(err) => write!(f, "{err}"),
            GuardedStreamError::Blocked(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for GuardedStreamError {}

/// Chunk-level check run by the streaming strategies. `accumulated` is the
/// text seen so far on this stream (including the current chunk), so a
/// guard can catch a phrase split across chunk boundaries.
pub trait ChunkGuard: Send + Sync {
    fn name(&self) -> &str;
    fn check(&self, accumulated: &str) -> Result<(), String>;
}

fn run_guards(guards: &[Box<dyn ChunkGuard>], accumulated: &str) -> Result<(), StreamGuardError> {
    for guard in guards {
        if let Err(reason) = guard.check(accumulated) {
            return Err(StreamGuardError {
                guard_name: guard.name().to_string(),
                reason,
            });
        }
    }
    Ok(())
}

fn delta_text(chunk: &Chunk) -> &str {
    chunk.delta.content.as_deref().unwrap_or("")
}

/// Drains the upstream to completion, runs guards over the fully
/// accumulated text, then replays the original chunks in order on success
/// (spec §4.7). A block on any point in the accumulated text fails the
/// whole stream; nothing is replayed.
pub async fn buffer(
    mut upstream: CompletionStream,
    guards: Vec<Box<dyn ChunkGuard>>,
) -> Result<Vec<Chunk>, GuardedStreamError> {
    let mut buffered = Vec::new();
    let mut accumulated = String::new();

    while let Some(next) = upstream.next().await {
        match next {
            Ok(chunk) => {
                accumulated.push_str(delta_text(&chunk));
                buffered.push(chunk);
            }
            Err(err) => {
                upstream.release().await;
                return Err(GuardedStreamError::Transport(err));
            }
        }
    }
    upstream.release().await;

    run_guards(&guards, &accumulated).map_err(GuardedStreamError::Blocked)?;
    Ok(buffered)
}

/// Forwards each chunk to the caller only after every guard has passed the
/// text accumulated through that chunk. A block on any chunk releases the
/// upstream immediately and returns without forwarding that chunk (spec
/// §4.7).
pub async fn chunkwise<F>(
    mut upstream: CompletionStream,
    guards: Vec<Box<dyn ChunkGuard>>,
    mut on_chunk: F,
) -> Result<(), GuardedStreamError>
where
    F: FnMut(Chunk),
{
    let mut accumulated = String::new();

    loop {
        match upstream.next().await {
            Some(Ok(chunk)) => {
                accumulated.push_str(delta_text(&chunk));
                if let Err(err) = run_guards(&guards, &accumulated) {
                    upstream.release().await;
                    return Err(GuardedStreamError::Blocked(err));
                }
                on_chunk(chunk);
            }
            Some(Err(err)) => {
                upstream.release().await;
                return Err(GuardedStreamError::Transport(err));
            }
            None => {
                upstream.release().await;
                return Ok(());
            }
        }
    }
}

/// Forwards chunks unchanged; guards still run, but only for audit (their
/// verdict is observed, never enforced) (spec §4.7).
pub async fn passthrough<F>(
    mut upstream: CompletionStream,
    guards: Vec<Box<dyn ChunkGuard>>,
    mut on_chunk: F,
) -> Result<(), GatewayError>
where
    F: FnMut(Chunk),
{
    let mut accumulated = String::new();

    loop {
        match upstream.next().await {
            Some(Ok(chunk)) => {
                accumulated.push_str(delta_text(&chunk));
                if let Err(err) = run_guards(&guards, &accumulated) {
                    tracing::warn!(guard = err.guard_name, reason = err.reason, "passthrough guard observed a match");
                }
                on_chunk(chunk);
            }
            Some(Err(err)) => {
                upstream.release().await;
                return Err(err);
            }
            None => {
                upstream.release().await;
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use nexus_provider_core::{ChunkDelta, RawCompletionStream};

    struct FixedChunks(std::vec::IntoIter<String>);

    #[async_trait]
    impl RawCompletionStream for FixedChunks {
        async fn next_chunk(&mut self) -> Option<Result<Chunk, GatewayError>> {
            self.0.next().map(|text| {
                Ok(Chunk {
                    id: "1".into(),
                    provider: "p".into(),
                    model: "m".into(),
                    delta: ChunkDelta {
                        role: None,
                        content: Some(text),
                        tool_call_fragment: None,
                    },
                    finish_reason: None,
                })
            })
        }

        async fn release(&mut self) {}
    }

    struct Blocklist(&'static str);
    impl ChunkGuard for Blocklist {
        fn name(&self) -> &str {
            "blocklist"
        }
        fn check(&self, accumulated: &str) -> Result<(), String> {
            if accumulated.contains(self.0) {
                Err(format!("contains {}", self.0))
            } else {
                Ok(())
            }
        }
    }

    fn stream(chunks: Vec<&str>) -> CompletionStream {
        CompletionStream::new(Box::new(FixedChunks(
            chunks.into_iter().map(String::from).collect::<Vec<_>>().into_iter(),
        )))
    }

    #[tokio::test]
    async fn buffer_replays_clean_stream_in_order() {
        let s = stream(vec!["hello ", "world"]);
        let result = buffer(s, vec![]).await.unwrap();
        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn buffer_blocks_on_accumulated_match() {
        let s = stream(vec!["he", "llo secret"]);
        let guards: Vec<Box<dyn ChunkGuard>> = vec![Box::new(Blocklist("secret"))];
        let result = buffer(s, guards).await;
        assert!(matches!(result, Err(GuardedStreamError::Blocked(_))));
    }

    #[tokio::test]
    async fn chunkwise_stops_forwarding_on_block() {
        let s = stream(vec!["safe ", "secret"]);
        let guards: Vec<Box<dyn ChunkGuard>> = vec![Box::new(Blocklist("secret"))];
        let mut forwarded = Vec::new();
        let result = chunkwise(s, guards, |c| forwarded.push(c)).await;
        assert!(matches!(result, Err(GuardedStreamError::Blocked(_))));
        assert_eq!(forwarded.len(), 1);
    }

    #[tokio::test]
    async fn passthrough_forwards_everything_regardless_of_guard_verdict() {
        let s = stream(vec!["safe ", "secret"]);
        let guards: Vec<Box<dyn ChunkGuard>> = vec![Box::new(Blocklist("secret"))];
        let mut forwarded = Vec::new();
        let result = passthrough(s, guards, |c| forwarded.push(c)).await;
        assert!(result.is_ok());
        assert_eq!(forwarded.len(), 2);
    }
}
