//! Ordered, first-block-wins content checks over request/response messages,
//! plus chunk-aware streaming strategies (spec §4.7).

pub mod builtins;
pub mod engine;
pub mod guard;
pub mod streaming;
pub mod types;

pub use builtins::*;
pub use engine::GuardrailEngine;
pub use guard::Guard;
pub use streaming::{buffer, chunkwise, passthrough, ChunkGuard, GuardedStreamError, StreamGuardError};
pub use types::{CheckResult, GuardInput, GuardrailOutcome, Phase};
