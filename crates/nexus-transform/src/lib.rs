//! Ordered request/response rewrite steps applied around the provider call
//! (spec §4.8).

pub mod builtins;
pub mod engine;
pub mod types;

pub use builtins::*;
pub use engine::TransformRegistry;
pub use types::{Phase, Transform};
