//! The request pipeline engine: a priority-ordered middleware chain in
//! front of alias resolution, routing and resilient provider dispatch (spec
//! §2, §4).

pub mod builder;
pub mod builtins;
pub mod context;
pub mod engine;
pub mod middleware;
pub mod terminal;

pub use builder::EngineBuilder;
pub use context::RequestContext;
pub use engine::GatewayEngine;
pub use middleware::{Middleware, MiddlewareChain, Next, Terminal};
pub use terminal::RoutingTerminal;
