//! Retry, per-provider circuit breaking, and fallback over an ordered
//! candidate list (spec §4.4, §4.5).

pub mod breaker;
pub mod breaker_registry;
pub mod executor;
pub mod policy;

pub use breaker::{CircuitBreaker, CircuitState};
pub use breaker_registry::BreakerRegistry;
pub use executor::ResilienceExecutor;
pub use policy::ResiliencePolicy;
