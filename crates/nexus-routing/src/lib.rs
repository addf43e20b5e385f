//! The Alias Registry, Candidate Builder, and Routing Strategies: the part
//! of the pipeline that turns "a logical model name" into "one concrete
//! provider/model to call."

pub mod alias;
pub mod candidate;
pub mod health;
pub mod strategy;

pub use alias::{Alias, AliasRegistry, Target};
pub use candidate::{Candidate, CandidateBuilder};
pub use health::HealthTracker;
pub use strategy::{
    CostOptimized, LatencyOptimized, Priority, RoundRobin, RoutingStrategy, Weighted,
    NO_HEALTHY_PROVIDERS,
};
