//! Shared, dependency-light primitives used across the Nexus workspace:
//! prefix-typed identifiers and the API key format. Kept free of
//! async-runtime and HTTP dependencies so every crate in the workspace can
//! depend on it without pulling in the engine.

pub mod apikey;
pub mod ids;

pub use apikey::{ApiKeyError, GeneratedApiKey};
pub use ids::{Id, IdKind, IdParseError, Key, KeyId, Req, RequestId, Tenant, TenantId, Usage, UsageId};
