use async_trait::async_trait;

use crate::types::{CheckResult, GuardInput, Phase};

/// A single check registered with the engine: a name, the phase(s) it
/// applies to, and the check itself (spec §4.7).
#[async_trait]
pub trait Guard: Send + Sync {
    fn name(&self) -> &str;
    fn phase(&self) -> Phase;
    async fn check(&self, input: &GuardInput) -> CheckResult;
}
