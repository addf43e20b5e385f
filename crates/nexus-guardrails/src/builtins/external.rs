use async_trait::async_trait;

use crate::guard::Guard;
use crate::types::{CheckResult, GuardInput, Phase};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafetyVerdict {
    Allow,
    Block,
}

/// A third-party safety classifier the guard delegates to (spec §4.7).
#[async_trait]
pub trait SafetyOracle: Send + Sync {
    async fn classify(&self, text: &str) -> SafetyVerdict;
}

/// Delegates every check to an injected [`SafetyOracle`] and maps its
/// verdict to block/allow.
pub struct ExternalEngineAdapter {
    phase: Phase,
    oracle: Box<dyn SafetyOracle>,
}

impl ExternalEngineAdapter {
    pub fn new(phase: Phase, oracle: Box<dyn SafetyOracle>) -> Self {
        Self { phase, oracle }
    }
}

#[async_trait]
impl Guard for ExternalEngineAdapter {
    fn name(&self) -> &str {
        "external"
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    async fn check(&self, input: &GuardInput) -> CheckResult {
        for message in &input.messages {
            let text = message.content.as_plain_text();
            if self.oracle.classify(&text).await == SafetyVerdict::Block {
                return CheckResult::block("external:classifier");
            }
        }
        CheckResult::pass()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_provider_core::Message;

    struct BlockOnKeyword(&'static str);
    #[async_trait]
    impl SafetyOracle for BlockOnKeyword {
        async fn classify(&self, text: &str) -> SafetyVerdict {
            if text.contains(self.0) {
                SafetyVerdict::Block
            } else {
                SafetyVerdict::Allow
            }
        }
    }

    #[tokio::test]
    async fn maps_block_verdict_to_check_block() {
        let guard = ExternalEngineAdapter::new(Phase::Both, Box::new(BlockOnKeyword("unsafe")));
        let input = GuardInput::new(vec![Message::user("this is unsafe")]);
        assert!(guard.check(&input).await.blocked);
    }

    #[tokio::test]
    async fn maps_allow_verdict_to_check_pass() {
        let guard = ExternalEngineAdapter::new(Phase::Both, Box::new(BlockOnKeyword("unsafe")));
        let input = GuardInput::new(vec![Message::user("this is fine")]);
        assert!(!guard.check(&input).await.blocked);
    }
}
