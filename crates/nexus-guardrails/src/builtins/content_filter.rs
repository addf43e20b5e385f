use async_trait::async_trait;

use crate::guard::Guard;
use crate::types::{CheckResult, GuardInput, Phase};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentFilterAction {
    Block,
    Warn,
}

/// Lowercase-contains blocklist (spec §4.7). Matching is substring, not
/// word-boundary, to catch trivial obfuscation by punctuation.
pub struct ContentFilterGuard {
    phase: Phase,
    action: ContentFilterAction,
    blocklist: Vec<String>,
}

impl ContentFilterGuard {
    pub fn new(phase: Phase, action: ContentFilterAction, blocklist: Vec<String>) -> Self {
        Self {
            phase,
            action,
            blocklist: blocklist.into_iter().map(|s| s.to_lowercase()).collect(),
        }
    }
}

#[async_trait]
impl Guard for ContentFilterGuard {
    fn name(&self) -> &str {
        "content_filter"
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    async fn check(&self, input: &GuardInput) -> CheckResult {
        for message in &input.messages {
            let text = message.content.as_plain_text().to_lowercase();
            if let Some(term) = self.blocklist.iter().find(|term| text.contains(term.as_str())) {
                match self.action {
                    ContentFilterAction::Block => {
                        return CheckResult::block(format!("content_filter:{term}"));
                    }
                    ContentFilterAction::Warn => {
                        tracing::warn!(term, "content filter observed a match");
                    }
                }
            }
        }
        CheckResult::pass()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_provider_core::Message;

    #[tokio::test]
    async fn blocks_on_blocklisted_term() {
        let guard = ContentFilterGuard::new(
            Phase::Both,
            ContentFilterAction::Block,
            vec!["forbidden".into()],
        );
        let input = GuardInput::new(vec![Message::user("this is FORBIDDEN content")]);
        assert!(guard.check(&input).await.blocked);
    }

    #[tokio::test]
    async fn warn_action_never_blocks() {
        let guard = ContentFilterGuard::new(
            Phase::Both,
            ContentFilterAction::Warn,
            vec!["forbidden".into()],
        );
        let input = GuardInput::new(vec![Message::user("forbidden content")]);
        assert!(!guard.check(&input).await.blocked);
    }
}
