use async_trait::async_trait;
use nexus_provider_core::Message;

use crate::builtins::patterns::{default_patterns, PiiPattern};
use crate::guard::Guard;
use crate::types::{CheckResult, GuardInput, Phase};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PiiAction {
    Block,
    Redact,
    Warn,
}

/// Fixed regex patterns for common PII, with a configurable response (spec
/// §4.7). `Redact` rewrites the matched text in place; `Block` fails fast
/// naming the first matching pattern; `Warn` passes but logs.
pub struct PiiGuard {
    phase: Phase,
    action: PiiAction,
    patterns: Vec<&'static PiiPattern>,
}

impl PiiGuard {
    pub fn new(phase: Phase, action: PiiAction) -> Self {
        Self {
            phase,
            action,
            patterns: default_patterns(),
        }
    }

    pub fn with_patterns(mut self, patterns: Vec<&'static PiiPattern>) -> Self {
        self.patterns = patterns;
        self
    }
}

#[async_trait]
impl Guard for PiiGuard {
    fn name(&self) -> &str {
        "pii"
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    async fn check(&self, input: &GuardInput) -> CheckResult {
        match self.action {
            PiiAction::Block => {
                for message in &input.messages {
                    let text = message.content.as_plain_text();
                    for pattern in &self.patterns {
                        if pattern.regex.is_match(&text) {
                            return CheckResult::block(format!("pii:{}", pattern.name));
                        }
                    }
                }
                CheckResult::pass()
            }
            PiiAction::Redact => {
                let mut changed = false;
                let messages: Vec<Message> = input
                    .messages
                    .iter()
                    .map(|message| {
                        let mut text = message.content.as_plain_text();
                        for pattern in &self.patterns {
                            if pattern.regex.is_match(&text) {
                                changed = true;
                                text = pattern.regex.replace_all(&text, pattern.marker).into_owned();
                            }
                        }
                        let mut out = message.clone();
                        out.content.set_plain_text(text);
                        out
                    })
                    .collect();
                if changed {
                    CheckResult::modify(messages)
                } else {
                    CheckResult::pass()
                }
            }
            PiiAction::Warn => {
                for message in &input.messages {
                    let text = message.content.as_plain_text();
                    for pattern in &self.patterns {
                        if pattern.regex.is_match(&text) {
                            tracing::warn!(pattern = pattern.name, "pii guard observed a match");
                        }
                    }
                }
                CheckResult::pass()
            }
        }
    }
}
