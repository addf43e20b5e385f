use async_trait::async_trait;
use regex::Regex;

use crate::guard::Guard;
use crate::types::{CheckResult, GuardInput, Phase};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleAction {
    Block,
    Warn,
}

pub struct Rule {
    pub name: String,
    pub pattern: Regex,
    pub action: RuleAction,
}

/// User-defined regex rules, each with its own action (spec §4.7). Rules
/// run in declaration order; the first blocking rule to match wins.
pub struct RegexGuard {
    phase: Phase,
    rules: Vec<Rule>,
}

impl RegexGuard {
    pub fn new(phase: Phase, rules: Vec<Rule>) -> Self {
        Self { phase, rules }
    }
}

#[async_trait]
impl Guard for RegexGuard {
    fn name(&self) -> &str {
        "regex"
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    async fn check(&self, input: &GuardInput) -> CheckResult {
        for message in &input.messages {
            let text = message.content.as_plain_text();
            for rule in &self.rules {
                if rule.pattern.is_match(&text) {
                    match rule.action {
                        RuleAction::Block => {
                            return CheckResult::block(format!("regex:{}", rule.name));
                        }
                        RuleAction::Warn => {
                            tracing::warn!(rule = rule.name.as_str(), "regex guard observed a match");
                        }
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
    async fn first_matching_blocking_rule_wins() {
        let guard = RegexGuard::new(
            Phase::Input,
            vec![Rule {
                name: "no-secrets".into(),
                pattern: Regex::new(r"(?i)api[_-]?key").unwrap(),
                action: RuleAction::Block,
            }],
        );
        let input = GuardInput::new(vec![Message::user("here is my api_key: xyz")]);
        assert!(guard.check(&input).await.blocked);
    }
}
