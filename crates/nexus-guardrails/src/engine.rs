use std::sync::Arc;

use nexus_common::RequestId;
use nexus_extensions::{Event, ExtensionBus, GuardrailBlocked, GuardrailRedacted};
use nexus_provider_core::Message;

use crate::guard::Guard;
use crate::types::{GuardInput, GuardrailOutcome, Phase};

/// Ordered guard registry. Guards run in registration order; the first one
/// to block wins, and any guard that modifies the running messages hands
/// the redacted text forward to guards registered after it (spec §4.7).
#[derive(Default)]
pub struct GuardrailEngine {
    guards: Vec<Arc<dyn Guard>>,
}

impl GuardrailEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, guard: Arc<dyn Guard>) {
        self.guards.push(guard);
    }

    pub async fn check(
        &self,
        request_id: RequestId,
        phase: Phase,
        messages: Vec<Message>,
        bus: &ExtensionBus,
    ) -> GuardrailOutcome {
        let mut running = messages;
        let mut modified = false;

        for guard in &self.guards {
            if !guard.phase().matches(phase) {
                continue;
            }

            let result = guard.check(&GuardInput::new(running.clone())).await;

            if result.blocked {
                bus.emit(Event::GuardrailBlocked(GuardrailBlocked {
                    request_id,
                    guard: guard.name().to_string(),
                    reason: result.block_reason.clone().unwrap_or_default(),
                }))
                .await;
                return GuardrailOutcome {
                    allow: false,
                    modified,
                    messages: running,
                    blocked_guard: Some(guard.name().to_string()),
                    block_reason: result.block_reason,
                };
            }

            if result.modified {
                if let Some(replacement) = result.replacement_messages {
                    running = replacement;
                    modified = true;
                    bus.emit(Event::GuardrailRedacted(GuardrailRedacted {
                        request_id,
                        guard: guard.name().to_string(),
                    }))
                    .await;
                }
            }
        }

        GuardrailOutcome {
            allow: true,
            modified,
            messages: running,
            blocked_guard: None,
            block_reason: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CheckResult;
    use async_trait::async_trait;
    use nexus_common::Id;

    struct AlwaysBlocks;
    #[async_trait]
    impl Guard for AlwaysBlocks {
        fn name(&self) -> &str {
            "always-blocks"
        }
        fn phase(&self) -> Phase {
            Phase::Input
        }
        async fn check(&self, _input: &GuardInput) -> CheckResult {
            CheckResult::block("nope")
        }
    }

    struct NeverRuns;
    #[async_trait]
    impl Guard for NeverRuns {
        fn name(&self) -> &str {
            "never-runs"
        }
        fn phase(&self) -> Phase {
            Phase::Input
        }
        async fn check(&self, _input: &GuardInput) -> CheckResult {
            panic!("should not run after a block");
        }
    }

    struct Redactor;
    #[async_trait]
    impl Guard for Redactor {
        fn name(&self) -> &str {
            "redactor"
        }
        fn phase(&self) -> Phase {
            Phase::Input
        }
        async fn check(&self, _input: &GuardInput) -> CheckResult {
            CheckResult::modify(vec![Message::user("[REDACTED]")])
        }
    }

    struct SeesRunning {
        saw_redacted: std::sync::Mutex<bool>,
    }
    #[async_trait]
    impl Guard for SeesRunning {
        fn name(&self) -> &str {
            "observer"
        }
        fn phase(&self) -> Phase {
            Phase::Input
        }
        async fn check(&self, input: &GuardInput) -> CheckResult {
            let saw = input.messages.iter().any(|m| m.content.as_plain_text() == "[REDACTED]");
            *self.saw_redacted.lock().unwrap() = saw;
            CheckResult::pass()
        }
    }

    use nexus_provider_core::Message;

    #[tokio::test]
    async fn first_block_wins_and_stops_iteration() {
        let mut engine = GuardrailEngine::new();
        engine.register(Arc::new(AlwaysBlocks));
        engine.register(Arc::new(NeverRuns));
        let bus = ExtensionBus::new();

        let outcome = engine
            .check(Id::new(), Phase::Input, vec![Message::user("hi")], &bus)
            .await;
        assert!(!outcome.allow);
        assert_eq!(outcome.blocked_guard.as_deref(), Some("always-blocks"));
    }

    #[tokio::test]
    async fn later_guards_see_redacted_text() {
        let mut engine = GuardrailEngine::new();
        engine.register(Arc::new(Redactor));
        let observer = Arc::new(SeesRunning {
            saw_redacted: std::sync::Mutex::new(false),
        });
        engine.register(observer.clone());
        let bus = ExtensionBus::new();

        let outcome = engine
            .check(Id::new(), Phase::Input, vec![Message::user("leak")], &bus)
            .await;
        assert!(outcome.allow);
        assert!(outcome.modified);
        assert!(*observer.saw_redacted.lock().unwrap());
    }

    #[tokio::test]
    async fn guards_for_other_phase_are_skipped() {
        struct OutputOnly;
        #[async_trait]
        impl Guard for OutputOnly {
            fn name(&self) -> &str {
                "output-only"
            }
            fn phase(&self) -> Phase {
                Phase::Output
            }
            async fn check(&self, _input: &GuardInput) -> CheckResult {
                CheckResult::block("should never run on input phase")
            }
        }

        let mut engine = GuardrailEngine::new();
        engine.register(Arc::new(OutputOnly));
        let bus = ExtensionBus::new();

        let outcome = engine
            .check(Id::new(), Phase::Input, vec![Message::user("hi")], &bus)
            .await;
        assert!(outcome.allow);
    }
}
