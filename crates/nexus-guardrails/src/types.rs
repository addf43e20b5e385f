use nexus_provider_core::Message;

/// Which side of the provider call a guard runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Input,
    Output,
    Both,
}

impl Phase {
    /// Whether a guard declared for `self` should run during an engine
    /// pass over `running`.
    pub fn matches(self, running: Phase) -> bool {
        self == Phase::Both || self == running
    }
}

/// What a single guard saw: the message list it checked (input messages, or
/// output choices projected to messages by the caller).
#[derive(Debug, Clone)]
pub struct GuardInput {
    pub messages: Vec<Message>,
}

impl GuardInput {
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

/// A single guard's verdict. The invariants a guard must uphold: `blocked`
/// implies the check did not pass, and `modified` implies
/// `replacement_messages` is non-empty (spec §3).
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub blocked: bool,
    pub block_reason: Option<String>,
    pub modified: bool,
    pub replacement_messages: Option<Vec<Message>>,
}

impl CheckResult {
    pub fn pass() -> Self {
        Self {
            blocked: false,
            block_reason: None,
            modified: false,
            replacement_messages: None,
        }
    }

    pub fn block(reason: impl Into<String>) -> Self {
        Self {
            blocked: true,
            block_reason: Some(reason.into()),
            modified: false,
            replacement_messages: None,
        }
    }

    pub fn modify(messages: Vec<Message>) -> Self {
        debug_assert!(!messages.is_empty(), "modify requires non-empty replacement messages");
        Self {
            blocked: false,
            block_reason: None,
            modified: true,
            replacement_messages: Some(messages),
        }
    }

    pub fn passed(&self) -> bool {
        !self.blocked
    }
}

/// Aggregate outcome of running every matching guard over one phase (spec
/// §4.7). `messages` carries the running, possibly-redacted message set
/// after all guards have seen it.
#[derive(Debug, Clone)]
pub struct GuardrailOutcome {
    pub allow: bool,
    pub modified: bool,
    pub messages: Vec<Message>,
    pub blocked_guard: Option<String>,
    pub block_reason: Option<String>,
}

impl GuardrailOutcome {
    pub fn passed(&self) -> bool {
        self.allow
    }
}
