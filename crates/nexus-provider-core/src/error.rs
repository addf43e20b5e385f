use std::fmt;

/// The error kinds the core pipeline distinguishes. The exact variant names
/// are an implementation choice; the distinctions (retriable vs. not,
/// user-facing status) are normative, see spec §7.
#[derive(Debug, Clone)]
pub enum GatewayError {
    /// Malformed request, unknown alias, unparseable id, wrong id prefix.
    /// Rejected synchronously by the earliest validator; never retried.
    InvalidInput(String),
    /// A provider cannot service a requested capability (e.g. embeddings).
    /// Surfaced without retry or fallback.
    NotSupported(String),
    /// Content policy violation. Carries `(guard name, reason)`.
    GuardrailBlocked { guard: String, reason: String },
    /// The selected provider's breaker is open.
    CircuitOpen { provider: String },
    /// HTTP/network error from a provider or upstream oracle. Retriable
    /// within the resilience executor's retry budget.
    Transport(String),
    /// The caller's cancellation handle fired. Never retried.
    Cancelled,
    /// The per-call timeout fired. Counted as a retriable failure.
    TimedOut,
    /// All configured providers (primary + fallbacks) failed.
    AllProvidersFailed(String),
    /// Invariant violation: a programming error that must surface.
    Internal(String),
}

impl GatewayError {
    /// Whether the resilience executor should spend another retry attempt
    /// on this outcome.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            GatewayError::Transport(_) | GatewayError::TimedOut | GatewayError::CircuitOpen { .. }
        )
    }

    /// The HTTP status an eventual façade would map this to (§7). Core-only
    /// because the façade itself is out of scope; this keeps the mapping a
    /// pure, testable function instead of duplicated logic at the edge.
    pub fn http_status_hint(&self) -> u16 {
        match self {
            GatewayError::InvalidInput(_) => 400,
            GatewayError::NotSupported(_) => 422,
            GatewayError::GuardrailBlocked { .. } => 451,
            GatewayError::AllProvidersFailed(_) => 502,
            GatewayError::Cancelled => 499,
            GatewayError::TimedOut => 504,
            GatewayError::CircuitOpen { .. } => 502,
            GatewayError::Internal(_) => 500,
            GatewayError::Transport(_) => 502,
        }
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            GatewayError::NotSupported(what) => write!(f, "not supported: {what}"),
            GatewayError::GuardrailBlocked { guard, reason } => {
                write!(f, "blocked by guard {guard}: {reason}")
            }
            GatewayError::CircuitOpen { provider } => {
                write!(f, "circuit open for {provider}")
            }
            GatewayError::Transport(msg) => write!(f, "transport error: {msg}"),
            GatewayError::Cancelled => write!(f, "request cancelled"),
            GatewayError::TimedOut => write!(f, "request timed out"),
            GatewayError::AllProvidersFailed(msg) => write!(f, "all providers failed: {msg}"),
            GatewayError::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for GatewayError {}

pub type GatewayResult<T> = Result<T, GatewayError>;
