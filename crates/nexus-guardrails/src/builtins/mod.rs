pub mod content_filter;
pub mod external;
pub mod injection;
pub mod patterns;
pub mod pii;
pub mod regex_guard;

pub use content_filter::{ContentFilterAction, ContentFilterGuard};
pub use external::{ExternalEngineAdapter, SafetyOracle, SafetyVerdict};
pub use injection::InjectionGuard;
pub use patterns::{default_patterns, PiiPattern};
pub use pii::{PiiAction, PiiGuard};
pub use regex_guard::{RegexGuard, Rule, RuleAction};
