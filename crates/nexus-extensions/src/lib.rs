//! The extension bus: type-routed lifecycle event dispatch to observers
//! that opt in to a subset of the five hook groups (spec §4.9).

pub mod bus;
pub mod event;

pub use bus::{Extension, ExtensionBus, ExtensionOutcome};
pub use event::{
    BudgetExceeded, BudgetWarning, CircuitOpened, Event, FallbackTriggered, GuardrailBlocked,
    GuardrailRedacted, KeyCreated, KeyRevoked, ProviderFailed, RequestCached, RequestCompleted,
    RequestFailed, RequestReceived, TenantCreated, TenantDisabled,
};
