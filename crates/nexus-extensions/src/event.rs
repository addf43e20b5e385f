use nexus_common::{KeyId, RequestId, TenantId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestReceived {
    pub request_id: RequestId,
    pub tenant_id: Option<TenantId>,
    pub key_id: Option<KeyId>,
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestCompleted {
    pub request_id: RequestId,
    pub provider: String,
    pub model: String,
    pub latency_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestFailed {
    pub request_id: RequestId,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestCached {
    pub request_id: RequestId,
    pub cache_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderFailed {
    pub request_id: RequestId,
    pub provider: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitOpened {
    pub provider: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackTriggered {
    pub request_id: RequestId,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardrailBlocked {
    pub request_id: RequestId,
    pub guard: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardrailRedacted {
    pub request_id: RequestId,
    pub guard: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantCreated {
    pub tenant_id: TenantId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantDisabled {
    pub tenant_id: TenantId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyCreated {
    pub key_id: KeyId,
    pub tenant_id: TenantId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyRevoked {
    pub key_id: KeyId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetWarning {
    pub tenant_id: TenantId,
    /// Fraction of budget consumed; fires at >= 0.8 (spec §4.9).
    pub fraction_used: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetExceeded {
    pub tenant_id: TenantId,
}

/// Every lifecycle event the extension bus can emit. Kept as a typed enum
/// internally (so dispatch is exhaustive-checked by the compiler) with
/// [`Event::name`] and [`Event::payload`] giving the name-keyed, stable map
/// surface spec §6 requires for anything crossing the bus's external edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    RequestReceived(RequestReceived),
    RequestCompleted(RequestCompleted),
    RequestFailed(RequestFailed),
    RequestCached(RequestCached),
    ProviderFailed(ProviderFailed),
    CircuitOpened(CircuitOpened),
    FallbackTriggered(FallbackTriggered),
    GuardrailBlocked(GuardrailBlocked),
    GuardrailRedacted(GuardrailRedacted),
    TenantCreated(TenantCreated),
    TenantDisabled(TenantDisabled),
    KeyCreated(KeyCreated),
    KeyRevoked(KeyRevoked),
    BudgetWarning(BudgetWarning),
    BudgetExceeded(BudgetExceeded),
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::RequestReceived(_) => "request.received",
            Event::RequestCompleted(_) => "request.completed",
            Event::RequestFailed(_) => "request.failed",
            Event::RequestCached(_) => "request.cached",
            Event::ProviderFailed(_) => "provider.failed",
            Event::CircuitOpened(_) => "circuit.opened",
            Event::FallbackTriggered(_) => "fallback.triggered",
            Event::GuardrailBlocked(_) => "guardrail.blocked",
            Event::GuardrailRedacted(_) => "guardrail.redacted",
            Event::TenantCreated(_) => "tenant.created",
            Event::TenantDisabled(_) => "tenant.disabled",
            Event::KeyCreated(_) => "key.created",
            Event::KeyRevoked(_) => "key.revoked",
            Event::BudgetWarning(_) => "budget.warning",
            Event::BudgetExceeded(_) => "budget.exceeded",
        }
    }

    /// Name-keyed payload map, stable and exhaustive per event type (spec
    /// §6).
    pub fn payload(&self) -> Map<String, Value> {
        let value = match self {
            Event::RequestReceived(e) => json!(e),
            Event::RequestCompleted(e) => json!(e),
            Event::RequestFailed(e) => json!(e),
            Event::RequestCached(e) => json!(e),
            Event::ProviderFailed(e) => json!(e),
            Event::CircuitOpened(e) => json!(e),
            Event::FallbackTriggered(e) => json!(e),
            Event::GuardrailBlocked(e) => json!(e),
            Event::GuardrailRedacted(e) => json!(e),
            Event::TenantCreated(e) => json!(e),
            Event::TenantDisabled(e) => json!(e),
            Event::KeyCreated(e) => json!(e),
            Event::KeyRevoked(e) => json!(e),
            Event::BudgetWarning(e) => json!(e),
            Event::BudgetExceeded(e) => json!(e),
        };
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }
}
