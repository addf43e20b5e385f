use std::time::Instant;

use nexus_common::{KeyId, RequestId, TenantId};
use tokio_util::sync::CancellationToken;

/// Values carried for the life of one request (spec §4.10). Everything but
/// `request_id` and `start_time` is optional at entry; middlewares populate
/// the rest as the chain runs. Propagated explicitly as a parameter, never
/// through ambient/thread-local state.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: RequestId,
    pub tenant_id: Option<TenantId>,
    pub key_id: Option<KeyId>,
    pub provider_name: Option<String>,
    pub cache_hit: bool,
    pub start_time: Instant,
    /// Cancels the in-flight resilience retry-sleep and any future
    /// cancellable suspension point for this request (spec §5).
    pub cancel: CancellationToken,
}

impl RequestContext {
    pub fn new(request_id: RequestId) -> Self {
        Self {
            request_id,
            tenant_id: None,
            key_id: None,
            provider_name: None,
            cache_hit: false,
            start_time: Instant::now(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_tenant(mut self, tenant_id: TenantId) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    pub fn with_key(mut self, key_id: KeyId) -> Self {
        self.key_id = Some(key_id);
        self
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }
}
