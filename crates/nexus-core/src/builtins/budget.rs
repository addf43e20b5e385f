use async_trait::async_trait;
use std::sync::Arc;

use nexus_extensions::{BudgetExceeded, BudgetWarning, Event, ExtensionBus};
use nexus_provider_core::{CompletionRequest, CompletionResponse, GatewayError, GatewayResult};

use crate::context::RequestContext;
use crate::middleware::{Middleware, Next};

const WARNING_THRESHOLD: f64 = 0.8;

/// A tenant's current spend against its budget, as reported by whatever
/// collaborator tracks usage (out of scope here; spec §1 treats usage
/// accounting as an external concern).
pub trait BudgetSource: Send + Sync {
    fn usage_fraction(&self, tenant: nexus_common::TenantId) -> Option<f64>;
}

/// 0–99 band: blocks a request whose tenant has exceeded its budget, and
/// emits `budget.warning` at the 80% threshold (spec §4.9). A tenant with
/// no budget source entry is treated as unmetered and always passes.
pub struct BudgetMiddleware {
    source: Arc<dyn BudgetSource>,
    bus: Arc<ExtensionBus>,
}

impl BudgetMiddleware {
    pub fn new(source: Arc<dyn BudgetSource>, bus: Arc<ExtensionBus>) -> Self {
        Self { source, bus }
    }
}

#[async_trait]
impl Middleware for BudgetMiddleware {
    fn name(&self) -> &str {
        "budget"
    }
    fn priority(&self) -> i32 {
        10
    }

    async fn process(
        &self,
        ctx: &mut RequestContext,
        request: CompletionRequest,
        next: Next<'_>,
    ) -> GatewayResult<CompletionResponse> {
        if let Some(tenant) = ctx.tenant_id {
            if let Some(fraction) = self.source.usage_fraction(tenant) {
                if fraction >= 1.0 {
                    self.bus
                        .emit(Event::BudgetExceeded(BudgetExceeded { tenant_id: tenant }))
                        .await;
                    return Err(GatewayError::InvalidInput("tenant budget exceeded".into()));
                }
                if fraction >= WARNING_THRESHOLD {
                    self.bus
                        .emit(Event::BudgetWarning(BudgetWarning {
                            tenant_id: tenant,
                            fraction_used: fraction,
                        }))
                        .await;
                }
            }
        }
        next.call(ctx, request).await
    }
}
