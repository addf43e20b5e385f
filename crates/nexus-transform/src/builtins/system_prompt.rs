use async_trait::async_trait;
use std::collections::HashMap;

use nexus_common::TenantId;
use nexus_provider_core::{CompletionRequest, GatewayResult, Message};

use crate::types::{Phase, Transform};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Prepend,
    Append,
}

/// Injects a configured system message, with a per-tenant override (spec
/// §4.8). Placement defaults to prepend.
pub struct SystemPromptTransform {
    placement: Placement,
    global: String,
    tenant_overrides: HashMap<TenantId, String>,
}

impl SystemPromptTransform {
    pub fn new(global: impl Into<String>) -> Self {
        Self {
            placement: Placement::Prepend,
            global: global.into(),
            tenant_overrides: HashMap::new(),
        }
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn with_tenant_override(mut self, tenant: TenantId, prompt: impl Into<String>) -> Self {
        self.tenant_overrides.insert(tenant, prompt.into());
        self
    }

    fn prompt_for(&self, tenant: Option<TenantId>) -> &str {
        tenant
            .and_then(|id| self.tenant_overrides.get(&id))
            .unwrap_or(&self.global)
    }
}

#[async_trait]
impl Transform for SystemPromptTransform {
    fn name(&self) -> &str {
        "system_prompt"
    }

    fn phase(&self) -> Phase {
        Phase::Input
    }

    async fn apply_input(&self, request: &mut CompletionRequest) -> GatewayResult<()> {
        let tenant = request
            .state
            .get("tenant_id")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse::<TenantId>().ok());
        let prompt = self.prompt_for(tenant).to_string();
        let message = Message::system(prompt);
        match self.placement {
            Placement::Prepend => request.messages.insert(0, message),
            Placement::Append => request.messages.push(message),
        }
        Ok(())
    }
}
