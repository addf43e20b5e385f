use async_trait::async_trait;
use nexus_provider_core::{CompletionRequest, CompletionResponse, GatewayResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Input,
    Output,
}

/// A single rewrite step registered with the engine (spec §4.8). Input
/// transforms mutate the request in place; output transforms mutate the
/// response in place. Either can abort the whole pass by erroring.
#[async_trait]
pub trait Transform: Send + Sync {
    fn name(&self) -> &str;
    fn phase(&self) -> Phase;

    async fn apply_input(&self, _request: &mut CompletionRequest) -> GatewayResult<()> {
        Ok(())
    }

    async fn apply_output(&self, _response: &mut CompletionResponse) -> GatewayResult<()> {
        Ok(())
    }
}
