use std::sync::Arc;

use nexus_provider_core::{CompletionRequest, CompletionResponse, GatewayResult};

use crate::types::{Phase, Transform};

/// Ordered input/output transform lists (spec §4.8). `apply_input` and
/// `apply_output` run their respective list in registration order, each
/// mutating in place; the first error aborts the pass.
#[derive(Default)]
pub struct TransformRegistry {
    input: Vec<Arc<dyn Transform>>,
    output: Vec<Arc<dyn Transform>>,
}

impl TransformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, transform: Arc<dyn Transform>) {
        match transform.phase() {
            Phase::Input => self.input.push(transform),
            Phase::Output => self.output.push(transform),
        }
    }

    pub async fn apply_input(&self, request: &mut CompletionRequest) -> GatewayResult<()> {
        for transform in &self.input {
            transform.apply_input(request).await?;
        }
        Ok(())
    }

    pub async fn apply_output(&self, response: &mut CompletionResponse) -> GatewayResult<()> {
        for transform in &self.output {
            transform.apply_output(response).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use nexus_provider_core::{GatewayError, Message};

    struct Prefixer;
    #[async_trait]
    impl Transform for Prefixer {
        fn name(&self) -> &str {
            "prefixer"
        }
        fn phase(&self) -> Phase {
            Phase::Input
        }
        async fn apply_input(&self, request: &mut CompletionRequest) -> GatewayResult<()> {
            for message in &mut request.messages {
                let text = message.content.as_plain_text();
                message.content.set_plain_text(format!("> {text}"));
            }
            Ok(())
        }
    }

    struct Aborts;
    #[async_trait]
    impl Transform for Aborts {
        fn name(&self) -> &str {
            "aborts"
        }
        fn phase(&self) -> Phase {
            Phase::Input
        }
        async fn apply_input(&self, _request: &mut CompletionRequest) -> GatewayResult<()> {
            Err(GatewayError::Internal("boom".into()))
        }
    }

    #[tokio::test]
    async fn input_transforms_run_in_registration_order() {
        let mut registry = TransformRegistry::new();
        registry.register(Arc::new(Prefixer));
        let mut request = CompletionRequest::new("m", vec![Message::user("hi")]);
        registry.apply_input(&mut request).await.unwrap();
        assert_eq!(request.messages[0].content.as_plain_text(), "> hi");
    }

    #[tokio::test]
    async fn a_failing_transform_aborts_the_pass() {
        let mut registry = TransformRegistry::new();
        registry.register(Arc::new(Prefixer));
        registry.register(Arc::new(Aborts));
        let mut request = CompletionRequest::new("m", vec![Message::user("hi")]);
        let result = registry.apply_input(&mut request).await;
        assert!(result.is_err());
        // The prefixer still ran before the abort (in-place, registration order).
        assert_eq!(request.messages[0].content.as_plain_text(), "> hi");
    }
}
