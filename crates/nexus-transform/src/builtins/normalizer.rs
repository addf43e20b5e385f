use async_trait::async_trait;

use nexus_provider_core::{CompletionResponse, FinishReason, GatewayResult};

use crate::types::{Phase, Transform};

/// Output cleanup: optional whitespace trimming and folding
/// provider-specific finish reasons onto the canonical set (spec §4.8).
/// Provider adapters already map into [`FinishReason`], so folding here is
/// a no-op unless a future variant is added without updating every
/// adapter, kept for that drift case.
#[derive(Default)]
pub struct NormalizerTransform {
    trim_whitespace: bool,
}

impl NormalizerTransform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trim_whitespace(mut self, trim: bool) -> Self {
        self.trim_whitespace = trim;
        self
    }

    fn fold_finish_reason(reason: &FinishReason) -> FinishReason {
        match reason {
            FinishReason::Stop => FinishReason::Stop,
            FinishReason::Length => FinishReason::Length,
            FinishReason::ToolCalls => FinishReason::ToolCalls,
            FinishReason::ContentFilter => FinishReason::ContentFilter,
        }
    }
}

#[async_trait]
impl Transform for NormalizerTransform {
    fn name(&self) -> &str {
        "normalizer"
    }
    fn phase(&self) -> Phase {
        Phase::Output
    }
    async fn apply_output(&self, response: &mut CompletionResponse) -> GatewayResult<()> {
        for choice in &mut response.choices {
            if self.trim_whitespace {
                let trimmed = choice.message.content.as_plain_text().trim().to_string();
                choice.message.content.set_plain_text(trimmed);
            }
            choice.finish_reason = Self::fold_finish_reason(&choice.finish_reason);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_provider_core::{Choice, Message, Usage};
    use std::time::Duration;

    fn response_with(text: &str) -> CompletionResponse {
        CompletionResponse {
            provider: "p".into(),
            model: "m".into(),
            created: 0,
            choices: vec![Choice {
                index: 0,
                message: Message::new(nexus_provider_core::Role::Assistant, text),
                finish_reason: FinishReason::Stop,
            }],
            usage: Usage::default(),
            latency: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn trims_whitespace_when_enabled() {
        let transform = NormalizerTransform::new().with_trim_whitespace(true);
        let mut response = response_with("  hi there  ");
        transform.apply_output(&mut response).await.unwrap();
        assert_eq!(response.choices[0].message.content.as_plain_text(), "hi there");
    }

    #[tokio::test]
    async fn leaves_text_untouched_when_disabled() {
        let transform = NormalizerTransform::new();
        let mut response = response_with("  hi there  ");
        transform.apply_output(&mut response).await.unwrap();
        assert_eq!(response.choices[0].message.content.as_plain_text(), "  hi there  ");
    }
}
