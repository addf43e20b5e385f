use async_trait::async_trait;

use nexus_guardrails::default_patterns;
use nexus_provider_core::{CompletionRequest, CompletionResponse, GatewayResult};

use crate::types::{Phase, Transform};

fn redact(text: &str) -> String {
    let mut out = text.to_string();
    for pattern in default_patterns() {
        if pattern.regex.is_match(&out) {
            out = pattern.regex.replace_all(&out, pattern.marker).into_owned();
        }
    }
    out
}

/// Rewrites PII in request messages with the same non-destructive markers
/// the PII guard uses ("[EMAIL]" etc.), but unconditionally. This is a
/// rewrite step, not a policy decision (spec §4.8).
#[derive(Default)]
pub struct InputAnonymizer;

#[async_trait]
impl Transform for InputAnonymizer {
    fn name(&self) -> &str {
        "anonymizer_input"
    }
    fn phase(&self) -> Phase {
        Phase::Input
    }
    async fn apply_input(&self, request: &mut CompletionRequest) -> GatewayResult<()> {
        for message in &mut request.messages {
            let text = redact(&message.content.as_plain_text());
            message.content.set_plain_text(text);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct OutputAnonymizer;

#[async_trait]
impl Transform for OutputAnonymizer {
    fn name(&self) -> &str {
        "anonymizer_output"
    }
    fn phase(&self) -> Phase {
        Phase::Output
    }
    async fn apply_output(&self, response: &mut CompletionResponse) -> GatewayResult<()> {
        for choice in &mut response.choices {
            let text = redact(&choice.message.content.as_plain_text());
            choice.message.content.set_plain_text(text);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_provider_core::Message;

    #[tokio::test]
    async fn input_anonymizer_redacts_email() {
        let transform = InputAnonymizer;
        let mut request = CompletionRequest::new("m", vec![Message::user("reach a@b.com")]);
        transform.apply_input(&mut request).await.unwrap();
        assert!(request.messages[0].content.as_plain_text().contains("[EMAIL]"));
    }
}
