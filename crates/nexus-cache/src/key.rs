use nexus_provider_core::{CompletionRequest, ResponseFormat};
use sha2::{Digest, Sha256};

/// Computes the deterministic cache key for a completion request (spec
/// §4.6). Fields absent from the request are absent from the digest;
/// presence of tools or a non-default response format always changes the
/// key so a cached response is never served to a request it didn't answer.
pub fn completion_key(request: &CompletionRequest) -> String {
    let mut lines = Vec::new();
    lines.push(format!("model:{}", request.model));

    for message in &request.messages {
        let role = serde_json::to_string(&message.role).unwrap_or_default();
        let content = serde_json::to_string(&message.content).unwrap_or_default();
        lines.push(format!("message:{role}:{content}"));
    }

    if let Some(temperature) = request.temperature {
        lines.push(format!("temperature:{temperature:.6}"));
    }
    if let Some(top_p) = request.top_p {
        lines.push(format!("top_p:{top_p:.6}"));
    }
    if let Some(max_tokens) = request.max_tokens {
        if max_tokens > 0 {
            lines.push(format!("max_tokens:{max_tokens}"));
        }
    }
    if !request.stop.is_empty() {
        let mut stop = request.stop.clone();
        stop.sort();
        lines.push(format!("stop:{}", stop.join(",")));
    }
    if !request.tools.is_empty() {
        let mut tools = request.tools.clone();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        let canonical = serde_json::to_string(&tools).unwrap_or_default();
        lines.push(format!("tools:{canonical}"));
    }
    if let Some(format) = &request.response_format {
        if !matches!(format, ResponseFormat::Text) {
            let canonical = serde_json::to_string(format).unwrap_or_default();
            lines.push(format!("response_format:{canonical}"));
        }
    }

    let mut hasher = Sha256::new();
    for line in &lines {
        hasher.update(line.as_bytes());
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}

mod hex {
    const ALPHABET: &[u8] = b"0123456789abcdef";

    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        let bytes = bytes.as_ref();
        let mut out = String::with_capacity(bytes.len() * 2);
        for byte in bytes {
            out.push(ALPHABET[(byte >> 4) as usize] as char);
            out.push(ALPHABET[(byte & 0x0f) as usize] as char);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_provider_core::Message;

    fn base_request() -> CompletionRequest {
        CompletionRequest::new("gpt-x", vec![Message::user("hello")])
    }

    #[test]
    fn identical_requests_hash_identically() {
        assert_eq!(completion_key(&base_request()), completion_key(&base_request()));
    }

    #[test]
    fn different_messages_hash_differently() {
        let other = CompletionRequest::new("gpt-x", vec![Message::user("goodbye")]);
        assert_ne!(completion_key(&base_request()), completion_key(&other));
    }

    #[test]
    fn tool_presence_changes_key() {
        let mut with_tools = base_request();
        with_tools.tools.push(nexus_provider_core::ToolDeclaration {
            name: "lookup".into(),
            description: None,
            parameters_schema: serde_json::json!({}),
        });
        assert_ne!(completion_key(&base_request()), completion_key(&with_tools));
    }

    #[test]
    fn non_default_response_format_changes_key() {
        let mut with_format = base_request();
        with_format.response_format = Some(ResponseFormat::JsonSchema {
            name: "x".into(),
            schema: serde_json::json!({}),
        });
        assert_ne!(completion_key(&base_request()), completion_key(&with_format));
    }

    #[test]
    fn explicit_default_response_format_is_a_no_op() {
        let mut with_text = base_request();
        with_text.response_format = Some(ResponseFormat::Text);
        assert_eq!(completion_key(&base_request()), completion_key(&with_text));
    }

    #[test]
    fn stop_sequence_order_does_not_affect_key() {
        let mut a = base_request();
        a.stop = vec!["b".into(), "a".into()];
        let mut b = base_request();
        b.stop = vec!["a".into(), "b".into()];
        assert_eq!(completion_key(&a), completion_key(&b));
    }

    #[test]
    fn temperature_rounds_to_six_decimals() {
        let mut a = base_request();
        a.temperature = Some(0.7);
        let mut b = base_request();
        b.temperature = Some(0.700_000_4);
        assert_eq!(completion_key(&a), completion_key(&b));
    }
}
