use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use nexus_common::Id;
use nexus_provider_core::{
    Capabilities, CompletionRequest, CompletionResponse, CompletionStream, EmbeddingRequest,
    EmbeddingResponse, GatewayError, GatewayResult, Model, Provider, Usage,
};
use nexus_resilience::{ResiliencePolicy, ResilienceExecutor};
use nexus_routing::Candidate;
use nexus_extensions::ExtensionBus;
use tokio_util::sync::CancellationToken;

struct AlwaysFails(&'static str);

#[async_trait]
impl Provider for AlwaysFails {
    fn name(&self) -> &str {
        self.0
    }
    fn capabilities(&self) -> Capabilities {
        Capabilities::chat_only()
    }
    async fn models(&self) -> GatewayResult<Vec<Model>> {
        Ok(vec![])
    }
    async fn complete(&self, _req: CompletionRequest) -> GatewayResult<CompletionResponse> {
        Err(GatewayError::Transport("boom".into()))
    }
    async fn complete_stream(&self, _req: CompletionRequest) -> GatewayResult<CompletionStream> {
        unimplemented!()
    }
    async fn embed(&self, _req: EmbeddingRequest) -> GatewayResult<EmbeddingResponse> {
        unimplemented!()
    }
    async fn healthy(&self) -> bool {
        true
    }
}

struct Succeeds(&'static str, Arc<AtomicU32>);

#[async_trait]
impl Provider for Succeeds {
    fn name(&self) -> &str {
        self.0
    }
    fn capabilities(&self) -> Capabilities {
        Capabilities::chat_only()
    }
    async fn models(&self) -> GatewayResult<Vec<Model>> {
        Ok(vec![])
    }
    async fn complete(&self, _req: CompletionRequest) -> GatewayResult<CompletionResponse> {
        self.1.fetch_add(1, Ordering::SeqCst);
        Ok(CompletionResponse {
            provider: self.0.to_string(),
            model: "m".into(),
            created: 0,
            choices: vec![],
            usage: Usage::default(),
            latency: Duration::ZERO,
        })
    }
    async fn complete_stream(&self, _req: CompletionRequest) -> GatewayResult<CompletionStream> {
        unimplemented!()
    }
    async fn embed(&self, _req: EmbeddingRequest) -> GatewayResult<EmbeddingResponse> {
        unimplemented!()
    }
    async fn healthy(&self) -> bool {
        true
    }
}

fn candidate(provider: Arc<dyn Provider>) -> Candidate {
    Candidate {
        provider,
        model: "m".to_string(),
        cost: 0.0,
        latency: Duration::ZERO,
        healthy: true,
    }
}

#[tokio::test]
async fn circuit_trips_then_fallback_succeeds() {
    let policy = ResiliencePolicy {
        max_retries: 0,
        retry_delay: Duration::from_millis(1),
        retry_backoff: 1.0,
        timeout: Duration::from_secs(1),
        circuit_threshold: 3,
        circuit_timeout: Duration::from_secs(30),
    };
    let bus = Arc::new(ExtensionBus::new());
    let executor = ResilienceExecutor::new(policy, bus);
    let cancel = CancellationToken::new();

    let provider_a: Arc<dyn Provider> = Arc::new(AlwaysFails("a"));
    let calls_b = Arc::new(AtomicU32::new(0));
    let provider_b: Arc<dyn Provider> = Arc::new(Succeeds("b", calls_b.clone()));

    let candidate_a = candidate(provider_a);
    let candidate_b = candidate(provider_b);
    let request_id = Id::new();

    // Trip the breaker for A with three independent requests.
    for _ in 0..3 {
        let result = executor
            .execute(request_id, &candidate_a, &[], &cancel, |c| {
                let req = CompletionRequest::new("m", vec![]);
                let provider = c.provider.clone();
                async move { provider.complete(req).await }
            })
            .await;
        assert!(result.is_err());
    }

    // Fourth attempt against A alone must fail fast with CircuitOpen.
    let fast_fail = executor
        .execute(request_id, &candidate_a, &[], &cancel, |c| {
            let req = CompletionRequest::new("m", vec![]);
            let provider = c.provider.clone();
            async move { provider.complete(req).await }
        })
        .await;
    assert!(matches!(
        fast_fail,
        Err(GatewayError::AllProvidersFailed(_))
    ));

    // With B as fallback, the caller sees B's response.
    let result = executor
        .execute(request_id, &candidate_a, &[candidate_b], &cancel, |c| {
            let req = CompletionRequest::new("m", vec![]);
            let provider = c.provider.clone();
            async move { provider.complete(req).await }
        })
        .await;
    assert!(result.is_ok());
    assert_eq!(calls_b.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn successful_primary_never_invokes_fallback() {
    let bus = Arc::new(ExtensionBus::new());
    let executor = ResilienceExecutor::new(ResiliencePolicy::default(), bus);
    let cancel = CancellationToken::new();

    let calls_a = Arc::new(AtomicU32::new(0));
    let provider_a: Arc<dyn Provider> = Arc::new(Succeeds("a", calls_a.clone()));
    let calls_b = Arc::new(AtomicU32::new(0));
    let provider_b: Arc<dyn Provider> = Arc::new(Succeeds("b", calls_b.clone()));

    let result = executor
        .execute(
            Id::new(),
            &candidate(provider_a),
            &[candidate(provider_b)],
            &cancel,
            |c| {
                let req = CompletionRequest::new("m", vec![]);
                let provider = c.provider.clone();
                async move { provider.complete(req).await }
            },
        )
        .await;

    assert!(result.is_ok());
    assert_eq!(calls_a.load(Ordering::SeqCst), 1);
    assert_eq!(calls_b.load(Ordering::SeqCst), 0);
}
