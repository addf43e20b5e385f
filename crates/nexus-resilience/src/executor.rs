use std::future::Future;
use std::sync::Arc;

use nexus_common::RequestId;
use nexus_extensions::{CircuitOpened, Event, ExtensionBus, FallbackTriggered};
use nexus_provider_core::{GatewayError, GatewayResult};
use nexus_routing::Candidate;
use tokio_util::sync::CancellationToken;
use tracing::{instrument, warn};

use crate::breaker_registry::BreakerRegistry;
use crate::policy::ResiliencePolicy;

/// Retries + timeout + fallback chain over an ordered candidate list (spec
/// §4.4). Generic over the call being retried so it can drive a completion,
/// a streaming completion, or an embedding with the same machinery.
pub struct ResilienceExecutor {
    policy: ResiliencePolicy,
    breakers: BreakerRegistry,
    bus: Arc<ExtensionBus>,
}

impl ResilienceExecutor {
    pub fn new(policy: ResiliencePolicy, bus: Arc<ExtensionBus>) -> Self {
        Self {
            breakers: BreakerRegistry::new(policy.circuit_threshold, policy.circuit_timeout),
            policy,
            bus,
        }
    }

    pub fn policy(&self) -> &ResiliencePolicy {
        &self.policy
    }

    /// Attempts `primary`, then each of `fallbacks` in order; the first
    /// success wins. If every candidate fails, returns
    /// `GatewayError::AllProvidersFailed` wrapping the last underlying
    /// error.
    #[instrument(skip_all, fields(primary = primary.provider_name()))]
    pub async fn execute<T, F, Fut>(
        &self,
        request_id: RequestId,
        primary: &Candidate,
        fallbacks: &[Candidate],
        cancel: &CancellationToken,
        mut call: F,
    ) -> GatewayResult<T>
    where
        F: FnMut(&Candidate) -> Fut,
        Fut: Future<Output = GatewayResult<T>>,
    {
        match self.try_with_retries(primary, cancel, &mut call).await {
            Ok(value) => return Ok(value),
            // Not Supported bypasses retry *and* fallback entirely (spec §7).
            Err(err @ GatewayError::NotSupported(_)) => return Err(err),
            Err(primary_err) => {
                let mut last_err = primary_err;
                let mut from = primary.provider_name().to_string();
                for fallback in fallbacks {
                    self.bus
                        .emit(Event::FallbackTriggered(FallbackTriggered {
                            request_id,
                            from: from.clone(),
                            to: fallback.provider_name().to_string(),
                        }))
                        .await;

                    match self.try_with_retries(fallback, cancel, &mut call).await {
                        Ok(value) => return Ok(value),
                        Err(err @ GatewayError::NotSupported(_)) => return Err(err),
                        Err(err) => {
                            from = fallback.provider_name().to_string();
                            last_err = err;
                        }
                    }
                }
                Err(GatewayError::AllProvidersFailed(last_err.to_string()))
            }
        }
    }

    async fn try_with_retries<T, F, Fut>(
        &self,
        candidate: &Candidate,
        cancel: &CancellationToken,
        call: &mut F,
    ) -> GatewayResult<T>
    where
        F: FnMut(&Candidate) -> Fut,
        Fut: Future<Output = GatewayResult<T>>,
    {
        let breaker = self.breakers.get_or_create(candidate.provider_name());
        if !breaker.allow() {
            return Err(GatewayError::CircuitOpen {
                provider: candidate.provider_name().to_string(),
            });
        }

        let mut delay = self.policy.retry_delay;
        let mut last_err: Option<GatewayError> = None;

        for attempt in 0..=self.policy.max_retries {
            if attempt > 0 {
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = cancel.cancelled() => return Err(GatewayError::Cancelled),
                }
                delay = delay.mul_f64(self.policy.retry_backoff);
            }

            match tokio::time::timeout(self.policy.timeout, call(candidate)).await {
                Ok(Ok(value)) => {
                    breaker.record_success();
                    return Ok(value);
                }
                // Not Supported is neither retried nor counted as a circuit
                // failure; it means this provider categorically cannot
                // serve the request, which is not a health signal.
                Ok(Err(err @ GatewayError::NotSupported(_))) => return Err(err),
                Ok(Err(err)) => {
                    let retriable = err.is_retriable();
                    last_err = Some(err);
                    if !retriable {
                        break;
                    }
                }
                Err(_elapsed) => {
                    last_err = Some(GatewayError::TimedOut);
                }
            }
        }

        if breaker.record_failure() {
            warn!(provider = candidate.provider_name(), "circuit opened");
            self.bus
                .emit(Event::CircuitOpened(CircuitOpened {
                    provider: candidate.provider_name().to_string(),
                }))
                .await;
        }

        Err(last_err.unwrap_or_else(|| GatewayError::Internal("no attempts made".into())))
    }
}
