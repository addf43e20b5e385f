use std::sync::Arc;

use async_trait::async_trait;
use nexus_provider_core::{CompletionRequest, CompletionResponse, GatewayResult};

use crate::context::RequestContext;

/// The terminal step a middleware chain wraps: by default the routing +
/// resilience + provider call, but any middleware registered in the
/// 300–399 band takes its place (spec §4.1).
#[async_trait]
pub trait Terminal: Send + Sync {
    async fn call(
        &self,
        ctx: &mut RequestContext,
        request: CompletionRequest,
    ) -> GatewayResult<CompletionResponse>;
}

/// One processing stage. `priority` places it in a canonical band (spec
/// §4.1): 0–99 auth/rate-limit/budget, 100–199 input guardrails, 200–299
/// cache/input transforms, 300–399 routing+provider, 400–499 output
/// guardrails/output transforms, 500–599 usage/audit. Usage/audit
/// middlewares must see the response exactly as the caller does, so the
/// engine actually registers the built-in one below the 0–99 band (see
/// [`crate::builtins::UsageMiddleware`]): being numerically outermost is
/// what makes it logically last on unwind.
#[async_trait]
pub trait Middleware: Send + Sync {
    fn name(&self) -> &str;
    fn priority(&self) -> i32;

    async fn process(
        &self,
        ctx: &mut RequestContext,
        request: CompletionRequest,
        next: Next<'_>,
    ) -> GatewayResult<CompletionResponse>;
}

/// The remaining chain from one middleware's point of view: calling it
/// invokes the next middleware in priority order, or the terminal step once
/// the chain is exhausted.
pub struct Next<'a> {
    chain: &'a [Arc<dyn Middleware>],
    terminal: &'a dyn Terminal,
}

impl<'a> Next<'a> {
    pub async fn call(
        self,
        ctx: &mut RequestContext,
        request: CompletionRequest,
    ) -> GatewayResult<CompletionResponse> {
        match self.chain.split_first() {
            Some((middleware, rest)) => {
                let next = Next {
                    chain: rest,
                    terminal: self.terminal,
                };
                middleware.process(ctx, request, next).await
            }
            None => self.terminal.call(ctx, request).await,
        }
    }
}

/// A priority-sorted, build-once chain (spec §4.1). Each middleware runs at
/// most once per request; a middleware sees the request only after every
/// lower-priority middleware has returned from its own `next` call, so an
/// error from any stage aborts the chain upward without later stages
/// observing it as a fresh request.
pub struct MiddlewareChain {
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareChain {
    pub fn new(mut middlewares: Vec<Arc<dyn Middleware>>) -> Self {
        middlewares.sort_by_key(|m| m.priority());
        Self { middlewares }
    }

    pub async fn run(
        &self,
        ctx: &mut RequestContext,
        request: CompletionRequest,
        terminal: &dyn Terminal,
    ) -> GatewayResult<CompletionResponse> {
        let next = Next {
            chain: &self.middlewares,
            terminal,
        };
        next.call(ctx, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_common::Id;
    use nexus_provider_core::{Choice, FinishReason, Message, Usage};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct RecordingTerminal(Arc<AtomicUsize>);
    #[async_trait]
    impl Terminal for RecordingTerminal {
        async fn call(
            &self,
            _ctx: &mut RequestContext,
            _request: CompletionRequest,
        ) -> GatewayResult<CompletionResponse> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(CompletionResponse {
                provider: "p".into(),
                model: "m".into(),
                created: 0,
                choices: vec![Choice {
                    index: 0,
                    message: Message::new(nexus_provider_core::Role::Assistant, "ok"),
                    finish_reason: FinishReason::Stop,
                }],
                usage: Usage::default(),
                latency: Duration::ZERO,
            })
        }
    }

    struct TagMiddleware {
        priority: i32,
        order: Arc<std::sync::Mutex<Vec<i32>>>,
    }
    #[async_trait]
    impl Middleware for TagMiddleware {
        fn name(&self) -> &str {
            "tag"
        }
        fn priority(&self) -> i32 {
            self.priority
        }
        async fn process(
            &self,
            ctx: &mut RequestContext,
            request: CompletionRequest,
            next: Next<'_>,
        ) -> GatewayResult<CompletionResponse> {
            self.order.lock().unwrap().push(self.priority);
            next.call(ctx, request).await
        }
    }

    struct ShortCircuit;
    #[async_trait]
    impl Middleware for ShortCircuit {
        fn name(&self) -> &str {
            "short-circuit"
        }
        fn priority(&self) -> i32 {
            0
        }
        async fn process(
            &self,
            _ctx: &mut RequestContext,
            _request: CompletionRequest,
            _next: Next<'_>,
        ) -> GatewayResult<CompletionResponse> {
            Err(nexus_provider_core::GatewayError::InvalidInput("blocked".into()))
        }
    }

    #[tokio::test]
    async fn middlewares_run_in_priority_order_then_terminal() {
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let chain = MiddlewareChain::new(vec![
            Arc::new(TagMiddleware { priority: 300, order: order.clone() }),
            Arc::new(TagMiddleware { priority: 50, order: order.clone() }),
            Arc::new(TagMiddleware { priority: 150, order: order.clone() }),
        ]);
        let calls = Arc::new(AtomicUsize::new(0));
        let terminal = RecordingTerminal(calls.clone());
        let mut ctx = RequestContext::new(Id::new());
        let request = CompletionRequest::new("m", vec![Message::user("hi")]);

        chain.run(&mut ctx, request, &terminal).await.unwrap();
        assert_eq!(*order.lock().unwrap(), vec![50, 150, 300]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn a_short_circuiting_middleware_never_reaches_the_terminal() {
        let chain = MiddlewareChain::new(vec![Arc::new(ShortCircuit)]);
        let calls = Arc::new(AtomicUsize::new(0));
        let terminal = RecordingTerminal(calls.clone());
        let mut ctx = RequestContext::new(Id::new());
        let request = CompletionRequest::new("m", vec![Message::user("hi")]);

        let result = chain.run(&mut ctx, request, &terminal).await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_chain_goes_straight_to_terminal() {
        let chain = MiddlewareChain::new(vec![]);
        let calls = Arc::new(AtomicUsize::new(0));
        let terminal = RecordingTerminal(calls.clone());
        let mut ctx = RequestContext::new(Id::new());
        let request = CompletionRequest::new("m", vec![Message::user("hi")]);

        chain.run(&mut ctx, request, &terminal).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
