use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::event::Event;

/// An observer's verdict on handling one event. An `Err` is logged and
/// swallowed by the bus; it never propagates into the pipeline (spec
/// §4.9's delivery contract).
pub type ExtensionOutcome = Result<(), String>;

/// A single extension opts in to any subset of the five lifecycle
/// interfaces by overriding the corresponding method; every method defaults
/// to a no-op, so an extension interested only in budget events overrides
/// nothing else.
#[async_trait]
pub trait Extension: Send + Sync {
    fn name(&self) -> &str;

    async fn on_request(&self, _event: &Event) -> ExtensionOutcome {
        Ok(())
    }
    async fn on_provider(&self, _event: &Event) -> ExtensionOutcome {
        Ok(())
    }
    async fn on_guardrail(&self, _event: &Event) -> ExtensionOutcome {
        Ok(())
    }
    async fn on_tenant_key(&self, _event: &Event) -> ExtensionOutcome {
        Ok(())
    }
    async fn on_budget(&self, _event: &Event) -> ExtensionOutcome {
        Ok(())
    }
}

enum HookGroup {
    Request,
    Provider,
    Guardrail,
    TenantKey,
    Budget,
}

fn group_of(event: &Event) -> HookGroup {
    match event {
        Event::RequestReceived(_)
        | Event::RequestCompleted(_)
        | Event::RequestFailed(_)
        | Event::RequestCached(_) => HookGroup::Request,
        Event::ProviderFailed(_) | Event::CircuitOpened(_) | Event::FallbackTriggered(_) => {
            HookGroup::Provider
        }
        Event::GuardrailBlocked(_) | Event::GuardrailRedacted(_) => HookGroup::Guardrail,
        Event::TenantCreated(_) | Event::TenantDisabled(_) | Event::KeyCreated(_) | Event::KeyRevoked(_) => {
            HookGroup::TenantKey
        }
        Event::BudgetWarning(_) | Event::BudgetExceeded(_) => HookGroup::Budget,
    }
}

/// Type-routed lifecycle event dispatch. Observers are invoked in
/// registration order, synchronously relative to the emitting call (spec
/// §4.9). `emit` is only "done" once every extension has seen the event.
#[derive(Default)]
pub struct ExtensionBus {
    extensions: RwLock<Vec<Arc<dyn Extension>>>,
}

impl ExtensionBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, extension: Arc<dyn Extension>) {
        self.extensions.write().await.push(extension);
    }

    pub async fn emit(&self, event: Event) {
        let extensions = self.extensions.read().await;
        let group = group_of(&event);
        for extension in extensions.iter() {
            let outcome = match group {
                HookGroup::Request => extension.on_request(&event).await,
                HookGroup::Provider => extension.on_provider(&event).await,
                HookGroup::Guardrail => extension.on_guardrail(&event).await,
                HookGroup::TenantKey => extension.on_tenant_key(&event).await,
                HookGroup::Budget => extension.on_budget(&event).await,
            };
            if let Err(message) = outcome {
                tracing::warn!(
                    extension = extension.name(),
                    event = event.name(),
                    error = %message,
                    "extension observer failed; swallowing"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use crate::event::{RequestCompleted, RequestFailed, RequestReceived};

    use super::*;

    struct Recorder {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Extension for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }
        async fn on_request(&self, event: &Event) -> ExtensionOutcome {
            self.seen.lock().unwrap().push(event.name().to_string());
            Ok(())
        }
    }

    struct Failing;

    #[async_trait]
    impl Extension for Failing {
        fn name(&self) -> &str {
            "failing"
        }
        async fn on_request(&self, _event: &Event) -> ExtensionOutcome {
            Err("boom".to_string())
        }
    }

    fn request_id() -> nexus_common::RequestId {
        nexus_common::Id::new()
    }

    #[tokio::test]
    async fn dispatches_only_to_matching_hook() {
        let bus = ExtensionBus::new();
        let recorder = Arc::new(Recorder {
            seen: Mutex::new(Vec::new()),
        });
        bus.register(recorder.clone()).await;

        bus.emit(Event::RequestReceived(RequestReceived {
            request_id: request_id(),
            tenant_id: None,
            key_id: None,
            model: "fast".into(),
        }))
        .await;
        bus.emit(Event::CircuitOpened(crate::event::CircuitOpened {
            provider: "openai".into(),
        }))
        .await;

        let seen = recorder.seen.lock().unwrap();
        assert_eq!(*seen, vec!["request.received".to_string()]);
    }

    #[tokio::test]
    async fn failing_observer_does_not_block_others() {
        let bus = ExtensionBus::new();
        bus.register(Arc::new(Failing)).await;
        let recorder = Arc::new(Recorder {
            seen: Mutex::new(Vec::new()),
        });
        bus.register(recorder.clone()).await;

        bus.emit(Event::RequestFailed(RequestFailed {
            request_id: request_id(),
            reason: "oops".into(),
        }))
        .await;

        assert_eq!(recorder.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn observers_invoked_in_registration_order() {
        let bus = ExtensionBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        struct Tagged(&'static str, Arc<Mutex<Vec<&'static str>>>);
        #[async_trait]
        impl Extension for Tagged {
            fn name(&self) -> &str {
                self.0
            }
            async fn on_request(&self, _event: &Event) -> ExtensionOutcome {
                self.1.lock().unwrap().push(self.0);
                Ok(())
            }
        }

        bus.register(Arc::new(Tagged("first", order.clone()))).await;
        bus.register(Arc::new(Tagged("second", order.clone()))).await;

        bus.emit(Event::RequestFailed(RequestFailed {
            request_id: request_id(),
            reason: "x".into(),
        }))
        .await;

        assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
    }
}
