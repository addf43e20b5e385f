use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use nexus_common::Id;
use nexus_core::{EngineBuilder, RequestContext};
use nexus_guardrails::{ContentFilterAction, ContentFilterGuard, Phase as GuardPhase};
use nexus_provider_core::{CompletionRequest, GatewayError, Message, Provider};
use nexus_routing::Priority;

mod cli;
mod demo_provider;

use cli::Cli;
use demo_provider::DemoProvider;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let provider: Arc<dyn Provider> = Arc::new(DemoProvider);
    let mut builder = EngineBuilder::new()
        .with_provider(provider)
        .with_routing_strategy(Arc::new(Priority));

    if !cli.blocklist.is_empty() {
        builder = builder.with_guard(Arc::new(ContentFilterGuard::new(
            GuardPhase::Input,
            ContentFilterAction::Block,
            cli.blocklist,
        )));
    }

    let engine = builder.build().await?;

    let mut ctx = RequestContext::new(Id::new());
    let request = CompletionRequest::new(cli.model, vec![Message::user(cli.message)]);

    match engine.complete(&mut ctx, request).await {
        Ok(response) => {
            for choice in &response.choices {
                println!("{}", choice.message.content.as_plain_text());
            }
            tracing::info!(
                provider = %response.provider,
                latency_ms = ctx.elapsed().as_millis() as u64,
                "request completed"
            );
        }
        Err(GatewayError::GuardrailBlocked { guard, reason }) => {
            eprintln!("blocked by {guard}: {reason}");
            std::process::exit(1);
        }
        Err(err) => {
            eprintln!("request failed: {err}");
            std::process::exit(1);
        }
    }

    Ok(())
}
