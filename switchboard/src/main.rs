#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;

use anyhow::Context;
use args::Args;
use clap::Parser;
use futures_util::StreamExt;
use switchboard_config::Config;
use switchboard_llm::{Client, Message, Options, RequestContext};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::load(&args.config)?;

    // Initialize telemetry
    switchboard_telemetry::init(config.telemetry.as_ref(), "warn")?;

    let (name, provider) = match &args.provider {
        Some(name) => (
            name.as_str(),
            config
                .provider(name)
                .with_context(|| format!("provider `{name}` is not configured"))?,
        ),
        None => config
            .providers
            .first()
            .map(|(name, provider)| (name.as_str(), provider))
            .context("no providers configured")?,
    };

    tracing::info!(provider = name, vendor = %provider.vendor, "sending prompt");

    let client = Client::from_config(provider);

    // Ctrl-C cancels the in-flight call
    let cancellation = CancellationToken::new();
    let cancel_on_signal = cancellation.clone();

    tokio::spawn(async move {
        shutdown_signal().await;
        cancel_on_signal.cancel();
    });

    let context = RequestContext::new().with_cancellation(cancellation);

    let options = Options {
        model: args.model,
        system_prompt: args.system,
        ..Options::default()
    };
    let messages = [Message::user(args.prompt.join(" "))];

    let mut stdout = tokio::io::stdout();

    if args.no_stream {
        let response = client.create_completion(&context, &messages, &options).await?;

        stdout.write_all(response.content.as_bytes()).await?;
        for call in &response.tool_calls {
            let line = format!("\n[tool call {}] {}({})", call.id, call.name, call.arguments);
            stdout.write_all(line.as_bytes()).await?;
        }
    } else {
        let mut stream = client.create_completion_stream(&context, &messages, &options).await?;

        while let Some(chunk) = stream.next().await {
            stdout.write_all(chunk?.as_bytes()).await?;
            stdout.flush().await?;
        }
    }

    stdout.write_all(b"\n").await?;
    stdout.flush().await?;

    Ok(())
}

/// Wait for a shutdown signal (`SIGINT` or `SIGTERM`)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("shutdown signal received, cancelling");
}
