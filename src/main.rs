use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

use homework_watch::config::{self, Config};
use homework_watch::endpoint::EndpointClient;
use homework_watch::jobs::poller::{CycleOutcome, Poller};
use homework_watch::models::status::HomeworkStatus;
use homework_watch::notification::telegram::TelegramNotifier;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    // Load .env before parsing so env-backed flags see it too.
    dotenvy::dotenv().ok();
    let args = cli::Cli::parse();

    match args.command {
        Some(cli::Commands::Statuses) => {
            for status in HomeworkStatus::ALL {
                println!("{:<10} {}", status, status.verdict());
            }
            Ok(())
        }
        Some(cli::Commands::Once { since }) => {
            let cfg = load_config()?;
            let mut poller = build_poller(&cfg, cfg.retry_interval, since)?;
            match poller.tick_until(shutdown_signal()).await {
                None => Ok(()),
                Some(Ok(CycleOutcome::NoUpdates)) => {
                    println!("No homework updates. Cursor: {}", poller.cursor());
                    Ok(())
                }
                Some(Ok(CycleOutcome::Unchanged)) => {
                    println!("Status unchanged. Cursor: {}", poller.cursor());
                    Ok(())
                }
                Some(Ok(CycleOutcome::Notified(message))) => {
                    println!("Sent: {}\nCursor: {}", message, poller.cursor());
                    Ok(())
                }
                Some(Err(e)) => Err(anyhow::Error::new(e).context("poll cycle failed")),
            }
        }
        Some(cli::Commands::Run { interval, since }) => {
            let cfg = load_config()?;
            let interval = interval.map(Duration::from_secs).unwrap_or(cfg.retry_interval);
            run_poller(&cfg, interval, since).await
        }
        None => {
            let cfg = load_config()?;
            run_poller(&cfg, cfg.retry_interval, None).await
        }
    }
}

fn init_tracing() -> anyhow::Result<()> {
    // Export spans over OTLP only when a collector is configured.
    use opentelemetry::KeyValue;
    use opentelemetry_sdk::{trace as sdktrace, Resource};

    let telemetry_layer = if std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").is_ok() {
        let tracer = opentelemetry_otlp::new_pipeline()
            .tracing()
            .with_exporter(opentelemetry_otlp::new_exporter().tonic())
            .with_trace_config(sdktrace::config().with_resource(Resource::new(vec![
                KeyValue::new("service.name", "homework-watch"),
            ])))
            .install_batch(opentelemetry_sdk::runtime::Tokio)
            .context("failed to install OpenTelemetry tracer")?;
        Some(tracing_opentelemetry::layer().with_tracer(tracer))
    } else {
        None
    };

    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let (text_layer, json_layer) = if json_logs {
        (None, Some(tracing_subscriber::fmt::layer().json()))
    } else {
        (Some(tracing_subscriber::fmt::layer()), None)
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "homework_watch=info".into()),
        ))
        .with(text_layer)
        .with(json_layer)
        .with(telemetry_layer)
        .init();

    Ok(())
}

fn load_config() -> anyhow::Result<Config> {
    config::load()
        .map_err(|e| {
            tracing::error!(error = %e, "startup aborted");
            e
        })
        .context("failed to load configuration")
}

fn build_poller(
    cfg: &Config,
    interval: Duration,
    since: Option<i64>,
) -> anyhow::Result<Poller<EndpointClient, TelegramNotifier>> {
    let endpoint = EndpointClient::new(&cfg.endpoint, &cfg.practicum_token, cfg.request_timeout)
        .context("failed to build status endpoint client")?;
    let notifier = TelegramNotifier::new(
        &cfg.telegram_api_url,
        &cfg.telegram_token,
        &cfg.telegram_chat_id,
        cfg.request_timeout,
    )
    .context("failed to build telegram client")?;

    let cursor = since.unwrap_or_else(|| chrono::Utc::now().timestamp());
    Ok(Poller::new(endpoint, notifier, interval, cursor))
}

async fn run_poller(cfg: &Config, interval: Duration, since: Option<i64>) -> anyhow::Result<()> {
    let poller = build_poller(cfg, interval, since)?;
    poller.run(shutdown_signal()).await;
    Ok(())
}

/// Resolves on Ctrl-C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // Without a signal handler the process simply runs until killed.
        tracing::error!(error = %e, "failed to listen for interrupt");
        std::future::pending::<()>().await;
    }
    tracing::info!("interrupt received, shutting down");
}
