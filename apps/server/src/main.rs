//! geocat-server: the HTTP API, the dispatcher workers and the watchdog in
//! one process over the in-memory drivers.

mod config;

use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;
use geocat_api::AppState;
use geocat_catalog::ResourceManager;
use geocat_log::LoggerBuilder;
use geocat_queue_memory::MemoryQueue;
use geocat_runtime::{HandlerRegistry, Runtime};
use geocat_storage_memory::{MemoryDirectory, MemoryExecutionRepo, MemoryResourceRepo};
use geocat_telemetry::{EventBus, MetricsRegistry};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::config::{Cli, ServerConfig};

const EVENT_BUS_CAPACITY: usize = 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if let Some(path) = &cli.config
        && !path.exists()
    {
        bail!("config file {} does not exist", path.display());
    }
    let config = ServerConfig::load(&cli).context("invalid configuration")?;
    let _log = LoggerBuilder::from_config(config.log.clone())
        .build()
        .context("failed to initialize logging")?;

    let directory = Arc::new(MemoryDirectory::new());
    for user in &config.users {
        directory.insert(user.clone());
    }
    let manager = Arc::new(ResourceManager::new(
        Arc::new(MemoryResourceRepo::new()),
        directory.clone(),
        Arc::new(EventBus::new(EVENT_BUS_CAPACITY)),
        config.permissions,
    ));
    let runtime = Arc::new(Runtime::new(
        Arc::new(MemoryExecutionRepo::new()),
        Arc::new(MemoryQueue::new(config.runtime.queue_capacity)),
        Arc::new(HandlerRegistry::with_defaults(&manager)),
        Arc::new(EventBus::new(EVENT_BUS_CAPACITY)),
        Arc::new(MetricsRegistry::new()),
        config.runtime.clone(),
    ));

    let shutdown = CancellationToken::new();
    let workers = runtime.start(&shutdown);
    let metrics = Arc::clone(runtime.metrics());

    let app = geocat_api::router(AppState::new(runtime, manager, directory));
    let listener = TcpListener::bind(config.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind))?;
    tracing::info!(
        bind = %config.server.bind,
        users = config.users.len(),
        "geocat server listening"
    );

    let signal = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %err, "could not listen for ctrl-c");
            }
            tracing::info!("shutting down");
            signal.cancel();
        })
        .await
        .context("server error")?;

    // Workers finish the request in hand before exiting.
    shutdown.cancel();
    for worker in workers {
        if let Err(err) = worker.await {
            tracing::warn!(error = %err, "worker task ended abnormally");
        }
    }
    for (name, value) in metrics.counter_values() {
        tracing::info!(metric = %name, value, "counter");
    }
    for (name, value) in metrics.gauge_values() {
        tracing::info!(metric = %name, value, "gauge");
    }
    for (name, summary) in metrics.histogram_summaries() {
        tracing::info!(
            metric = %name,
            count = summary.count,
            mean = summary.mean().unwrap_or_default(),
            max = summary.max,
            "histogram"
        );
    }
    tracing::info!("geocat server stopped");
    Ok(())
}
