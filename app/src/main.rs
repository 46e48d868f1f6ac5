mod background_service;
mod config;
mod dto;
mod infrastructure;

use std::time::Duration;

use anyhow::Context;
use colored::Colorize;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use self::background_service::prelude::*;
use self::config::{build_config, NodeConfig};
use self::infrastructure::ioc::Container;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = build_config().with_context(|| "Failed to build config".red())?;
    let node_config: NodeConfig = config
        .try_deserialize()
        .with_context(|| "Invalid config".red())?;

    infrastructure::telemetry::init_telemetry(&node_config.telemetry)
        .with_context(|| "Failed to initialize logger".red())?;

    let Container {
        coordinator,
        state,
        persistence,
        events,
    } = Container::new(&node_config)
        .await
        .with_context(|| "Cannot build IOC container".red())?;

    let token = CancellationToken::new();
    let inbox_watcher = InboxWatcher::new(coordinator, node_config.locations.inbox.clone());
    let dispatcher = JobEventDispatcher::new(persistence, state.clone(), events);
    let reporter = NodeStatusReporter::new(
        state,
        Duration::from_secs(node_config.node_status_interval.max(1)),
    );

    let background_services = [
        tokio::spawn(
            inbox_watcher
                .run(token.clone())
                .instrument(tracing::info_span!("inbox_watcher")),
        ),
        tokio::spawn(
            dispatcher
                .run(token.clone())
                .instrument(tracing::info_span!("job_events")),
        ),
        tokio::spawn(
            reporter
                .run(token.clone())
                .instrument(tracing::info_span!("node_status")),
        ),
    ];
    tracing::info!(hostname = %node_config.hostname, "Conductor started");

    tokio::signal::ctrl_c()
        .await
        .with_context(|| "Failed to listen for ctrl-c".red())?;
    tracing::info!("Stopping services (ctrl-c handling).");
    token.cancel();
    for handle in background_services {
        handle.abort();
    }
    Ok(())
}
