use anyhow::{Context, Result};
use fleetview::api::{create_router, ApiState};
use fleetview::channel::{command_channel, run_feed, write_commands};
use fleetview::config;
use fleetview::console::OperatorConsole;
use fleetview::lifecycle::{run_reconciler, LayerManager};
use fleetview::map::{RecordingSurface, SharedSurface};
use fleetview::state::SnapshotStore;
use fleetview::viewport::ViewportController;
use std::sync::Arc;
use tokio::io::{stdin, stdout, AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use tokio_stream::wrappers::SplitStream;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fleetview=info".into()),
        )
        .init();

    info!("Fleetview starting...");

    let config = config::from_env()?;

    let store = Arc::new(SnapshotStore::new());
    let surface: SharedSurface = Arc::new(Mutex::new(RecordingSurface::new(
        ViewportController::initial_camera(&config.viewport),
    )));

    // Map reconciliation
    let manager = LayerManager::new(
        surface.clone(),
        config.coverage.clone(),
        config.animation.tick_interval(),
    );
    tokio::spawn(run_reconciler(
        store.clone(),
        manager,
        config.animation.frame_interval(),
    ));

    // Inbound frames arrive one JSON object per line on stdin
    let feed_store = store.clone();
    tokio::spawn(async move {
        let lines = SplitStream::new(BufReader::new(stdin()).split(b'\n'));
        match run_feed(lines, &feed_store).await {
            Ok(summary) => info!(
                applied = summary.applied,
                skipped = summary.skipped,
                "Stdin feed closed"
            ),
            Err(e) => error!(error = %e, "Stdin feed failed"),
        }
    });

    // Outbound commands leave as JSON lines on stdout
    let (commands, command_rx) = command_channel(64);
    tokio::spawn(async move {
        if let Err(e) = write_commands(command_rx, stdout()).await {
            error!(error = %e, "Command writer stopped");
        }
    });

    let viewport = ViewportController::new(surface, config.viewport.clone());
    let console = Arc::new(OperatorConsole::new(
        store,
        commands,
        viewport,
        config.search.debounce(),
    ));

    let app = create_router(Arc::new(ApiState { console })).layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&config.api.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.api.bind_addr))?;
    info!(addr = %config.api.bind_addr, "Operator API listening");

    axum::serve(listener, app)
        .await
        .context("Operator API server failed")?;

    Ok(())
}
