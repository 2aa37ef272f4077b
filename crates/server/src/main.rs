use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use helpdesk_core::{
    create_intake_queue, create_mailer, create_notifier, load_config, validate_config,
    IntakeProcessor, KeywordTable, RequesterStore, SqliteRequesterStore, StalenessSweeper,
    UrgencyScorer,
};
use helpdesk_server::api::create_router;
use helpdesk_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("HELPDESK_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Database path: {:?}", config.database.path);
    info!("Requester table: {}", config.database.table);

    // Create requester store
    let store: Arc<dyn RequesterStore> = Arc::new(
        SqliteRequesterStore::new(&config.database.path, &config.database.table)
            .context("Failed to create requester store")?,
    );
    info!("Requester store initialized");

    // Load keyword table
    let keywords = match &config.triage.keywords_path {
        Some(path) => {
            info!("Loading keyword table from {:?}", path);
            KeywordTable::load(path).context("Failed to load keyword table")?
        }
        None => KeywordTable::builtin(),
    };
    info!("Keyword table ready ({} keywords)", keywords.len());
    let scorer = UrgencyScorer::new(Arc::new(keywords));

    // Create side channels
    let notifier = create_notifier(&config.notifier).context("Failed to create notifier")?;
    info!("Notifier publishing to channel {}", notifier.channel());
    let mailer = create_mailer(&config.mailer).context("Failed to create mailer")?;
    info!("Mailer sending from {}", mailer.sender());

    // Create intake processor and queue
    let processor = IntakeProcessor::new(
        Arc::clone(&store),
        scorer,
        Arc::clone(&notifier),
        mailer,
    )
    .with_timeouts(
        Duration::from_secs(config.notifier.timeout_secs),
        Duration::from_secs(config.mailer.timeout_secs),
    );
    let (queue, consumer) = create_intake_queue(&config.queue, Arc::new(processor));

    // Spawn consumer task
    let consumer_handle = tokio::spawn(consumer.run());
    info!("Intake consumer started for queue {}", config.queue.name);

    // Create sweeper and its schedule
    let sweeper = StalenessSweeper::new(
        Arc::clone(&store),
        notifier,
        config.sweeper.clone(),
        Duration::from_secs(config.notifier.timeout_secs),
    );
    let (shutdown_tx, _) = broadcast::channel(1);
    let schedule_handle = if config.sweeper.enabled {
        Some(sweeper.spawn_schedule(shutdown_tx.subscribe()))
    } else {
        info!("Scheduled stale sweep disabled in config");
        None
    };

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), store, queue, sweeper));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");

    // Stop the sweep schedule
    let _ = shutdown_tx.send(());
    if let Some(handle) = schedule_handle {
        let _ = handle.await;
    }

    // The router (and with it the last queue handle) is gone, so the consumer
    // drains what is buffered and exits.
    let _ = consumer_handle.await;
    info!("Intake consumer stopped");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
