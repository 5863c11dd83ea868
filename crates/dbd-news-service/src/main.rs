use dbd_news_service::{
    DefaultAppState,
    config::Config,
    db::Database,
    pipeline::Ingestor,
    routes::create_router,
    scrape::run_sources,
    shutdown::{GracefulShutdownLayer, ShutdownState},
    sources::{SourceKind, build_sources},
};
use std::time::Duration;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("dbd_news_service=debug".parse().unwrap()),
        )
        .init();

    let config = Config::from_env().unwrap_or_else(|err| {
        error!(error = %format!("{err:#}"), "Invalid configuration");
        std::process::exit(1);
    });

    let database = Database::connect(&config.database_url).unwrap_or_else(|err| {
        error!(database_url = %config.database_url, error = %err, "Failed to connect to database");
        std::process::exit(1);
    });

    info!(database_url = %config.database_url, "Connected to database");

    if config.scrape_on_startup {
        spawn_startup_scrape(&config, &database);
    }

    let app_state = DefaultAppState::new(database.repository());
    let shutdown_state = ShutdownState::new();

    let app = create_router()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(GracefulShutdownLayer::new(shutdown_state.clone()))
                .layer(TimeoutLayer::new(Duration::from_secs(15))),
        )
        .with_state(app_state);

    let bind_address = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .unwrap_or_else(|err| {
            error!(bind_address = %bind_address, error = %err, "Failed to bind to address");
            std::process::exit(1);
        });

    info!("Server running on http://localhost:{}", config.port);

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal(shutdown_state));

    if let Err(err) = server.await {
        error!(error = %err, "Server error");
        std::process::exit(1);
    }

    database.close();
}

/// Best-effort scrape of every source in the background; never blocks serving.
fn spawn_startup_scrape(config: &Config, database: &Database) {
    let sources = match build_sources(config, &SourceKind::ALL) {
        Ok(sources) => sources,
        Err(err) => {
            warn!(error = %err, "Skipping startup scrape: failed to build HTTP client");
            return;
        }
    };
    let ingestor = Ingestor::with_retention(database.repository(), config.retention());

    tokio::spawn(async move {
        info!("Running startup scrape");
        let runs = run_sources(&sources, &ingestor).await;
        let saved: usize = runs.iter().map(|run| run.report.inserted).sum();
        info!(sources = runs.len(), saved, "Startup scrape complete");
    });
}

async fn shutdown_signal(shutdown_state: ShutdownState) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!(error = %err, "Failed to install SIGTERM handler");
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

    info!("Shutdown signal received, starting graceful shutdown");
    shutdown_state.start_shutdown();

    shutdown_state.wait_idle().await;
    info!("Graceful shutdown completed - all requests finished");
}
