use axum::Router;
use axum_mysql_admin::{AdminLayer, DatabaseProvider};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;

use config::{Backend, Config};

/// Initialize the tracing subscriber for logging.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber.with(fmt::layer().json()).init();
    } else {
        subscriber.with(fmt::layer().with_target(true)).init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();
    init_tracing(&config);

    match config.backend {
        Backend::Mysql => {
            let layer = AdminLayer::mysql(&config.base_path, config.admin_config());
            run(layer, &config).await
        }
        Backend::Sqlite => {
            let layer = AdminLayer::sqlite(&config.base_path, config.admin_config());
            run(layer, &config).await
        }
    }
}

async fn run<DB: DatabaseProvider>(
    layer: AdminLayer<DB>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let layer = if config.static_dir.is_dir() {
        info!(directory = %config.static_dir.display(), "Serving static files");
        layer.with_static_dir(&config.static_dir)
    } else {
        warn!(
            directory = %config.static_dir.display(),
            "Static directory not found, serving API only"
        );
        layer
    };

    let service = layer.service();
    let app: Router = layer.into_router();

    let address = config.socket_address();
    let listener = tokio::net::TcpListener::bind(address).await?;

    info!(
        backend = ?config.backend,
        "Server running on http://{}{}",
        address,
        config.base_path
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The session lives until the process exits
    service.shutdown().await;
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(%error, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
