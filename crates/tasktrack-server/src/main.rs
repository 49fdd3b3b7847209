//! # TaskTrack Server
//!
//! Main entry point for the TaskTrack application.

use tasktrack_config::{AppConfig, ConfigLoader};
use tasktrack_core::{TrackError, TrackResult};
use tasktrack_rest::create_router;
use tasktrack_server::{
    di::{build_module, build_state, ClientResolver},
    startup::{print_banner, print_startup_info, report_cache_health},
};
use tasktrack_service::CacheInterface;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = match ConfigLoader::from_default_location() {
        Ok(loader) => loader.into_config(),
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);
    print_banner();

    info!("Starting TaskTrack Server...");
    info!("Version: {}", config.app.version);
    info!("Environment: {}", config.app.environment);

    if let Err(e) = run(config).await {
        error!("Application error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> TrackResult<()> {
    let module = build_module(&config)?;
    let state = build_state(&module, &config)?;

    report_cache_health(&module.cache().health_check().await);

    let router = create_router(state, &config.server);

    let addr = config.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| TrackError::Internal(format!("Failed to bind {}: {}", addr, e)))?;

    print_startup_info(&config);
    info!("Application is running on: http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| TrackError::Internal(format!("REST server error: {}", e)))?;

    info!("Server shutdown complete");
    Ok(())
}

fn init_logging(config: &AppConfig) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{},tasktrack=debug,tower_http=debug",
            config.observability.log_level
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.observability.log_format.eq_ignore_ascii_case("json") {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            info!("Received terminate signal, initiating graceful shutdown...");
        }
    }
}
