mod backends;
mod error;
mod routes;

use std::fs::File;
use std::sync::Arc;

use lyricmux_core::{CoreError, LyricmuxConfig, LyricsAggregator};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::backends::create_backends;
use crate::routes::{router, AppState};

fn main() {
    // Config is loaded before logging so the file layer can be enabled from it
    let config = LyricmuxConfig::load_or_create();
    init_tracing(config.as_ref().is_ok_and(|c| c.logging.enabled));

    let config = match config {
        Ok(config) => config,
        Err(CoreError::ConfigParseError(parse_error)) => {
            error!(
                "Config file {} has syntax errors: {parse_error}",
                LyricmuxConfig::config_path().display()
            );
            std::process::exit(1);
        }
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    let backends = match create_backends(&config.backends) {
        Ok(backends) => backends,
        Err(e) => {
            error!("Failed to create lyrics backends: {e}");
            std::process::exit(1);
        }
    };

    let aggregator = LyricsAggregator::from_config(backends, &config.backends);
    info!(
        "Initialized {} lyrics backend(s): {:?}",
        aggregator.backend_ids().len(),
        aggregator.backend_ids()
    );

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {e}");
            std::process::exit(1);
        }
    };

    // Create shared cancellation token for graceful shutdown
    let cancel_token = CancellationToken::new();

    let ctrlc_token = cancel_token.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received Ctrl+C, shutting down gracefully...");
        ctrlc_token.cancel();
    }) {
        error!("Failed to set Ctrl+C handler: {e}");
    }

    let state = AppState {
        aggregator: Arc::new(aggregator),
    };
    let address = config.server.bind_address();

    if let Err(e) = runtime.block_on(serve(&address, state, cancel_token)) {
        error!("Server error on {address}: {e}");
        std::process::exit(1);
    }

    info!("Server stopped");
}

async fn serve(address: &str, state: AppState, shutdown: CancellationToken) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(address).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
}

/// Initialize tracing with console output and optional file logging
fn init_tracing(file_logging_enabled: bool) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer();

    if file_logging_enabled {
        let log_path = lyricmux_core::log_file_path();

        if let Some(parent) = log_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        match File::create(&log_path) {
            Ok(file) => {
                let file_layer = tracing_subscriber::fmt::layer()
                    .with_writer(Arc::new(file))
                    .with_ansi(false);

                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt_layer)
                    .with(file_layer)
                    .init();

                return;
            }
            Err(e) => {
                eprintln!("Failed to create log file at {}: {e}", log_path.display());
            }
        }
    }

    // Fallback: console only
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
