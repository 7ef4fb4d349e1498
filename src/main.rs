//! Wolverine House real-time server.
//!
//! Loads configuration, installs logging, and serves the WebSocket
//! presence and messaging layer until Ctrl+C or SIGTERM.

use wolverine_core::config::AppConfig;

#[tokio::main]
async fn main() {
    let env = std::env::var("WOLVERINE_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    wolverine_api::telemetry::init_logging(&config.logging);
    tracing::info!(env = %env, "Starting Wolverine House v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = wolverine_api::run_server(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
