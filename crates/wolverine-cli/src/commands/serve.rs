//! Start the server.

use clap::Args;

use wolverine_core::error::AppError;

use super::Cli;

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Override the server port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Override the server host
    #[arg(long)]
    pub host: Option<String>,
}

/// Execute the serve command
pub async fn execute(args: &ServeArgs, cli: &Cli) -> Result<(), AppError> {
    let mut config = cli.load_config()?;

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }

    wolverine_api::telemetry::init_logging(&config.logging);
    tracing::info!(
        source = %cli.config_source(),
        host = %config.server.host,
        port = config.server.port,
        "Starting Wolverine House v{}",
        env!("CARGO_PKG_VERSION")
    );

    wolverine_api::run_server(config).await
}
