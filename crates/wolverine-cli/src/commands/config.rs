//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use wolverine_core::config::{AppConfig, AuthConfig};
use wolverine_core::error::AppError;

use super::Cli;
use crate::output;

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the resolved configuration (secret masked)
    Show,
    /// Validate the resolved configuration
    Validate,
}

/// Execute config commands
pub fn execute(args: &ConfigArgs, cli: &Cli) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let config = cli.load_config()?;
            warn_on_default_secret(&config);
            output::print_item(&masked(config), cli.format);
        }
        ConfigCommand::Validate => match cli.load_config() {
            Ok(config) => {
                output::print_success(&format!("Configuration '{}' is valid", cli.config_source()));
                output::print_kv("Listen", &config.server.bind_address());
                output::print_kv("Environment", &config.server.environment);
                output::print_kv(
                    "Heartbeat",
                    &format!(
                        "ping every {}s, timeout {}s",
                        config.realtime.ping_interval_seconds, config.realtime.ping_timeout_seconds
                    ),
                );
                output::print_kv(
                    "Outbound buffer",
                    &config.realtime.channel_buffer_size.to_string(),
                );
                warn_on_default_secret(&config);
            }
            Err(e) => {
                output::print_error(&format!("Configuration invalid: {e}"));
                return Err(e);
            }
        },
    }

    Ok(())
}

fn warn_on_default_secret(config: &AppConfig) {
    if config.auth.jwt_secret == AuthConfig::default().jwt_secret {
        output::print_warning("auth.jwt_secret is the built-in default; set JWT_SECRET");
    }
}

fn masked(mut config: AppConfig) -> AppConfig {
    config.auth.jwt_secret = "****".to_string();
    config
}
