//! CLI command definitions and dispatch.

pub mod config;
pub mod serve;
pub mod token;

use clap::{Parser, Subcommand};

use wolverine_core::config::AppConfig;
use wolverine_core::error::AppError;

use crate::output::OutputFormat;

/// Wolverine House real-time messaging server
#[derive(Debug, Parser)]
#[command(name = "wolverine", version, about, long_about = None)]
pub struct Cli {
    /// Configuration file; overrides the environment-based lookup
    #[arg(short, long)]
    pub config: Option<String>,

    /// Environment overlay to load from `config/{env}.toml`
    #[arg(short, long, env = "WOLVERINE_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the server
    Serve(serve::ServeArgs),
    /// Configuration management
    Config(config::ConfigArgs),
    /// Credential tooling
    Token(token::TokenArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Serve(args) => serve::execute(args, self).await,
            Commands::Config(args) => config::execute(args, self),
            Commands::Token(args) => token::execute(args, self),
        }
    }

    /// Resolve configuration from `--config` or `--env`.
    pub fn load_config(&self) -> Result<AppConfig, AppError> {
        match &self.config {
            Some(path) => AppConfig::load_file(path),
            None => AppConfig::load(&self.env),
        }
    }

    /// Location the configuration was read from, for display.
    pub fn config_source(&self) -> String {
        match &self.config {
            Some(path) => path.clone(),
            None => format!("config/default + config/{}", self.env),
        }
    }
}
