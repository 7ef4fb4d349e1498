//! Credential tooling.
//!
//! Mints tokens with the configured secret so a local client can connect
//! without going through the REST login flow.

use chrono::{DateTime, Duration, Utc};
use clap::{Args, Subcommand};
use serde::Serialize;

use wolverine_auth::JwtEncoder;
use wolverine_core::error::AppError;
use wolverine_core::types::UserId;

use super::Cli;
use crate::output::{self, OutputFormat};

/// Arguments for token commands
#[derive(Debug, Args)]
pub struct TokenArgs {
    /// Token subcommand
    #[command(subcommand)]
    pub command: TokenCommand,
}

/// Token subcommands
#[derive(Debug, Subcommand)]
pub enum TokenCommand {
    /// Issue a signed token for a user
    Issue {
        /// User id to embed in the token
        #[arg(short, long)]
        user: String,
        /// Role claim
        #[arg(short, long)]
        role: Option<String>,
        /// Lifetime in minutes (defaults to auth.jwt_ttl_minutes)
        #[arg(long)]
        ttl_minutes: Option<i64>,
    },
}

/// Issued token as printed in JSON mode.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IssuedToken {
    user_id: UserId,
    token: String,
    expires_at: DateTime<Utc>,
}

/// Execute token commands
pub fn execute(args: &TokenArgs, cli: &Cli) -> Result<(), AppError> {
    match &args.command {
        TokenCommand::Issue {
            user,
            role,
            ttl_minutes,
        } => {
            if user.trim().is_empty() {
                return Err(AppError::validation("--user must not be empty"));
            }

            let config = cli.load_config()?;
            let encoder = JwtEncoder::new(&config.auth);
            let user_id = UserId::new(user.trim());

            let (token, expires_at) = match ttl_minutes {
                Some(minutes) => {
                    encoder.issue_with_ttl(&user_id, role.as_deref(), lifetime(*minutes)?)?
                }
                None => encoder.issue(&user_id, role.as_deref())?,
            };

            match cli.format {
                OutputFormat::Json => output::print_item(
                    &IssuedToken {
                        user_id,
                        token,
                        expires_at,
                    },
                    OutputFormat::Json,
                ),
                OutputFormat::Plain => {
                    output::print_kv("User", user_id.as_str());
                    output::print_kv("Expires", &expires_at.to_rfc3339());
                    println!("{token}");
                }
            }
        }
    }

    Ok(())
}

/// Parses `--ttl-minutes` into a token lifetime.
fn lifetime(minutes: i64) -> Result<Duration, AppError> {
    if minutes <= 0 {
        return Err(AppError::validation("--ttl-minutes must be positive"));
    }
    Duration::try_minutes(minutes)
        .ok_or_else(|| AppError::validation(format!("--ttl-minutes {minutes} is out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wolverine_core::error::ErrorKind;

    #[test]
    fn test_lifetime_accepts_positive_minutes() {
        assert_eq!(lifetime(90).unwrap(), Duration::minutes(90));
    }

    #[test]
    fn test_lifetime_rejects_non_positive() {
        assert_eq!(lifetime(0).unwrap_err().kind, ErrorKind::Validation);
        assert_eq!(lifetime(-5).unwrap_err().kind, ErrorKind::Validation);
    }

    #[test]
    fn test_lifetime_rejects_overflow() {
        let err = lifetime(i64::MAX).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(err.message.contains("out of range"));
    }
}
