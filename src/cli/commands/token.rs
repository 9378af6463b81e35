use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{issue_token, Claims};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Issue a session token for a user, signed with JWT_SECRET")]
    Issue {
        #[arg(long, help = "Auth user id the token speaks for")]
        user: Uuid,
        #[arg(long, help = "Lifetime in hours (defaults to the configured expiry)")]
        hours: Option<u64>,
    },
}

pub async fn handle(cmd: TokenCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TokenCommands::Issue { user, hours } => {
            let settings = &config::config().security;
            let hours = hours.unwrap_or(settings.jwt_expiry_hours);
            let token = issue_token(&Claims::new(user, hours)?, &settings.jwt_secret)?;

            match output_format {
                OutputFormat::Json => output_success(
                    &output_format,
                    "Token issued",
                    Some(json!({ "user_id": user, "expires_in_hours": hours, "token": token })),
                )?,
                // Bare token so it can be captured by shell substitution
                OutputFormat::Text => println!("{}", token),
            }
            Ok(())
        }
    }
}
