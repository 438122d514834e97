use clap::Subcommand;
use serde_json::json;

use crate::auth::{AuthApi, Credentials};
use crate::cli::config::CliContext;
use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login to the backend and store the session")]
    Login {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, env = "WORKFORCE_PASSWORD", help = "Password (falls back to WORKFORCE_PASSWORD)")]
        password: String,
    },

    #[command(about = "Logout and erase the stored session")]
    Logout,

    #[command(about = "Show current session information")]
    Status,
}

pub async fn handle(ctx: &CliContext, cmd: AuthCommands, output_format: &OutputFormat) -> anyhow::Result<()> {
    let auth = AuthApi::new(&ctx.client);

    match cmd {
        AuthCommands::Login { username, password } => {
            let session = auth.login(&Credentials { username, password }).await?;
            output_success(
                output_format,
                &format!("Logged in as user {} ({})", session.user_id, session.role),
                Some(json!({
                    "user_id": session.user_id,
                    "role": session.role,
                    "role_id": session.role_id,
                })),
            )
        }
        AuthCommands::Logout => {
            if auth.logout().await? {
                output_success(output_format, "Logged out", None)
            } else {
                output_success(output_format, "No active session", None)
            }
        }
        AuthCommands::Status => match auth.whoami().await {
            Some(session) => output_success(
                output_format,
                &format!("Authenticated as user {} ({})", session.user_id, session.role),
                Some(json!({
                    "user_id": session.user_id,
                    "role": session.role,
                    "role_id": session.role_id,
                    "since": session.created_at,
                    "server": ctx.client.base_url(),
                })),
            ),
            None => output_error(output_format, "Not logged in", Some("NO_SESSION")),
        },
    }
}
