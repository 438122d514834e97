pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "workforce")]
#[command(about = "Workforce CLI - Command-line client for the workforce management API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Login, logout and session status")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Record operations on backend collections")]
    Data {
        #[command(subcommand)]
        cmd: commands::data::DataCommands,
    },

    #[command(about = "List selectable options for a lookup field")]
    Lookup(commands::lookup::LookupArgs),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let ctx = config::CliContext::from_env().await?;

    let result = match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(&ctx, cmd, &output_format).await,
        Commands::Data { cmd } => commands::data::handle(&ctx, cmd, &output_format).await,
        Commands::Lookup(args) => commands::lookup::handle(&ctx, args, &output_format).await,
    };

    result.map_err(|e| report_session_failure(&output_format, e))
}

/// An error whose message has already been written to the user
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct Reported {
    pub message: String,
    pub error_code: String,
}

/// Write the session-expired hint for a 401 and mark the error as reported.
/// Other errors are returned untouched for `main` to print.
pub fn report_session_failure(output_format: &OutputFormat, error: anyhow::Error) -> anyhow::Error {
    let code = error
        .downcast_ref::<crate::error::ClientError>()
        .filter(|client_err| client_err.is_unauthorized())
        .map(|client_err| client_err.error_code());
    let Some(code) = code else {
        return error;
    };

    let message = "Session expired or invalid; run `workforce auth login` again";
    if let Err(e) = utils::output_error(output_format, message, Some(code)) {
        return e;
    }
    anyhow::Error::new(Reported {
        message: message.to_string(),
        error_code: code.to_string(),
    })
}
