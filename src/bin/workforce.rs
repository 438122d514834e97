use clap::Parser;
use tracing_subscriber::EnvFilter;
use workforce_client::cli::{Cli, Reported};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so API_BASE_URL and friends are picked up
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let config = workforce_client::config::config();
    tracing::debug!("Using {} in {:?} mode", config.api.base_url, config.environment);

    let cli = Cli::parse();

    if let Err(e) = workforce_client::cli::run(cli).await {
        // Already written to stdout in the chosen format
        if e.is::<Reported>() {
            std::process::exit(1);
        }
        match std::env::var("CLI_VERBOSE").as_deref() {
            Ok("true") | Ok("1") => eprintln!("Error: {e:?}"),
            _ => eprintln!("Error: {e}"),
        }
        std::process::exit(1);
    }

    Ok(())
}
