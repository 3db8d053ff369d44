mod app;
mod client;
mod config;
mod logging;
mod poem;
mod session;
mod status;
mod suggestions;
mod theme;
mod ui;

use anyhow::{anyhow, Result};
use app::Poet;
use clap::Parser;
use client::PoetryClient;
use config::{Args, Config};
use rand::{rngs::StdRng, SeedableRng};
use status::ServerStatus;
use ui::{terminal::TerminalUI, UIInterface};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::from_args(&args)?;
    logging::init(config.log_file.as_deref(), !args.check)?;

    if args.check {
        return check_server(&config).await;
    }

    let ui = TerminalUI::new()?;
    let mut poet = Poet::new(&config, ui, StdRng::from_entropy())?;
    poet.run().await?;

    Ok(())
}

async fn check_server(config: &Config) -> Result<()> {
    let client = PoetryClient::new(config.server_url.clone())?;
    match client.health().await {
        Ok(health) => {
            println!("{}", ServerStatus::from(&health));
            println!("🌐 {}", config.server_url);
            if let Some(timestamp) = &health.timestamp {
                println!("🕒 {} ({})", health.status, timestamp);
            }
            if let Some(version) = &health.python_version {
                println!("🐍 Server runtime: {}", version.lines().next().unwrap_or(version));
            }
            if !health.is_configured() {
                println!("💡 The server has no provider API key configured.");
            }
            Ok(())
        }
        Err(e) => {
            println!("{}", ServerStatus::Unreachable);
            Err(anyhow!("poetry server at {} is unreachable: {}", config.server_url, e))
        }
    }
}
