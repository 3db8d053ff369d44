use crate::theme::Theme;
use anyhow::{anyhow, Result};
use clap::Parser;
use std::path::PathBuf;
use url::Url;

const DEFAULT_SERVER_URL: &str = "http://localhost:5000";

#[derive(Parser, Debug)]
#[command(name = "quill")]
#[command(about = "A terminal poetry generator backed by an AI poetry server")]
pub struct Args {
    #[arg(
        long,
        env = "QUILL_SERVER_URL",
        default_value = DEFAULT_SERVER_URL,
        help = "Base URL of the poetry server"
    )]
    pub server: String,

    #[arg(
        long,
        value_enum,
        env = "QUILL_THEME",
        default_value_t = Theme::Romantic,
        help = "Theme to start writing in"
    )]
    pub theme: Theme,

    #[arg(
        long,
        env = "QUILL_SAVE_DIR",
        default_value = ".",
        help = "Directory saved poems are downloaded into"
    )]
    pub save_dir: PathBuf,

    #[arg(long, env = "QUILL_LOG_FILE", help = "Write logs to this file")]
    pub log_file: Option<PathBuf>,

    #[arg(long, help = "Check the server connection and exit")]
    pub check: bool,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_url: Url,
    pub theme: Theme,
    pub save_dir: PathBuf,
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn from_args(args: &Args) -> Result<Self> {
        Ok(Self {
            server_url: normalize_server_url(&args.server)?,
            theme: args.theme,
            save_dir: args.save_dir.clone(),
            log_file: args.log_file.clone(),
        })
    }
}

/// Accepts bare `host:port` and defaults to plain http, which is how the
/// poetry server is usually run locally.
fn normalize_server_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    let with_protocol = if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("http://{}", raw)
    };

    let url = Url::parse(&with_protocol)
        .map_err(|e| anyhow!("Invalid server URL '{}': {}", raw, e))?;
    if url.host_str().map_or(true, str::is_empty) || url.cannot_be_a_base() {
        return Err(anyhow!("Invalid server URL '{}': missing host", raw));
    }
    Ok(url)
}
