mod config;
mod lyrics;
mod mpris;
mod pipe;
mod state;

use crate::config::EngineConfig;
use crate::lyrics::{LrclibClient, LyricsResolver};
use crate::mpris::MprisSource;
use crate::pipe::LyricSync;
use clap::Parser;
use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Application configuration from CLI
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Print the current line of synced lyrics for the playing track")]
pub struct Config {
    /// TOML config file (default: config.toml in the platform config dir, if present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory holding cached lyrics
    #[arg(long)]
    cache_dir: Option<PathBuf>,
    /// Max difference in seconds between track and lyrics durations
    #[arg(long)]
    tolerance: Option<f64>,
    /// Lyrics request timeout in seconds
    #[arg(long)]
    timeout: Option<f64>,
    /// Base URL of the lrclib-compatible lyrics API
    #[arg(long)]
    api_base: Option<String>,
    /// Poll interval in milliseconds
    #[arg(long, default_value_t = 500)]
    poll_ms: u64,
    /// Blocklist for MPRIS player service names (comma-separated, case-insensitive)
    #[arg(
        long = "block",
        value_name = "SERVICE1,SERVICE2",
        value_delimiter = ','
    )]
    block: Vec<String>,
    /// Enable debug logging to stderr
    #[arg(long)]
    pub debug_log: bool,
}

impl Config {
    /// Apply CLI overrides on top of file/default settings.
    fn apply(&self, mut engine: EngineConfig) -> EngineConfig {
        if let Some(dir) = &self.cache_dir {
            engine.cache_root = dir.clone();
        }
        if let Some(tol) = self.tolerance {
            engine.duration_tolerance = tol;
        }
        if let Some(secs) = self.timeout
            && secs.is_finite()
            && secs > 0.0
        {
            engine.timeout = Duration::from_secs_f64(secs);
        }
        if let Some(base) = &self.api_base {
            engine.api_base = base.clone();
        }
        engine
    }
}

fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cfg = Config::parse();
    init_logging(cfg.debug_log);

    let engine = cfg.apply(EngineConfig::load(cfg.config.as_deref())?);
    tracing::debug!(?engine, "Engine configuration");

    let client = LrclibClient::new(&engine)?;
    let resolver = LyricsResolver::new(&engine, client);
    let source = MprisSource::new(cfg.block.clone());
    let mut sync = LyricSync::new(source, resolver);

    let poll_interval = Duration::from_millis(cfg.poll_ms.max(50));
    if let Err(e) = sync.run(poll_interval, &mut std::io::stdout()).await {
        eprintln!("Error: {}", e);
        return Err(e.into());
    }
    Ok(())
}
