//! Engine configuration: built-in defaults, an optional TOML file, then CLI
//! overrides applied by `main`.
//!
//! ```toml
//! [lyrics]
//! cache_location = "~/.cache/lyricsync"
//! acceptable_duration_difference = 2
//! timeout_secs = 3
//! api_base = "https://lrclib.net"
//! ```

use directories::{BaseDirs, ProjectDirs};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_BASE: &str = "https://lrclib.net";
pub const DEFAULT_TOLERANCE_SECS: f64 = 2.0;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Settings injected into the cache store, fetch client and resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub cache_root: PathBuf,
    /// Max |candidate duration - track duration| in seconds.
    pub duration_tolerance: f64,
    pub timeout: Duration,
    pub api_base: String,
    pub user_agent: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_root: default_cache_root(),
            duration_tolerance: DEFAULT_TOLERANCE_SECS,
            timeout: DEFAULT_TIMEOUT,
            api_base: DEFAULT_API_BASE.to_string(),
            user_agent: format!(
                "lyricsync/{} (+https://github.com/lyricsync/lyricsync)",
                env!("CARGO_PKG_VERSION")
            ),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "lyricsync", "lyricsync")
}

fn default_cache_root() -> PathBuf {
    project_dirs()
        .map(|p| p.cache_dir().to_path_buf())
        .unwrap_or_else(|| std::env::temp_dir().join("lyricsync"))
}

/// `config.toml` in the platform config directory.
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|p| p.config_dir().join("config.toml"))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    lyrics: LyricsSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LyricsSection {
    cache_location: Option<String>,
    acceptable_duration_difference: Option<f64>,
    timeout_secs: Option<f64>,
    api_base: Option<String>,
}

impl EngineConfig {
    /// Defaults overlaid with the contents of a TOML document.
    pub fn from_toml_str(s: &str, path: &Path) -> Result<Self, ConfigError> {
        let file: FileConfig = toml::from_str(s).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let mut cfg = Self::default();
        let lyrics = file.lyrics;
        if let Some(loc) = lyrics.cache_location {
            cfg.cache_root = expand_home(&loc);
        }
        if let Some(tol) = lyrics.acceptable_duration_difference {
            cfg.duration_tolerance = tol;
        }
        if let Some(secs) = lyrics.timeout_secs
            && secs.is_finite()
            && secs > 0.0
        {
            cfg.timeout = Duration::from_secs_f64(secs);
        }
        if let Some(base) = lyrics.api_base {
            cfg.api_base = base;
        }
        Ok(cfg)
    }

    /// Load from an explicit path (must exist), or from the default location
    /// if a file is there, or fall back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) if p.is_file() => p,
                _ => return Ok(Self::default()),
            },
        };
        let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "Loaded config file");
        Self::from_toml_str(&contents, &path)
    }
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_home(p: &str) -> PathBuf {
    if let Some(rest) = p.strip_prefix("~/")
        && let Some(dirs) = BaseDirs::new()
    {
        return dirs.home_dir().join(rest);
    }
    PathBuf::from(p)
}
