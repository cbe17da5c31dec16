//! Application configuration and platform paths for flowatch.
//!
//! TOML app settings (figment-merged with `FLOWATCH_` environment
//! overrides), XDG-style directory resolution, and the dashboard file
//! load/save/list helpers. The core engine never reads files itself —
//! front-ends resolve everything here and hand values in.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use flowatch_core::{CoreError, Dashboard};

/// Canonical file name of the encrypted identity vault.
pub const IDENTITY_STORE_FILE: &str = "identities.enc";

/// Environment variable holding the vault master password.
pub const MASTER_KEY_ENV: &str = "FLOWATCH_MASTER_KEY";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Dashboard(#[from] CoreError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── App config ──────────────────────────────────────────────────────

fn default_theme() -> String {
    "solarized-dark".into()
}

fn default_interval_secs() -> u64 {
    10
}

fn default_max_history() -> usize {
    360
}

/// Application-level settings shared by all front-ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// UI theme name (consumed by the TUI front-end).
    #[serde(default = "default_theme")]
    pub theme: String,

    /// Identity applied when a dashboard names none.
    #[serde(default)]
    pub default_identity: String,

    /// Fallback poll cadence for newly created dashboards.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Fallback history depth for newly created dashboards.
    #[serde(default = "default_max_history")]
    pub max_history: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            default_identity: String::new(),
            interval_secs: default_interval_secs(),
            max_history: default_max_history(),
        }
    }
}

/// Load the app config from the canonical path plus environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("FLOWATCH_").ignore(&["MASTER_KEY"]));

    Ok(figment.extract()?)
}

/// Load config, falling back to defaults on any failure.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

/// Serialize the config and write it to the canonical path.
pub fn save_config(config: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, toml::to_string_pretty(config)?)?;
    Ok(())
}

// ── Paths ───────────────────────────────────────────────────────────

/// Platform config directory (`~/.config/flowatch` on Unix).
pub fn config_dir() -> PathBuf {
    ProjectDirs::from("com", "flowatch", "flowatch")
        .map_or_else(home_fallback, |dirs| dirs.config_dir().to_path_buf())
}

/// Platform data directory (`~/.local/share/flowatch` on Unix).
pub fn data_dir() -> PathBuf {
    ProjectDirs::from("com", "flowatch", "flowatch")
        .map_or_else(home_fallback, |dirs| dirs.data_dir().to_path_buf())
}

fn home_fallback() -> PathBuf {
    let mut path = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    path.push(".config");
    path.push("flowatch");
    path
}

/// The app config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Directory holding dashboard TOML files.
pub fn dashboards_dir() -> PathBuf {
    config_dir().join("dashboards")
}

/// The encrypted identity vault.
pub fn identity_store_path() -> PathBuf {
    config_dir().join(IDENTITY_STORE_FILE)
}

/// Create all required directories.
pub fn ensure_dirs() -> Result<(), ConfigError> {
    for dir in [config_dir(), data_dir(), dashboards_dir()] {
        std::fs::create_dir_all(&dir)?;
    }
    Ok(())
}

// ── Dashboard files ─────────────────────────────────────────────────

/// Read a dashboard TOML file, apply defaults, and validate it.
pub fn load_dashboard(path: &Path) -> Result<Dashboard, ConfigError> {
    let raw = std::fs::read_to_string(path)?;
    let mut dash: Dashboard = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    dash.normalize();
    dash.validate()?;
    Ok(dash)
}

/// Canonical path of a named dashboard.
pub fn dashboard_path(name: &str) -> PathBuf {
    dashboards_dir().join(format!("{name}.toml"))
}

/// Write a dashboard back to a TOML file. Groups round-trip fully.
pub fn save_dashboard(dash: &Dashboard, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string_pretty(dash)?)?;
    Ok(())
}

/// Base names (without `.toml`) of all dashboard files in `dir`.
pub fn list_dashboards(dir: &Path) -> Result<Vec<String>, ConfigError> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "toml") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}
