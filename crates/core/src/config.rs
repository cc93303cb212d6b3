//! Application configuration.
//!
//! Values are layered: built-in defaults, then `config.toml` under the
//! user's config directory, then `GAMELIB_*` environment variables.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::library::{StorePaths, GAMES_STORE, PLAYERS_STORE, STATS_STORE};

/// Directory name used under the platform config and data directories.
pub const APP_DIR: &str = "gamelib";
/// Name of the configuration file inside [`APP_DIR`].
pub const CONFIG_FILE: &str = "config.toml";
/// Default file name of the audit trail.
pub const AUDIT_LOG: &str = "logs.txt";

const ENV_PREFIX: &str = "GAMELIB";

const DEFAULT_CONFIG: &str = r#"# gamelib configuration.
# Every key may also be set through a GAMELIB_<KEY> environment variable.

# Directory holding the stores and the audit log.
# data_dir = "/var/lib/gamelib"

players_store = "players.json"
games_store = "games.json"
stats_store = "stats.json"
audit_log = "logs.txt"
"#;

/// Resolved application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding the stores and the audit log.
    pub data_dir: PathBuf,
    /// Player store file name, relative to `data_dir`.
    pub players_store: String,
    /// Game store file name, relative to `data_dir`.
    pub games_store: String,
    /// Stats store file name, relative to `data_dir`.
    pub stats_store: String,
    /// Audit log file name, relative to `data_dir`.
    pub audit_log: String,
}

impl AppConfig {
    /// Load from the default config file location.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load using `path` as the config file. A missing file is not an error.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings = Config::builder()
            .set_default(
                "data_dir",
                default_data_dir().to_string_lossy().into_owned(),
            )?
            .set_default("players_store", PLAYERS_STORE)?
            .set_default("games_store", GAMES_STORE)?
            .set_default("stats_store", STATS_STORE)?
            .set_default("audit_log", AUDIT_LOG)?
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()
            .with_context(|| format!("failed to load configuration from {}", path.display()))?;

        settings
            .try_deserialize()
            .with_context(|| format!("invalid configuration in {}", path.display()))
    }

    /// Store locations under `data_dir`.
    pub fn store_paths(&self) -> StorePaths {
        StorePaths {
            players: self.data_dir.join(&self.players_store),
            games: self.data_dir.join(&self.games_store),
            stats: self.data_dir.join(&self.stats_store),
        }
    }

    /// Audit log location under `data_dir`.
    pub fn audit_log_path(&self) -> PathBuf {
        self.data_dir.join(&self.audit_log)
    }
}

/// Default config file location under the user's config directory.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(CONFIG_FILE)
}

/// Default data directory under the user's data directory.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Write a commented default config file if none exists yet.
pub fn ensure_default_config() -> Result<PathBuf> {
    let path = config_path();
    write_default_config(&path)?;
    Ok(path)
}

fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write default config {}", path.display()))
}
