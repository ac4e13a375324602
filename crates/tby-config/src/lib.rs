//! Configuration for `tby`.
//!
//! Resolves where `tby.yml` lives, reads it, layers decoder settings
//! (defaults → YAML document → `TBY_*` environment) with figment, and hands
//! the `tunnels` list to `tby_core` for decoding.

use std::path::{Path, PathBuf};

use directories::BaseDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use tby_core::{CoreError, Document, RecordPolicy, Tunnels};

/// File name of the configuration document.
pub const CONFIG_FILE: &str = "tby.yml";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("can't find a user config or home directory")]
    NoConfigDir,

    #[error("can't load config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("config settings are invalid: {0}")]
    Settings(Box<figment::Error>),

    #[error("can't parse config file: {0}")]
    Decode(#[from] CoreError),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Settings(Box::new(err))
    }
}

// ── Settings ────────────────────────────────────────────────────────

/// Top-level keys of `tby.yml` other than `tunnels`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    /// Whether records with an unknown `type` fail the load or are skipped.
    #[serde(default)]
    pub invalid_records: RecordPolicy,
}

/// A fully loaded configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub path: PathBuf,
    pub settings: Settings,
    pub tunnels: Tunnels,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path.
///
/// `<user config dir>/tby/tby.yml`, falling back to `$HOME/.tby/tby.yml`
/// when the platform lookup yields no config dir.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let user_config = BaseDirs::new().map(|dirs| dirs.config_dir().to_path_buf());
    let home = std::env::var_os("HOME").map(PathBuf::from);
    config_dir(user_config, home).map(|dir| dir.join(CONFIG_FILE))
}

fn config_dir(user_config: Option<PathBuf>, home: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    if let Some(dir) = user_config {
        return Ok(dir.join("tby"));
    }
    home.filter(|home| !home.as_os_str().is_empty())
        .map(|home| home.join(".tby"))
        .ok_or(ConfigError::NoConfigDir)
}

// ── Config loading ──────────────────────────────────────────────────

/// Read and decode the config file at `path`. A missing file is an error.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let (settings, tunnels) = load_str(&text)?;
    debug!(path = %path.display(), tunnels = tunnels.len(), "loaded config");

    Ok(Config {
        path: path.to_path_buf(),
        settings,
        tunnels,
    })
}

/// Decode a config document held in memory.
pub fn load_str(text: &str) -> Result<(Settings, Tunnels), ConfigError> {
    let document = Document::parse(text)?;
    let settings = load_settings(text, document.is_blank())?;
    let tunnels = document.decode(settings.invalid_records)?;
    Ok((settings, tunnels))
}

fn load_settings(text: &str, blank: bool) -> Result<Settings, ConfigError> {
    let mut figment = Figment::new().merge(Serialized::defaults(Settings::default()));
    if !blank {
        figment = figment.merge(Yaml::string(text));
    }
    let settings = figment.merge(Env::prefixed("TBY_")).extract()?;
    Ok(settings)
}
