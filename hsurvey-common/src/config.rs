//! Configuration loading and data directory resolution
//!
//! Every setting resolves in the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Connection string selecting the primary store
pub const DATABASE_URL_ENV: &str = "HSURVEY_DATABASE_URL";

/// Directory holding the fallback file and exports
pub const DATA_DIR_ENV: &str = "HSURVEY_DATA_DIR";

/// Name of the append-only fallback file inside the data directory
pub const FALLBACK_FILE_NAME: &str = "user_data.csv";

pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;

/// Optional settings read from `<config dir>/hsurvey/config.toml`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub data_dir: Option<PathBuf>,
    pub database_url: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// Load the platform config file.
    ///
    /// A missing or malformed file is never fatal: it logs and yields defaults.
    pub fn load() -> Self {
        let Some(path) = default_config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => {
                info!("Loaded config file: {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring config file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse a specific TOML file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Invalid TOML in {}: {}", path.display(), e)))
    }
}

/// Values supplied on the command line. `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub data_dir: Option<PathBuf>,
    pub database_url: Option<String>,
    pub bind: Option<String>,
    pub port: Option<u16>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind: String,
    pub port: u16,
    pub data_dir: PathBuf,
    /// `None` runs the process in fallback-only mode
    pub database_url: Option<String>,
}

impl ServiceConfig {
    pub fn resolve(overrides: ConfigOverrides, toml_config: &TomlConfig) -> Self {
        let data_dir = resolve_data_dir(overrides.data_dir.as_deref(), toml_config);
        let database_url = resolve_database_url(overrides.database_url.as_deref(), toml_config);

        Self {
            bind: overrides.bind.unwrap_or_else(|| DEFAULT_BIND.to_string()),
            port: overrides.port.or(toml_config.port).unwrap_or(DEFAULT_PORT),
            data_dir,
            database_url,
        }
    }

    /// Path of the append-only fallback file
    pub fn fallback_file(&self) -> PathBuf {
        self.data_dir.join(FALLBACK_FILE_NAME)
    }

    /// Create the data directory if missing
    pub fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)?;
            info!("Created data directory: {}", self.data_dir.display());
        }
        Ok(())
    }
}

/// Resolve the data directory (CLI → ENV → TOML → platform default)
pub fn resolve_data_dir(cli_arg: Option<&Path>, toml_config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Some(path) = non_empty_env(DATA_DIR_ENV) {
        return PathBuf::from(path);
    }

    if let Some(path) = &toml_config.data_dir {
        return path.clone();
    }

    default_data_dir()
}

/// Resolve the primary store connection string (CLI → ENV → TOML).
///
/// There is no compiled default: absence selects fallback mode.
pub fn resolve_database_url(cli_arg: Option<&str>, toml_config: &TomlConfig) -> Option<String> {
    cli_arg
        .map(str::to_string)
        .or_else(|| non_empty_env(DATABASE_URL_ENV))
        .or_else(|| toml_config.database_url.clone())
        .filter(|url| !url.trim().is_empty())
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("hsurvey").join("config.toml"))
}

/// OS-dependent default data directory
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("hsurvey"))
        .unwrap_or_else(|| PathBuf::from("./hsurvey_data"))
}
