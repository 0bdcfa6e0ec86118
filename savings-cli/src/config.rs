//! CLI configuration: an optional TOML file plus flag overrides.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use savings_core::db::DbConfig;

/// Config file picked up from the working directory when `--config` is not
/// given.
const DEFAULT_CONFIG_PATH: &str = "savings.toml";

/// Database the CLI opens when nothing else is configured.
const DEFAULT_CONNECTION: &str = "savings.db";

/// Settings read from the TOML config file. Every key is optional:
///
/// ```toml
/// backend = "sqlite"
/// connection_string = "savings.db"
/// seeds_dir = "/usr/share/savings/seeds"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AppConfig {
    pub backend: Option<String>,
    pub connection_string: Option<String>,
    pub seeds_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Reads the config file.
    ///
    /// An explicit path must exist and parse. Without one, `savings.toml`
    /// is used when present, otherwise every setting falls back to its
    /// default.
    pub fn load(path: Option<&Path>) -> Result<AppConfig> {
        match path {
            Some(path) => Self::read_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_PATH);
                if default.is_file() {
                    Self::read_file(default)
                } else {
                    debug!("no config file found, using defaults");
                    Ok(AppConfig::default())
                }
            }
        }
    }

    fn read_file(path: &Path) -> Result<AppConfig> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        Self::parse(&raw)
            .with_context(|| format!("Failed to parse config file '{}'", path.display()))
    }

    fn parse(raw: &str) -> Result<AppConfig, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Resolves the database settings. Command-line values win over the
    /// config file; the built-in defaults (`sqlite`, `savings.db`) come
    /// last.
    pub fn db_config(
        &self,
        backend: Option<String>,
        db: Option<String>,
    ) -> DbConfig {
        DbConfig {
            backend: backend
                .or_else(|| self.backend.clone())
                .unwrap_or_else(|| "sqlite".to_string()),
            connection_string: db
                .or_else(|| self.connection_string.clone())
                .unwrap_or_else(|| DEFAULT_CONNECTION.to_string()),
        }
    }
}
