//! Cli settings

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, File};
use nftbridge::BridgeConfig;
use serde::{Deserialize, Serialize};

/// Environment variable prefix for overrides, `NFTBRIDGE__INFO__DB_PATH=...`
pub const ENV_PREFIX: &str = "NFTBRIDGE";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Info {
    /// Transaction log location, defaults to `<work dir>/nftbridge.redb`
    pub db_path: Option<PathBuf>,
    /// Log filter used when `RUST_LOG` is unset
    pub log_filter: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub info: Info,
    #[serde(default)]
    pub bridge: BridgeConfig,
}

impl Settings {
    /// Load settings from `config_file_name`
    ///
    /// A missing file yields the defaults. Environment variables prefixed with
    /// [`ENV_PREFIX`] override file values.
    pub fn new(config_file_name: &Path) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::from(config_file_name).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;

        Ok(settings)
    }

    /// Transaction log location
    pub fn db_path(&self, work_dir: &Path) -> PathBuf {
        self.info
            .db_path
            .clone()
            .unwrap_or_else(|| work_dir.join("nftbridge.redb"))
    }
}
