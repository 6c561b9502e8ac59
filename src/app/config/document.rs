use super::serde_helpers::{load_env_string, load_env_var};
use super::{ConfigError, RunSettings};
use crate::domain::SongRecord;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// On-disk settings: run options plus the songs to request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsDocument {
    pub run: RunSettings,
    pub songs: Vec<SongRecord>,
}

impl SettingsDocument {
    /// Load from `path`. `.toml` files are parsed as TOML, everything else
    /// as JSON.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileError {
            path: path.to_path_buf(),
            source,
        })?;

        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        if is_toml {
            Self::from_toml_str(&content)
        } else {
            Self::from_json_str(&content)
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Environment overrides applied on top of the loaded file.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        let run = &mut self.run;
        load_env_var("ROTATOR_RETRIES", &mut run.retries)?;
        load_env_var("ROTATOR_TIMEOUT_SEC", &mut run.timeout_sec)?;
        load_env_var("ROTATOR_PROXY_LIMIT", &mut run.proxy.limit)?;
        load_env_var("ROTATOR_SOCKS_PORT", &mut run.tor.socks_port)?;
        load_env_string("ROTATOR_CATALOG_BASE_URL", &mut run.catalog.base_url);
        Ok(())
    }
}
