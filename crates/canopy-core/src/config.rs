//! Build configuration. Loaded once by the CLI and treated as immutable for
//! the duration of a build.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Max concurrent generator tasks when using a local/offline `TextGenerator`.
    pub parallel_limit_local: usize,
    /// Max concurrent generator tasks when using a remote/cloud `TextGenerator`.
    pub parallel_limit_cloud: usize,
    /// Files larger than this are skipped during parsing and documented
    /// with a minimal stub page instead.
    pub max_file_size_kb: u64,
    /// Directory the live wiki is written to, relative to the repo root.
    pub wiki_dir: String,
    /// Shadow directory used during a build, relative to the repo root.
    pub staging_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            parallel_limit_local: 4,
            parallel_limit_cloud: 16,
            max_file_size_kb: 512,
            wiki_dir: ".canopy-wiki".to_string(),
            staging_dir: ".canopy-wiki-building".to_string(),
        }
    }
}

impl Config {
    /// Load from a TOML file if it exists, otherwise return defaults.
    /// Environment overrides (`CANOPY_*`) are applied on top.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            toml::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            Config::default()
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(value) = std::env::var("CANOPY_PARALLEL_LIMIT_LOCAL") {
            self.parallel_limit_local = parse_usize("CANOPY_PARALLEL_LIMIT_LOCAL", &value)?;
        }
        if let Ok(value) = std::env::var("CANOPY_PARALLEL_LIMIT_CLOUD") {
            self.parallel_limit_cloud = parse_usize("CANOPY_PARALLEL_LIMIT_CLOUD", &value)?;
        }
        if let Ok(value) = std::env::var("CANOPY_MAX_FILE_SIZE_KB") {
            self.max_file_size_kb = value.parse().map_err(|_| ConfigError::InvalidValue {
                key: "CANOPY_MAX_FILE_SIZE_KB".to_string(),
                reason: format!("'{value}' is not a valid integer"),
            })?;
        }
        if let Ok(value) = std::env::var("CANOPY_WIKI_DIR") {
            self.wiki_dir = value;
        }
        Ok(())
    }
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        reason: format!("'{value}' is not a valid integer"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert!(config.parallel_limit_local > 0);
        assert!(config.parallel_limit_cloud >= config.parallel_limit_local);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = Config::load(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.wiki_dir, Config::default().wiki_dir);
    }
}
