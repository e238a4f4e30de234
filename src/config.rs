//! Configuration loading
//!
//! Reads `~/.config/flashgen/config.toml`. Every field has a default, so a
//! missing file is not an error; a malformed one falls back to defaults and
//! reports a warning for the caller to display.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

mod types;

pub use types::{ApiConfig, Config, GenerationConfig};

const CONFIG_DIR: &str = "flashgen";
const CONFIG_FILE: &str = "config.toml";

/// Result of loading configuration
#[derive(Debug, Clone)]
pub struct ConfigResult {
    pub config: Config,
    /// Set when the file existed but could not be used
    pub warning: Option<String>,
}

/// Default config location: `~/.config/flashgen/config.toml`
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|p| p.join(".config").join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Load configuration from the default location, then apply env overrides
pub fn load_config() -> ConfigResult {
    let mut result = match config_path() {
        Some(path) => load_config_from_path(&path),
        None => ConfigResult {
            config: Config::default(),
            warning: None,
        },
    };
    result.config.apply_env_overrides(|name| std::env::var(name).ok());
    result
}

/// Load configuration from an explicit path
///
/// Env overrides are not applied here.
pub fn load_config_from_path(path: &Path) -> ConfigResult {
    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return ConfigResult {
                config: Config::default(),
                warning: None,
            };
        }
        Err(e) => {
            return ConfigResult {
                config: Config::default(),
                warning: Some(format!(
                    "Failed to read config file {}: {}",
                    path.display(),
                    e
                )),
            };
        }
    };

    match toml::from_str::<Config>(&contents) {
        Ok(config) => ConfigResult {
            config,
            warning: None,
        },
        Err(e) => ConfigResult {
            config: Config::default(),
            warning: Some(format!(
                "Invalid config file {}, using defaults: {}",
                path.display(),
                e.message()
            )),
        },
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
