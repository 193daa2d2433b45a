//! Config file and environment handling

use crate::error::{CliError, CliResult};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_URL: &str = "https://api.massdriver.cloud";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_CONFIG: &str = "MASSDRIVER_CONFIG";
pub const ENV_URL: &str = "MASSDRIVER_URL";
pub const ENV_API_KEY: &str = "MASSDRIVER_API_KEY";
pub const ENV_TIMEOUT: &str = "MASSDRIVER_TIMEOUT";

/// Effective configuration for a CLI invocation
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the Massdriver API, also used for registry refs
    pub url: String,
    pub api_key: Option<String>,
    /// Time budget for each remote fetch
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Contents of `config.yaml`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ConfigFile {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Location of the config file: `$MASSDRIVER_CONFIG`, else
/// `<config dir>/massdriver/config.yaml`.
pub fn config_file_path() -> Option<PathBuf> {
    std::env::var_os(ENV_CONFIG)
        .filter(|path| !path.is_empty())
        .map(PathBuf::from)
        .or_else(|| dirs::config_dir().map(|dir| dir.join("massdriver").join("config.yaml")))
}

/// Read the config file. A missing file is not an error.
pub fn read_config_file(config_path: &Path) -> CliResult<Option<ConfigFile>> {
    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(CliError::Config(format!(
                "Failed to read {}: {e}",
                config_path.display()
            )))
        }
    };

    serde_yaml::from_str(&content)
        .map(Some)
        .map_err(|e| CliError::Config(format!("Failed to parse {}: {e}", config_path.display())))
}

/// Load configuration from the config file and the environment.
pub fn load_config() -> CliResult<Config> {
    let file = match config_file_path() {
        Some(path) => {
            tracing::debug!(path = %path.display(), "reading config file");
            read_config_file(&path)?
        }
        None => None,
    };
    resolve_config(file.unwrap_or_default(), |key| std::env::var(key).ok())
}

/// Layer environment variables over file settings over defaults.
/// Empty environment values are ignored.
pub fn resolve_config<F>(file: ConfigFile, env: F) -> CliResult<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let env = |key: &str| env(key).filter(|value| !value.trim().is_empty());

    let url = env(ENV_URL)
        .or(file.url)
        .unwrap_or_else(|| DEFAULT_URL.to_string())
        .trim_end_matches('/')
        .to_string();

    let timeout_secs = match env(ENV_TIMEOUT) {
        Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
            CliError::Config(format!(
                "{ENV_TIMEOUT} must be a whole number of seconds, got '{raw}'"
            ))
        })?,
        None => file.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
    };

    Ok(Config {
        url,
        api_key: env(ENV_API_KEY).or(file.api_key),
        timeout: Duration::from_secs(timeout_secs),
    })
}
