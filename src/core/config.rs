/*
 * Loads the settings needed to talk to the movie metadata API: the API key, the service base
 * URL and the response language. Settings come from an optional `api_config.json` in the
 * application's config directory; the `TMDB_API_KEY` environment variable overrides the key
 * stored there.
 *
 * As elsewhere in core, access goes through a trait (`ConfigManagerOperations`) so the
 * application logic can be tested without touching the user's real configuration.
 */
use crate::core::path_utils;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

pub const API_CONFIG_FILENAME: &str = "api_config.json";
pub const API_KEY_ENV_VAR: &str = "TMDB_API_KEY";
pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_LANGUAGE: &str = "en-US";

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Serde(serde_json::Error),
    NoProjectDirectory,
    MissingApiKey,
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Serde(err)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Configuration I/O error: {e}"),
            ConfigError::Serde(e) => write!(f, "Configuration file is malformed: {e}"),
            ConfigError::NoProjectDirectory => {
                write!(f, "Could not determine the configuration directory")
            }
            ConfigError::MissingApiKey => write!(
                f,
                "No API key configured. Set {API_KEY_ENV_VAR} or add api_key to {API_CONFIG_FILENAME}"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Serde(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub api_key: String,
    pub base_url: String,
    pub language: String,
}

// On-disk form; every field optional so a file holding only the key is enough.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfigFile {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

/*
 * Combines the file settings with the environment key. A non-blank environment key wins;
 * a blank key from either source counts as absent.
 */
pub fn resolve_api_config(file: ApiConfigFile, env_api_key: Option<String>) -> Result<ApiConfig> {
    let non_blank = |s: Option<String>| s.filter(|v| !v.trim().is_empty());
    let api_key = non_blank(env_api_key)
        .or_else(|| non_blank(file.api_key))
        .ok_or(ConfigError::MissingApiKey)?;
    Ok(ApiConfig {
        api_key: api_key.trim().to_string(),
        base_url: non_blank(file.base_url)
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        language: non_blank(file.language).unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
    })
}

pub trait ConfigManagerOperations: Send + Sync {
    fn load_api_config(&self, app_name: &str) -> Result<ApiConfig>;
}

pub struct CoreConfigManager {
    config_dir_override: Option<PathBuf>,
}

impl CoreConfigManager {
    pub fn new() -> Self {
        CoreConfigManager {
            config_dir_override: None,
        }
    }

    /// Reads `api_config.json` from `dir` instead of the user's config directory.
    #[cfg(test)]
    pub fn with_config_dir(dir: &std::path::Path) -> Self {
        CoreConfigManager {
            config_dir_override: Some(dir.to_path_buf()),
        }
    }

    fn config_dir(&self, app_name: &str) -> Option<PathBuf> {
        match &self.config_dir_override {
            Some(dir) => Some(dir.clone()),
            None => path_utils::get_base_app_config_local_dir(app_name),
        }
    }

    fn read_config_file(&self, app_name: &str) -> Result<ApiConfigFile> {
        let config_dir = self
            .config_dir(app_name)
            .ok_or(ConfigError::NoProjectDirectory)?;
        let file_path = config_dir.join(API_CONFIG_FILENAME);
        if !file_path.exists() {
            log::debug!("CoreConfigManager: No API config file at {file_path:?}.");
            return Ok(ApiConfigFile::default());
        }
        let reader = BufReader::new(File::open(&file_path)?);
        let file_config: ApiConfigFile = serde_json::from_reader(reader)?;
        log::debug!("CoreConfigManager: Loaded API config file {file_path:?}.");
        Ok(file_config)
    }
}

impl Default for CoreConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManagerOperations for CoreConfigManager {
    fn load_api_config(&self, app_name: &str) -> Result<ApiConfig> {
        log::trace!("CoreConfigManager: Loading API config for app '{app_name}'");
        let file_config = match self.read_config_file(app_name) {
            Ok(file_config) => file_config,
            // Without a config dir the environment may still carry the key.
            Err(ConfigError::NoProjectDirectory) => {
                log::warn!("CoreConfigManager: No config directory; using environment only.");
                ApiConfigFile::default()
            }
            Err(e) => return Err(e),
        };
        resolve_api_config(file_config, std::env::var(API_KEY_ENV_VAR).ok())
    }
}
