use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CONFIG_DIR_NAME: &str = "vocab";
const CONFIG_FILE_NAME: &str = "config.toml";
const CURRENT_SCHEMA_VERSION: u32 = 1;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
const MIN_POLL_INTERVAL_MS: u64 = 100;

/// Result returned by [`load_config`], capturing the source and any non-fatal issues.
#[derive(Debug, Clone)]
pub struct ConfigLoadResult {
    pub config: FileConfig,
    pub warnings: Vec<String>,
    pub source: ConfigSource,
}

/// Indicates where the configuration was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// No persisted configuration was found or usable; defaults were synthesized.
    Default,
    /// Configuration was read from `config.toml`.
    File,
}

/// Errors that can occur when persisting configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML serialization error: {0}")]
    Ser(#[from] toml::ser::Error),
}

/// Disk-backed configuration schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default = "FileConfig::schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub bridge: BridgeConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            bridge: BridgeConfig::default(),
            analysis: AnalysisConfig::default(),
        }
    }
}

impl FileConfig {
    const fn schema_version() -> u32 {
        CURRENT_SCHEMA_VERSION
    }
}

/// How to reach the host backend when no environment marker names one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "BridgeConfig::default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl BridgeConfig {
    const fn default_request_timeout_secs() -> u64 {
        DEFAULT_REQUEST_TIMEOUT_SECS
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "AnalysisConfig::default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl AnalysisConfig {
    const fn default_poll_interval_ms() -> u64 {
        DEFAULT_POLL_INTERVAL_MS
    }

    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.poll_interval_ms)
    }
}

pub fn config_directory() -> PathBuf {
    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

pub fn config_path() -> PathBuf {
    config_directory().join(CONFIG_FILE_NAME)
}

pub fn load_config() -> ConfigLoadResult {
    load_config_from(&config_path())
}

/// Load configuration from an explicit path, falling back to defaults with warnings.
pub fn load_config_from(path: &Path) -> ConfigLoadResult {
    let mut warnings = Vec::new();

    if path.exists() {
        match fs::read_to_string(path) {
            Ok(raw) => match toml::from_str::<FileConfig>(&raw) {
                Ok(cfg) => {
                    let (cfg, mut sanitize_warnings) = sanitize_config(cfg);
                    warnings.append(&mut sanitize_warnings);
                    return ConfigLoadResult {
                        config: cfg,
                        warnings,
                        source: ConfigSource::File,
                    };
                }
                Err(err) => {
                    warnings.push(format!(
                        "Failed to parse {} as TOML: {}. Falling back to defaults.",
                        CONFIG_FILE_NAME, err
                    ));
                }
            },
            Err(err) => {
                warnings.push(format!(
                    "Failed to read {}: {}. Falling back to defaults.",
                    CONFIG_FILE_NAME, err
                ));
            }
        }
    }

    ConfigLoadResult {
        config: FileConfig::default(),
        warnings,
        source: ConfigSource::Default,
    }
}

pub fn save_config(config: &FileConfig) -> Result<(), ConfigError> {
    save_config_to(&config_path(), config)
}

pub fn save_config_to(path: &Path, config: &FileConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let serialized = toml::to_string_pretty(config)?;
    fs::write(path, serialized)?;
    Ok(())
}

fn sanitize_config(mut config: FileConfig) -> (FileConfig, Vec<String>) {
    let mut warnings = Vec::new();

    if config.schema_version != CURRENT_SCHEMA_VERSION {
        warnings.push(format!(
            "Unknown config schema version {}. Resetting to {}.",
            config.schema_version, CURRENT_SCHEMA_VERSION
        ));
        return (FileConfig::default(), warnings);
    }

    if let Some(endpoint) = config.bridge.endpoint.take() {
        let trimmed = endpoint.trim();
        if trimmed.is_empty() {
            warnings.push("Bridge endpoint is empty. Ignoring it.".to_string());
        } else if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            warnings.push(format!(
                "Bridge endpoint '{}' is not an http(s) URL. Ignoring it.",
                trimmed
            ));
        } else {
            config.bridge.endpoint = Some(trimmed.to_string());
        }
    }

    if config.bridge.request_timeout_secs == 0 {
        warnings.push(format!(
            "request_timeout_secs must be positive. Resetting to {}.",
            DEFAULT_REQUEST_TIMEOUT_SECS
        ));
        config.bridge.request_timeout_secs = DEFAULT_REQUEST_TIMEOUT_SECS;
    }

    if config.analysis.poll_interval_ms < MIN_POLL_INTERVAL_MS {
        warnings.push(format!(
            "poll_interval_ms {} is below the {}ms minimum. Resetting to {}.",
            config.analysis.poll_interval_ms, MIN_POLL_INTERVAL_MS, DEFAULT_POLL_INTERVAL_MS
        ));
        config.analysis.poll_interval_ms = DEFAULT_POLL_INTERVAL_MS;
    }

    (config, warnings)
}
