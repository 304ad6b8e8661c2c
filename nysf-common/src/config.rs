//! Configuration loading and resolution
//!
//! Every key resolves in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Tiers 1 and 2 arrive together as [`ConfigOverrides`]; the binary's argument
//! parser is responsible for the CLI-over-ENV ordering between them.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "NYSF_CONFIG";

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 5780;

/// Bootstrap configuration file contents
///
/// Every field is optional so a partial file only overrides what it names.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TomlConfig {
    #[serde(default)]
    pub bind_address: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub database_path: Option<PathBuf>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub analysis: AnalysisToml,
}

/// `[logging]` table
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default)]
    pub level: Option<String>,
}

/// `[analysis]` table for the local LLM service
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnalysisToml {
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub model: Option<String>,

    #[serde(default)]
    pub probe_timeout_secs: Option<u64>,

    #[serde(default)]
    pub generate_timeout_secs: Option<u64>,
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub database_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub analysis_url: Option<String>,
    pub analysis_model: Option<String>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub bind_address: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub log_level: String,
    pub analysis: AnalysisConfig,
}

/// Resolved settings for the LLM integration
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub url: String,
    pub model: String,
    pub probe_timeout_secs: u64,
    pub generate_timeout_secs: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:11434".to_string(),
            model: "llama2".to_string(),
            probe_timeout_secs: 5,
            generate_timeout_secs: 60,
        }
    }
}

impl ServiceConfig {
    /// Resolve configuration from overrides, the TOML file and defaults
    ///
    /// A missing config file is not an error: a warning is logged and
    /// defaults apply. A file that exists but does not parse is an error.
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self> {
        let toml_config = match locate_config_file(overrides.config_path.as_deref()) {
            Some(path) => {
                let config = load_toml_config(&path)?;
                info!("Loaded configuration from {}", path.display());
                config
            }
            None => {
                warn!("No config file found, using defaults");
                TomlConfig::default()
            }
        };

        Ok(Self::merge(overrides, toml_config))
    }

    /// Merge overrides over a parsed TOML config over compiled defaults
    pub fn merge(overrides: ConfigOverrides, toml_config: TomlConfig) -> Self {
        let defaults = AnalysisConfig::default();

        Self {
            bind_address: overrides
                .bind_address
                .or(toml_config.bind_address)
                .unwrap_or_else(|| "127.0.0.1".to_string()),
            port: overrides.port.or(toml_config.port).unwrap_or(DEFAULT_PORT),
            database_path: overrides
                .database_path
                .or(toml_config.database_path)
                .unwrap_or_else(default_database_path),
            log_level: overrides
                .log_level
                .or(toml_config.logging.level)
                .unwrap_or_else(|| "info".to_string()),
            analysis: AnalysisConfig {
                url: overrides
                    .analysis_url
                    .or(toml_config.analysis.url)
                    .unwrap_or(defaults.url),
                model: overrides
                    .analysis_model
                    .or(toml_config.analysis.model)
                    .unwrap_or(defaults.model),
                probe_timeout_secs: toml_config
                    .analysis
                    .probe_timeout_secs
                    .unwrap_or(defaults.probe_timeout_secs),
                generate_timeout_secs: toml_config
                    .analysis
                    .generate_timeout_secs
                    .unwrap_or(defaults.generate_timeout_secs),
            },
        }
    }
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let config_error = |message: String| Error::Config {
        path: path.to_path_buf(),
        message,
    };
    let content = std::fs::read_to_string(path).map_err(|e| config_error(e.to_string()))?;
    toml::from_str(&content).map_err(|e| config_error(e.to_string()))
}

/// Find the config file: explicit path, then `NYSF_CONFIG`, then the user config dir
///
/// An explicitly named path is returned even if it does not exist, so the
/// subsequent read reports it.
fn locate_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return Some(PathBuf::from(path));
    }

    dirs::config_dir()
        .map(|d| d.join("nysf").join("config.toml"))
        .filter(|p| p.exists())
}

/// OS-dependent default database location
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("nysf").join("nysf.db"))
        .unwrap_or_else(|| PathBuf::from("./nysf_data/nysf.db"))
}
