//! Configuration management for eulaw-report
//!
//! Settings live in a TOML file (`~/.eulaw-report/config.toml` by default).
//! Every field has a default, so a partial file or no file at all is valid.
//!
//! Configuration precedence (highest to lowest):
//! 1. Command-line arguments
//! 2. Configuration file
//! 3. Default values

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};
use crate::export::ExportFormat;
use crate::utils::fs::{ensure_dir_exists, expand_home};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Export defaults
    #[serde(default)]
    pub export: ExportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Filter preset storage
    #[serde(default)]
    pub presets: PresetsConfig,
}

/// Export-related configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportConfig {
    /// Directory exported files are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Format used when none is given on the command line
    #[serde(default = "default_format")]
    pub default_format: ExportFormat,

    /// Force simplified (`true`) or verbatim (`false`) operative part text;
    /// unset keeps the `showSimplified` flag of the report data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_simplified: Option<bool>,

    /// Render a progress bar while exporting
    #[serde(default = "default_progress_bar")]
    pub progress_bar: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Enable timestamps in logs
    #[serde(default = "default_log_timestamps")]
    pub timestamps: bool,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Filter preset storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PresetsConfig {
    /// JSON file holding saved presets (`~` is expanded)
    #[serde(default = "default_presets_file")]
    pub file_path: PathBuf,
}

// Default value functions
fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_format() -> ExportFormat {
    ExportFormat::Csv
}

fn default_progress_bar() -> bool {
    true
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

fn default_log_timestamps() -> bool {
    true
}

fn default_presets_file() -> PathBuf {
    app_dir().join("presets.json")
}

fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".eulaw-report")
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            default_format: default_format(),
            show_simplified: None,
            progress_bar: default_progress_bar(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            timestamps: default_log_timestamps(),
        }
    }
}

impl Default for PresetsConfig {
    fn default() -> Self {
        Self {
            file_path: default_presets_file(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a file
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file (TOML format)
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()).into());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::InvalidFormat(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from an explicit path or the default location
    ///
    /// A missing default file yields the default configuration, a missing
    /// explicitly named file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let path = Self::default_path();
                if path.exists() {
                    Self::from_file(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        app_dir().join("config.toml")
    }

    /// Save configuration to a file
    ///
    /// # Arguments
    /// * `path` - Path where to save the configuration
    ///
    /// # Returns
    /// * `Result<()>` - Success or error
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_dir_exists(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Serialize the configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidFormat(e.to_string()).into())
    }

    /// Validate the configuration
    ///
    /// # Returns
    /// * `Result<()>` - Ok if valid, error otherwise
    pub fn validate(&self) -> Result<()> {
        let output_dir = self.output_dir();
        if output_dir.exists() && !output_dir.is_dir() {
            return Err(ConfigError::InvalidValue {
                field: "export.output_dir".to_string(),
                value: output_dir.display().to_string(),
            }
            .into());
        }
        if self.presets.file_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "presets.file_path".to_string(),
                value: String::new(),
            }
            .into());
        }
        Ok(())
    }

    /// Export directory with `~` expanded
    pub fn output_dir(&self) -> PathBuf {
        expand_home(&self.export.output_dir)
    }

    /// Preset file with `~` expanded
    pub fn presets_path(&self) -> PathBuf {
        expand_home(&self.presets.file_path)
    }
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}
