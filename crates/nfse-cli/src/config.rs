//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use nfse_domain::ClassificationConfig;
use nfse_extractor::ExtractorConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Saved classification rule
    #[serde(default)]
    pub classification: ClassificationConfig,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,
}

/// Global CLI settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,

    /// Files processed at the same time
    #[serde(default = "default_parallel")]
    pub parallel: usize,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl OutputFormat {
    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "quiet" => Some(OutputFormat::Quiet),
            _ => None,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
            OutputFormat::Quiet => "quiet",
        };
        write!(f, "{}", name)
    }
}

impl Config {
    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".nfse-sorter").join("config.toml"))
    }

    /// Resolve an explicit path or fall back to the default one.
    pub fn resolve(path: Option<&Path>) -> Result<PathBuf> {
        match path {
            Some(path) => Ok(path.to_path_buf()),
            None => Self::path(),
        }
    }

    /// Load configuration from file, or the defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config
            .classification
            .validate()
            .map_err(|e| CliError::Config(format!("{}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Save configuration to file.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Change one setting by name.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "tag" | "tag_name" => self.classification.tag_name = value.to_string(),
            "tomador" | "tomador_value" => self.classification.tomador_value = value.to_string(),
            "prestador" | "prestador_value" => {
                self.classification.prestador_value = value.to_string()
            }
            "color" => {
                self.settings.color = value.parse().map_err(|_| {
                    CliError::InvalidInput(format!("color must be true or false, got '{}'", value))
                })?
            }
            "format" => {
                self.settings.format = OutputFormat::parse(value).ok_or_else(|| {
                    CliError::InvalidInput(format!(
                        "format must be table, json or quiet, got '{}'",
                        value
                    ))
                })?
            }
            "parallel" => {
                self.settings.parallel = match value.parse::<usize>() {
                    Ok(n) if n > 0 => n,
                    _ => {
                        return Err(CliError::InvalidInput(format!(
                            "parallel must be a positive number, got '{}'",
                            value
                        )))
                    }
                }
            }
            _ => return Err(CliError::InvalidInput(format!("Unknown setting '{}'", key))),
        }

        self.classification.validate().map_err(CliError::Config)
    }

    /// Extractor configuration built from these settings.
    pub fn extractor_config(&self) -> ExtractorConfig {
        let mut config = ExtractorConfig::with_classification(self.classification.clone());
        config.max_parallel_files = self.settings.parallel;
        config
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
            parallel: default_parallel(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

fn default_parallel() -> usize {
    ExtractorConfig::default().max_parallel_files
}
