//! Configuration for the Extractor

use nfse_domain::ClassificationConfig;
use serde::{Deserialize, Serialize};

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Extension of content files, both standalone and inside archives
    #[serde(default = "default_content_extension")]
    pub content_extension: String,

    /// Extension of container files
    #[serde(default = "default_archive_extension")]
    pub archive_extension: String,

    /// Maximum number of input files processed at the same time
    #[serde(default = "default_max_parallel_files")]
    pub max_parallel_files: usize,

    /// Maximum size of a single content file, in bytes
    #[serde(default = "default_max_file_size")]
    pub max_file_size: usize,

    /// Tag/value rule used to classify each note
    #[serde(default)]
    pub classification: ClassificationConfig,
}

impl ExtractorConfig {
    /// Build a default configuration around a classification rule
    pub fn with_classification(classification: ClassificationConfig) -> Self {
        Self {
            classification,
            ..Self::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        self.classification.validate()?;
        if self.content_extension.trim_start_matches('.').is_empty() {
            return Err("content_extension must not be empty".to_string());
        }
        if self.archive_extension.trim_start_matches('.').is_empty() {
            return Err("archive_extension must not be empty".to_string());
        }
        if self.max_parallel_files == 0 {
            return Err("max_parallel_files must be greater than 0".to_string());
        }
        if self.max_file_size == 0 {
            return Err("max_file_size must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Sequential preset: one file at a time
    pub fn sequential() -> Self {
        Self {
            max_parallel_files: 1,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str)
            .map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            content_extension: default_content_extension(),
            archive_extension: default_archive_extension(),
            max_parallel_files: default_max_parallel_files(),
            max_file_size: default_max_file_size(),
            classification: ClassificationConfig::default(),
        }
    }
}

fn default_content_extension() -> String {
    "xml".to_string()
}

fn default_archive_extension() -> String {
    "zip".to_string()
}

fn default_max_parallel_files() -> usize {
    8
}

fn default_max_file_size() -> usize {
    64 * 1024 * 1024
}
