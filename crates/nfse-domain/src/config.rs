//! Classification rule: which tag to look at and which values map to which category

use serde::{Deserialize, Serialize};

/// Default tag name (ABRASF layout)
pub const DEFAULT_TAG_NAME: &str = "IssRetido";

/// Default value meaning "withheld by the recipient"
pub const DEFAULT_TOMADOR_VALUE: &str = "1";

/// Default value meaning "not withheld, due by the provider"
pub const DEFAULT_PRESTADOR_VALUE: &str = "2";

/// The user-editable tag/value rule
///
/// Values are compared as plain strings after trimming the matched text, so
/// `"01"` does not match `"1"`. A config is a value: changing it never
/// reclassifies records produced by an earlier run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationConfig {
    /// Tag whose first occurrence decides the category
    #[serde(default = "default_tag_name")]
    pub tag_name: String,

    /// Value that maps to [`Category::Tomador`](crate::Category::Tomador)
    #[serde(default = "default_tomador_value")]
    pub tomador_value: String,

    /// Value that maps to [`Category::Prestador`](crate::Category::Prestador)
    #[serde(default = "default_prestador_value")]
    pub prestador_value: String,
}

impl ClassificationConfig {
    /// Create a config from its three parts
    pub fn new(
        tag_name: impl Into<String>,
        tomador_value: impl Into<String>,
        prestador_value: impl Into<String>,
    ) -> Self {
        Self {
            tag_name: tag_name.into(),
            tomador_value: tomador_value.into(),
            prestador_value: prestador_value.into(),
        }
    }

    /// Validate the configuration
    ///
    /// An empty tag name would silently put every note in `sem_categoria`,
    /// so it is rejected before a run starts. Tag names are matched lexically,
    /// which rules out whitespace and angle brackets as well.
    pub fn validate(&self) -> Result<(), String> {
        let tag = self.tag_name.trim();
        if tag.is_empty() {
            return Err("tag_name must not be empty".to_string());
        }
        if tag.chars().any(|c| c.is_whitespace() || c == '<' || c == '>' || c == '/') {
            return Err(format!("tag_name '{}' is not a valid XML tag name", self.tag_name));
        }
        Ok(())
    }
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            tag_name: default_tag_name(),
            tomador_value: default_tomador_value(),
            prestador_value: default_prestador_value(),
        }
    }
}

fn default_tag_name() -> String {
    DEFAULT_TAG_NAME.to_string()
}

fn default_tomador_value() -> String {
    DEFAULT_TOMADOR_VALUE.to_string()
}

fn default_prestador_value() -> String {
    DEFAULT_PRESTADOR_VALUE.to_string()
}
