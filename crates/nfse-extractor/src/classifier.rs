//! Tag/value classification of note fragments

use crate::error::ExtractorError;
use nfse_domain::traits::TagLookup;
use nfse_domain::{Category, ClassificationConfig};
use regex::{Regex, RegexBuilder};

/// Regex-based lookup of one tag's value
///
/// The tag name is matched case-insensitively; the value may span lines.
/// Only the first occurrence in the text is ever returned.
#[derive(Debug, Clone)]
pub struct LexicalTagLookup {
    pattern: Regex,
}

impl LexicalTagLookup {
    /// Build a lookup for `tag_name`
    pub fn new(tag_name: &str) -> Result<Self, ExtractorError> {
        let tag = tag_name.trim();
        if tag.is_empty() {
            return Err(ExtractorError::Configuration(
                "tag_name must not be empty".to_string(),
            ));
        }

        let escaped = regex::escape(tag);
        let pattern = RegexBuilder::new(&format!(r"<{0}\s*>(.*?)</{0}\s*>", escaped))
            .case_insensitive(true)
            .dot_matches_new_line(true)
            .build()
            .map_err(|e| ExtractorError::Configuration(format!("Invalid tag pattern: {}", e)))?;

        Ok(Self { pattern })
    }
}

impl TagLookup for LexicalTagLookup {
    fn first_value<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.pattern
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    }
}

/// Assigns a category to each note
///
/// Holds a snapshot of the rule taken when it was built; updating the
/// configuration afterwards has no effect on this classifier.
#[derive(Debug, Clone)]
pub struct TagClassifier<L = LexicalTagLookup> {
    lookup: L,
    tomador_value: String,
    prestador_value: String,
}

impl TagClassifier<LexicalTagLookup> {
    /// Build a classifier from a rule, validating it first
    pub fn new(config: &ClassificationConfig) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Configuration)?;
        let lookup = LexicalTagLookup::new(&config.tag_name)?;
        Ok(Self::with_lookup(lookup, config))
    }
}

impl<L: TagLookup> TagClassifier<L> {
    /// Build a classifier around a custom tag lookup
    pub fn with_lookup(lookup: L, config: &ClassificationConfig) -> Self {
        Self {
            lookup,
            tomador_value: config.tomador_value.clone(),
            prestador_value: config.prestador_value.clone(),
        }
    }

    /// Category of one fragment
    ///
    /// The matched value is trimmed and then compared as a plain string: first
    /// against the tomador value, then the prestador value.
    pub fn classify(&self, fragment: &str) -> Category {
        let value = match self.lookup.first_value(fragment) {
            Some(value) => value.trim(),
            None => return Category::SemCategoria,
        };

        if value == self.tomador_value {
            Category::Tomador
        } else if value == self.prestador_value {
            Category::Prestador
        } else {
            Category::SemCategoria
        }
    }
}

/// Classify one fragment with a rule
///
/// Convenience for single calls; batch code builds a [`TagClassifier`] once.
pub fn classify(fragment: &str, config: &ClassificationConfig) -> Result<Category, ExtractorError> {
    Ok(TagClassifier::new(config)?.classify(fragment))
}
