//! Category module - the three buckets a note can land in

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category assigned to a classified note
///
/// The names follow the ISS withholding vocabulary:
/// - Tomador: tax withheld by the service recipient
/// - Prestador: tax due by the service provider
/// - SemCategoria: configured tag missing, or its value matched neither option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Withheld by the recipient
    Tomador,

    /// Due by the provider
    Prestador,

    /// Fallback bucket
    SemCategoria,
}

impl Category {
    /// All categories in display order
    pub const ALL: [Category; 3] = [Category::Tomador, Category::Prestador, Category::SemCategoria];

    /// Get the category name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Tomador => "tomador",
            Category::Prestador => "prestador",
            Category::SemCategoria => "sem_categoria",
        }
    }

    /// Human-readable title used in listings and summaries
    pub fn title(&self) -> &'static str {
        match self {
            Category::Tomador => "ISS - Tomador",
            Category::Prestador => "ISS - Prestador",
            Category::SemCategoria => "Sem Categoria",
        }
    }

    /// Parse a category from a string
    ///
    /// Accepts the canonical snake_case name, case-insensitively, and treats
    /// `-` as `_` so `sem-categoria` works on the command line.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "tomador" => Some(Category::Tomador),
            "prestador" => Some(Category::Prestador),
            "sem_categoria" => Some(Category::SemCategoria),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid category: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_names() {
        assert_eq!(Category::Tomador.as_str(), "tomador");
        assert_eq!(Category::Prestador.as_str(), "prestador");
        assert_eq!(Category::SemCategoria.as_str(), "sem_categoria");
    }

    #[test]
    fn test_category_parse() {
        assert_eq!(Category::parse("TOMADOR"), Some(Category::Tomador));
        assert_eq!(Category::parse(" prestador "), Some(Category::Prestador));
        assert_eq!(Category::parse("sem-categoria"), Some(Category::SemCategoria));
        assert_eq!(Category::parse("other"), None);
        assert!("nope".parse::<Category>().is_err());
    }

    #[test]
    fn test_all_round_trips_through_display() {
        for category in Category::ALL {
            let parsed: Category = category.to_string().parse().unwrap();
            assert_eq!(parsed, category);
        }
    }
}
