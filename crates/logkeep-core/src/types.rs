//! Core types for logkeep

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// Regex pattern for valid log names: only alphanumeric, underscore, and hyphen
static LOG_NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9_-]+$").expect("Invalid log name regex")
});

/// Validate a logical log name. It becomes part of a file name, so path
/// separators and dots are rejected.
pub fn validate_log_name(name: &str) -> bool {
    !name.is_empty() && LOG_NAME_REGEX.is_match(name)
}

/// Kind of log, each with its own directory, naming and rotation rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Line-oriented records appended to one active file per stream
    Structured,
    /// One file per write, named by the write timestamp
    Raw,
}

impl Category {
    /// All categories, in processing order
    pub const ALL: [Category; 2] = [Category::Structured, Category::Raw];

    /// Name of the category directory under `<root>/logs`
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Structured => "structured",
            Category::Raw => "raw",
        }
    }

    /// Whether writes to this category go through day and size rotation
    pub fn rotates(&self) -> bool {
        matches!(self, Category::Structured)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "structured" | "json" => Ok(Category::Structured),
            "raw" => Ok(Category::Raw),
            _ => Err(Error::InvalidCategory(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse() {
        assert_eq!("structured".parse::<Category>().unwrap(), Category::Structured);
        assert_eq!("JSON".parse::<Category>().unwrap(), Category::Structured);
        assert_eq!("raw".parse::<Category>().unwrap(), Category::Raw);
        assert!("binary".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_display_matches_dir() {
        for category in Category::ALL {
            assert_eq!(category.to_string(), category.dir_name());
        }
    }

    #[test]
    fn test_only_structured_rotates() {
        assert!(Category::Structured.rotates());
        assert!(!Category::Raw.rotates());
    }

    #[test]
    fn test_category_serde() {
        let json = serde_json::to_string(&Category::Raw).unwrap();
        assert_eq!(json, "\"raw\"");
        let parsed: Category = serde_json::from_str("\"structured\"").unwrap();
        assert_eq!(parsed, Category::Structured);
    }

    #[test]
    fn test_validate_log_name() {
        assert!(validate_log_name("main"));
        assert!(validate_log_name("user_42-guest"));
        assert!(!validate_log_name(""));
        assert!(!validate_log_name("../etc"));
        assert!(!validate_log_name("a.b"));
        assert!(!validate_log_name("a/b"));
    }
}
