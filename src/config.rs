//! Configuration for searcher tree construction.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PhalanxError, Result};

/// Tunables consulted while a searcher tree is being built.
///
/// A config value travels with [`SearcherOptions`](crate::search::SearcherOptions)
/// into every constructor, so concurrent queries can run with different limits
/// without sharing mutable state.
///
/// # Example
///
/// ```
/// use phalanx::config::SearcherConfig;
///
/// let mut config = SearcherConfig::default();
/// config.max_clause_count = 1024;
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearcherConfig {
    /// Maximum number of children a disjunction may be built with.
    ///
    /// Zero disables the check.
    pub max_clause_count: usize,

    /// Fan-out above which disjunctions switch from a linear scan to a heap.
    pub disjunction_heap_takeover: usize,

    /// Whether unscored disjunctions may be collapsed into a single bitmap leaf.
    pub optimize_unadorned: bool,

    /// Upper bound for the slop a phrase searcher accepts.
    pub max_phrase_slop: u32,

    /// Largest edit distance a fuzzy candidate may carry.
    pub max_fuzziness: u8,
}

impl Default for SearcherConfig {
    fn default() -> Self {
        SearcherConfig {
            max_clause_count: 0,
            disjunction_heap_takeover: 10,
            optimize_unadorned: true,
            max_phrase_slop: 100,
            max_fuzziness: 2,
        }
    }
}

impl SearcherConfig {
    /// Parse a config from a JSON string. Missing keys take their default.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SearcherConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<()> {
        if self.disjunction_heap_takeover == 0 {
            return Err(PhalanxError::config(
                "disjunction_heap_takeover must be greater than zero",
            ));
        }
        if self.max_phrase_slop == 0 {
            return Err(PhalanxError::config(
                "max_phrase_slop must be greater than zero",
            ));
        }
        if self.max_fuzziness == 0 {
            return Err(PhalanxError::config(
                "max_fuzziness must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Check a clause count against `max_clause_count`.
    pub fn check_clause_count(&self, count: usize) -> Result<()> {
        if self.max_clause_count > 0 && count > self.max_clause_count {
            return Err(PhalanxError::too_many_clauses(
                count,
                self.max_clause_count,
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = SearcherConfig::default();
        assert_eq!(config.max_clause_count, 0);
        assert_eq!(config.disjunction_heap_takeover, 10);
        assert!(config.optimize_unadorned);
        assert_eq!(config.max_fuzziness, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SearcherConfig::from_json_str(r#"{"max_clause_count": 4}"#).unwrap();
        assert_eq!(config.max_clause_count, 4);
        assert_eq!(config.disjunction_heap_takeover, 10);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = SearcherConfig::from_json_str(r#"{"disjunction_heap_takeover": 0}"#);
        assert!(matches!(result, Err(PhalanxError::Config(_))));
    }

    #[test]
    fn test_clause_count_check() {
        let mut config = SearcherConfig::default();
        assert!(config.check_clause_count(100_000).is_ok());

        config.max_clause_count = 2;
        assert!(config.check_clause_count(2).is_ok());
        assert!(matches!(
            config.check_clause_count(3),
            Err(PhalanxError::TooManyClauses { count: 3, max: 2 })
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"optimize_unadorned": false, "max_phrase_slop": 8}}"#).unwrap();

        let config = SearcherConfig::from_file(file.path()).unwrap();
        assert!(!config.optimize_unadorned);
        assert_eq!(config.max_phrase_slop, 8);
    }
}
