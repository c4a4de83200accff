//! Configuration loading for the analyzer.
//!
//! The configuration is a JSON file listing the active categories in report
//! order:
//!
//! ```json
//! {
//!   "categories": [
//!     { "label": "Even", "rule": "even" },
//!     { "label": "DivBy3", "rule": "n % 3 == 0" }
//!   ]
//! }
//! ```
//!
//! `rule` is either one of the reserved tokens `even` / `odd` / `prime` or a
//! boolean expression over the variable `n` (see [`crate::category::expr`]).

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{NumscopeError, Result};

/// One configured category: display label plus rule string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub label: String,
    pub rule: String,
}

/// Parsed analyzer configuration. Entry order defines evaluation and
/// report order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    pub categories: Vec<CategoryEntry>,
}

impl AnalyzerConfig {
    /// Load and validate a configuration file.
    ///
    /// Structural problems (missing file, bad JSON, missing or non-string
    /// fields) are rejected here, before any predicate is constructed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(NumscopeError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path)?;
        let config: AnalyzerConfig =
            serde_json::from_str(&content).map_err(|e| NumscopeError::ConfigParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Check field-level invariants serde cannot express.
    pub fn validate(&self) -> Result<()> {
        for (index, entry) in self.categories.iter().enumerate() {
            if entry.label.trim().is_empty() {
                return Err(NumscopeError::EmptyLabel { index });
            }
            if entry.rule.trim().is_empty() {
                return Err(NumscopeError::EmptyRule {
                    label: entry.label.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_valid_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("analyzer-config.json");
        fs::write(
            &path,
            r#"{"categories": [
                {"label": "Even", "rule": "even"},
                {"label": "DivBy3", "rule": "n % 3 == 0"}
            ]}"#,
        )
        .unwrap();

        let config = AnalyzerConfig::load(&path).unwrap();
        assert_eq!(config.categories.len(), 2);
        assert_eq!(config.categories[0].label, "Even");
        assert_eq!(config.categories[1].rule, "n % 3 == 0");
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().unwrap();
        let result = AnalyzerConfig::load(&temp.path().join("nope.json"));
        assert!(matches!(result, Err(NumscopeError::ConfigNotFound { .. })));
    }

    #[test]
    fn test_load_invalid_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();

        let result = AnalyzerConfig::load(&path);
        assert!(matches!(result, Err(NumscopeError::ConfigParse { .. })));
    }

    #[test]
    fn test_missing_rule_field_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.json");
        fs::write(&path, r#"{"categories": [{"label": "Even"}]}"#).unwrap();

        let result = AnalyzerConfig::load(&path);
        assert!(matches!(result, Err(NumscopeError::ConfigParse { .. })));
    }

    #[test]
    fn test_empty_label_rejected() {
        let config = AnalyzerConfig {
            categories: vec![CategoryEntry {
                label: "  ".to_string(),
                rule: "even".to_string(),
            }],
        };
        assert!(matches!(
            config.validate(),
            Err(NumscopeError::EmptyLabel { index: 0 })
        ));
    }

    #[test]
    fn test_empty_rule_rejected() {
        let config = AnalyzerConfig {
            categories: vec![CategoryEntry {
                label: "Broken".to_string(),
                rule: "".to_string(),
            }],
        };
        assert!(matches!(
            config.validate(),
            Err(NumscopeError::EmptyRule { .. })
        ));
    }
}
