//! Rule dispatch: turns configuration entries into an ordered category list.

use crate::config::AnalyzerConfig;
use crate::error::{NumscopeError, Result};

use super::builtin::{is_even, is_odd, is_prime};
use super::expr::CompiledRule;

/// Rule tokens reserved for the built-in predicates. Matching is exact and
/// case-sensitive; any other string is compiled as a custom rule.
pub const RESERVED_RULES: &[&str] = &["even", "odd", "prime"];

/// The predicate behind a category.
#[derive(Debug, Clone)]
pub enum Predicate {
    Even,
    Odd,
    Prime,
    Custom(CompiledRule),
}

impl Predicate {
    /// Whether `n` satisfies this predicate.
    ///
    /// Built-ins are total. A custom rule that fails at runtime for this
    /// particular `n` (division by zero and the like) is a non-match; the
    /// failure never crosses this boundary.
    pub fn matches(&self, n: i64) -> bool {
        match self {
            Predicate::Even => is_even(n),
            Predicate::Odd => is_odd(n),
            Predicate::Prime => is_prime(n),
            Predicate::Custom(rule) => rule.eval(n).unwrap_or(false),
        }
    }
}

/// A named predicate. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct Category {
    pub label: String,
    pub predicate: Predicate,
}

impl Category {
    pub fn matches(&self, n: i64) -> bool {
        self.predicate.matches(n)
    }
}

/// Build the active category list from a configuration, preserving entry
/// order. Fails if any custom rule does not compile; no partial list is
/// returned.
pub fn build_categories(config: &AnalyzerConfig) -> Result<Vec<Category>> {
    config.validate()?;

    let mut categories = Vec::with_capacity(config.categories.len());
    for entry in &config.categories {
        let predicate = match entry.rule.as_str() {
            "even" => Predicate::Even,
            "odd" => Predicate::Odd,
            "prime" => Predicate::Prime,
            rule => {
                let compiled =
                    CompiledRule::compile(rule).map_err(|message| NumscopeError::InvalidRule {
                        label: entry.label.clone(),
                        rule: rule.to_string(),
                        message,
                    })?;
                Predicate::Custom(compiled)
            }
        };
        categories.push(Category {
            label: entry.label.clone(),
            predicate,
        });
    }

    Ok(categories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CategoryEntry;

    fn config(entries: &[(&str, &str)]) -> AnalyzerConfig {
        AnalyzerConfig {
            categories: entries
                .iter()
                .map(|(label, rule)| CategoryEntry {
                    label: label.to_string(),
                    rule: rule.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_builtin_dispatch() {
        let categories =
            build_categories(&config(&[("E", "even"), ("O", "odd"), ("P", "prime")])).unwrap();
        assert!(matches!(categories[0].predicate, Predicate::Even));
        assert!(matches!(categories[1].predicate, Predicate::Odd));
        assert!(matches!(categories[2].predicate, Predicate::Prime));
    }

    #[test]
    fn test_dispatch_is_case_sensitive() {
        // "Even" is not the reserved token, so it must compile as a custom
        // rule - and fail, because `Even` is not a known name.
        let result = build_categories(&config(&[("E", "Even")]));
        assert!(matches!(result, Err(NumscopeError::InvalidRule { .. })));
    }

    #[test]
    fn test_custom_rule_dispatch() {
        let categories = build_categories(&config(&[("DivBy3", "n % 3 == 0")])).unwrap();
        assert!(categories[0].matches(9));
        assert!(!categories[0].matches(10));
    }

    #[test]
    fn test_order_preserved() {
        let categories =
            build_categories(&config(&[("A", "even"), ("B", "odd"), ("C", "prime")])).unwrap();
        let labels: Vec<&str> = categories.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_duplicate_labels_permitted() {
        let categories =
            build_categories(&config(&[("Same", "even"), ("Same", "odd")])).unwrap();
        assert_eq!(categories.len(), 2);
    }

    #[test]
    fn test_invalid_rule_carries_label_and_rule() {
        let result = build_categories(&config(&[("Good", "even"), ("Bad", "n %% 2")]));
        match result {
            Err(NumscopeError::InvalidRule { label, rule, .. }) => {
                assert_eq!(label, "Bad");
                assert_eq!(rule, "n %% 2");
            }
            other => panic!("expected InvalidRule, got {:?}", other),
        }
    }

    #[test]
    fn test_runtime_failure_is_contained() {
        let categories = build_categories(&config(&[("DividesTen", "10 % n == 0")])).unwrap();
        assert!(!categories[0].matches(0)); // division by zero -> non-match
        assert!(categories[0].matches(5));
    }
}
