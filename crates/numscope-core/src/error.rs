use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NumscopeError {
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid JSON in configuration file {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("Category #{index} has an empty label")]
    EmptyLabel { index: usize },

    #[error("Category '{label}' has an empty rule")]
    EmptyRule { label: String },

    #[error("Invalid rule for category '{label}': `{rule}` - {message}")]
    InvalidRule {
        label: String,
        rule: String,
        message: String,
    },

    #[error("Range [{min}, {max}] is outside the allowed bounds [{lo}, {hi}]")]
    BoundsExceeded {
        min: i64,
        max: i64,
        lo: i64,
        hi: i64,
    },

    #[error("Minimum value must be less than maximum value (got [{min}, {max}])")]
    EmptyRange { min: i64, max: i64 },

    #[error("Range size ({size} numbers) exceeds the practical limit of {limit}")]
    RangeTooLarge { size: u64, limit: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, NumscopeError>;

impl NumscopeError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConfigNotFound { .. } | Self::ConfigParse { .. } => 2,
            Self::EmptyLabel { .. } | Self::EmptyRule { .. } | Self::InvalidRule { .. } => 3,
            Self::BoundsExceeded { .. } | Self::EmptyRange { .. } => 4,
            Self::RangeTooLarge { .. } => 5,
            _ => 1,
        }
    }
}

/// Runtime failure while evaluating a user rule against one number.
///
/// Contained at the predicate boundary: the affected number is reported as a
/// non-match and analysis continues. Never converted into [`NumscopeError`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("integer overflow")]
    Overflow,
    #[error("isqrt of a negative number")]
    NegativeSqrt,
    #[error("negative exponent")]
    NegativeExponent,
}
