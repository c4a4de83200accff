pub mod analyzer;
pub mod category;
pub mod config;
pub mod error;
pub mod export;
pub mod sink;

pub use analyzer::{AnalysisRange, RangeAnalyzer, RangeAssessment, RangeLimits};
pub use category::{build_categories, Category, CompiledRule, Predicate, RESERVED_RULES};
pub use config::{AnalyzerConfig, CategoryEntry};
pub use error::{NumscopeError, Result, RuleError};
pub use export::{unique_output_path, RtfExporter};
pub use sink::{group_digits, ConsoleSink, ResultSink};
