//! Category system: named predicates over integers.
//!
//! A category pairs a display label with a predicate. Predicates come in two
//! trust levels:
//!
//! - **Built-in** (`even`, `odd`, `prime`): pure, total functions that can
//!   never fail.
//! - **Custom**: a boolean expression over the variable `n`, compiled once at
//!   registry build time and evaluated inside a closed interpreter that
//!   exposes only checked arithmetic, comparisons, boolean operators, and a
//!   small function whitelist. A rule that fails to compile aborts startup; a
//!   rule that fails at runtime for one number is a non-match for that number
//!   only.
//!
//! Module layout:
//!
//! - `builtin`: the built-in predicate functions
//! - `expr`: tokenizer, parser, type checker, and evaluator for custom rules
//! - `registry`: rule dispatch and ordered category construction

mod builtin;
mod expr;
mod registry;

pub use builtin::{is_even, is_odd, is_prime};
pub use expr::CompiledRule;
pub use registry::{build_categories, Category, Predicate, RESERVED_RULES};
