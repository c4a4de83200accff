//! Range analysis: validation plus the streaming evaluation loop.

use crate::category::Category;
use crate::error::{NumscopeError, Result};
use crate::sink::ResultSink;

/// Inclusive range of integers to analyze.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisRange {
    pub min: i64,
    pub max: i64,
}

impl AnalysisRange {
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// Number of integers in the range. Computed in i128 so extreme bounds
    /// cannot overflow.
    pub fn size(&self) -> u128 {
        (self.max as i128 - self.min as i128 + 1).max(0) as u128
    }
}

/// System limits the analyzer validates against. Explicit values rather than
/// hidden globals, so callers and tests can tighten them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeLimits {
    /// Smallest acceptable bound.
    pub min_value: i64,
    /// Largest acceptable bound.
    pub max_value: i64,
    /// Hard cap on range size; larger requests are rejected.
    pub practical_limit: u64,
    /// Size above which the caller is warned that output may be better
    /// redirected to a file.
    pub warn_threshold: u64,
}

impl Default for RangeLimits {
    fn default() -> Self {
        Self {
            min_value: i64::MIN,
            max_value: i64::MAX,
            practical_limit: 1_000_000,
            warn_threshold: 500,
        }
    }
}

/// Outcome of range validation for an acceptable range.
///
/// `Large` is a warning, not an error: whether to redirect output to a file
/// is the caller's policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeAssessment {
    Ok,
    Large { size: u64 },
}

/// Evaluates every category against every number of a validated range,
/// streaming one result per number to a sink.
pub struct RangeAnalyzer {
    categories: Vec<Category>,
    limits: RangeLimits,
}

impl RangeAnalyzer {
    pub fn new(categories: Vec<Category>) -> Self {
        Self::with_limits(categories, RangeLimits::default())
    }

    pub fn with_limits(categories: Vec<Category>, limits: RangeLimits) -> Self {
        Self { categories, limits }
    }

    pub fn limits(&self) -> &RangeLimits {
        &self.limits
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Validate a requested range, short-circuiting in order: bounds, strict
    /// `min < max`, practical size limit, large-range warning.
    pub fn validate(&self, range: &AnalysisRange) -> Result<RangeAssessment> {
        if range.min < self.limits.min_value || range.max > self.limits.max_value {
            return Err(NumscopeError::BoundsExceeded {
                min: range.min,
                max: range.max,
                lo: self.limits.min_value,
                hi: self.limits.max_value,
            });
        }

        if range.min >= range.max {
            return Err(NumscopeError::EmptyRange {
                min: range.min,
                max: range.max,
            });
        }

        let size = range.size();
        if size > self.limits.practical_limit as u128 {
            return Err(NumscopeError::RangeTooLarge {
                size: size.min(u64::MAX as u128) as u64,
                limit: self.limits.practical_limit,
            });
        }
        let size = size as u64;

        if size > self.limits.warn_threshold {
            return Ok(RangeAssessment::Large { size });
        }
        Ok(RangeAssessment::Ok)
    }

    /// Ordered labels of the categories `n` satisfies.
    pub fn labels_for(&self, n: i64) -> Vec<&str> {
        self.categories
            .iter()
            .filter(|c| c.matches(n))
            .map(|c| c.label.as_str())
            .collect()
    }

    /// Analyze the range, emitting one result per number in ascending order.
    ///
    /// Validates first; no output is produced for an invalid range. Memory
    /// stays O(1) per number - nothing is retained between iterations.
    pub fn analyze<S: ResultSink>(&self, range: &AnalysisRange, sink: &mut S) -> Result<()> {
        self.validate(range)?;
        self.run(range, sink)
    }

    /// The evaluation loop without validation, for callers that already
    /// validated (e.g. to apply the large-range policy first).
    pub fn run<S: ResultSink>(&self, range: &AnalysisRange, sink: &mut S) -> Result<()> {
        sink.begin(range.min, range.max)?;
        let mut n = range.min;
        loop {
            sink.write_result(n, &self.labels_for(n))?;
            if n == range.max {
                break;
            }
            n += 1;
        }
        sink.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::build_categories;
    use crate::config::{AnalyzerConfig, CategoryEntry};

    struct VecSink {
        lines: Vec<(i64, Vec<String>)>,
    }

    impl VecSink {
        fn new() -> Self {
            Self { lines: Vec::new() }
        }
    }

    impl ResultSink for VecSink {
        fn write_result(&mut self, number: i64, labels: &[&str]) -> crate::Result<()> {
            self.lines
                .push((number, labels.iter().map(|s| s.to_string()).collect()));
            Ok(())
        }
    }

    fn analyzer(entries: &[(&str, &str)]) -> RangeAnalyzer {
        let config = AnalyzerConfig {
            categories: entries
                .iter()
                .map(|(label, rule)| CategoryEntry {
                    label: label.to_string(),
                    rule: rule.to_string(),
                })
                .collect(),
        };
        RangeAnalyzer::new(build_categories(&config).unwrap())
    }

    fn standard() -> RangeAnalyzer {
        analyzer(&[("Even", "even"), ("Prime", "prime"), ("Odd", "odd")])
    }

    #[test]
    fn test_inverted_range_rejected() {
        let result = standard().validate(&AnalysisRange::new(10, 5));
        assert!(matches!(result, Err(NumscopeError::EmptyRange { .. })));
    }

    #[test]
    fn test_single_number_range_rejected() {
        let result = standard().validate(&AnalysisRange::new(5, 5));
        assert!(matches!(result, Err(NumscopeError::EmptyRange { .. })));
    }

    #[test]
    fn test_oversized_range_rejected() {
        let result = standard().validate(&AnalysisRange::new(1, 2_000_000));
        match result {
            Err(NumscopeError::RangeTooLarge { size, limit }) => {
                assert_eq!(size, 2_000_000);
                assert_eq!(limit, 1_000_000);
            }
            other => panic!("expected RangeTooLarge, got {:?}", other),
        }
    }

    #[test]
    fn test_configured_bounds_enforced() {
        let analyzer = RangeAnalyzer::with_limits(
            Vec::new(),
            RangeLimits {
                min_value: -100,
                max_value: 100,
                ..RangeLimits::default()
            },
        );
        assert!(matches!(
            analyzer.validate(&AnalysisRange::new(-101, 0)),
            Err(NumscopeError::BoundsExceeded { .. })
        ));
        assert!(matches!(
            analyzer.validate(&AnalysisRange::new(0, 101)),
            Err(NumscopeError::BoundsExceeded { .. })
        ));
        assert!(analyzer.validate(&AnalysisRange::new(-100, 100)).is_ok());
    }

    #[test]
    fn test_bounds_checked_before_ordering() {
        // Short-circuit order: bounds first, even though the range is also
        // inverted.
        let analyzer = RangeAnalyzer::with_limits(
            Vec::new(),
            RangeLimits {
                min_value: 0,
                max_value: 100,
                ..RangeLimits::default()
            },
        );
        assert!(matches!(
            analyzer.validate(&AnalysisRange::new(-5, -10)),
            Err(NumscopeError::BoundsExceeded { .. })
        ));
    }

    #[test]
    fn test_extreme_bounds_do_not_overflow_size() {
        let result = standard().validate(&AnalysisRange::new(i64::MIN, i64::MAX));
        assert!(matches!(result, Err(NumscopeError::RangeTooLarge { .. })));
    }

    #[test]
    fn test_large_range_signalled_not_failed() {
        let assessment = standard().validate(&AnalysisRange::new(1, 501)).unwrap();
        assert_eq!(assessment, RangeAssessment::Large { size: 501 });

        let assessment = standard().validate(&AnalysisRange::new(1, 500)).unwrap();
        assert_eq!(assessment, RangeAssessment::Ok);
    }

    #[test]
    fn test_end_to_end_ten_to_twelve() {
        let analyzer = analyzer(&[("Even", "even"), ("Prime", "prime"), ("Odd", "odd")]);
        let mut sink = VecSink::new();
        analyzer
            .analyze(&AnalysisRange::new(10, 12), &mut sink)
            .unwrap();

        assert_eq!(sink.lines.len(), 3);
        assert_eq!(sink.lines[0], (10, vec!["Even".to_string()]));
        assert_eq!(
            sink.lines[1],
            (11, vec!["Prime".to_string(), "Odd".to_string()])
        );
        assert_eq!(sink.lines[2], (12, vec!["Even".to_string()]));
    }

    #[test]
    fn test_label_order_follows_configuration() {
        let analyzer = analyzer(&[("A", "even"), ("B", "n % 2 == 0"), ("C", "n >= 0")]);
        let mut sink = VecSink::new();
        analyzer
            .analyze(&AnalysisRange::new(2, 4), &mut sink)
            .unwrap();
        assert_eq!(sink.lines[0].1, vec!["A", "B", "C"]);
        assert_eq!(sink.lines[2].1, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_empty_match_set_still_reported() {
        let analyzer = analyzer(&[("Big", "n > 100")]);
        let mut sink = VecSink::new();
        analyzer
            .analyze(&AnalysisRange::new(1, 3), &mut sink)
            .unwrap();
        assert_eq!(sink.lines.len(), 3);
        assert!(sink.lines.iter().all(|(_, labels)| labels.is_empty()));
    }

    #[test]
    fn test_failing_rule_does_not_abort_run() {
        let analyzer = analyzer(&[("DividesTen", "10 % n == 0"), ("Odd", "odd")]);
        let mut sink = VecSink::new();
        analyzer
            .analyze(&AnalysisRange::new(-2, 2), &mut sink)
            .unwrap();

        // n = 0 divides by zero inside the rule: non-match there, the rest of
        // the range is still analyzed.
        assert_eq!(sink.lines.len(), 5);
        let at_zero = &sink.lines[2];
        assert_eq!(at_zero.0, 0);
        assert!(at_zero.1.is_empty());
        assert_eq!(sink.lines[3], (1, vec!["DividesTen".to_string(), "Odd".to_string()]));
    }

    #[test]
    fn test_no_output_for_invalid_range() {
        let mut sink = VecSink::new();
        let result = standard().analyze(&AnalysisRange::new(9, 3), &mut sink);
        assert!(result.is_err());
        assert!(sink.lines.is_empty());
    }

    #[test]
    fn test_rerun_is_identical() {
        let analyzer = analyzer(&[("Even", "even"), ("Square", "isqrt(abs(n)) * isqrt(abs(n)) == n")]);
        let range = AnalysisRange::new(-5, 30);

        let mut first = VecSink::new();
        analyzer.analyze(&range, &mut first).unwrap();
        let mut second = VecSink::new();
        analyzer.analyze(&range, &mut second).unwrap();

        assert_eq!(first.lines, second.lines);
    }

    #[test]
    fn test_range_ending_at_i64_max() {
        // The loop must terminate without overflowing past max.
        let analyzer = analyzer(&[("Odd", "odd")]);
        let mut sink = VecSink::new();
        analyzer
            .analyze(&AnalysisRange::new(i64::MAX - 2, i64::MAX), &mut sink)
            .unwrap();
        assert_eq!(sink.lines.len(), 3);
        assert_eq!(sink.lines[2].0, i64::MAX);
    }
}
