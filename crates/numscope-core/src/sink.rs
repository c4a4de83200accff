//! Result sinks: where per-number results go.
//!
//! The analyzer hands every sink the raw pieces (number, ordered matched
//! labels); each sink owns its own formatting. Every emitted record is a
//! complete unit, so a stream truncated mid-analysis never contains a torn
//! line.

use std::io::Write;

use crate::error::Result;

/// Destination for analysis results.
pub trait ResultSink {
    /// Called once before the first result, with the inclusive range bounds.
    fn begin(&mut self, _min: i64, _max: i64) -> Result<()> {
        Ok(())
    }

    /// One complete per-number record, labels in registry order.
    fn write_result(&mut self, number: i64, labels: &[&str]) -> Result<()>;

    /// Called once after the last result.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Line-oriented sink writing `number: label, label` immediately, with no
/// batching.
pub struct ConsoleSink<W: Write> {
    out: W,
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> ResultSink for ConsoleSink<W> {
    fn write_result(&mut self, number: i64, labels: &[&str]) -> Result<()> {
        writeln!(self.out, "{}: {}", group_digits(number), labels.join(", "))?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// Format an integer with thousands separators (`1234567` -> `1,234,567`).
pub fn group_digits(n: i64) -> String {
    let raw = n.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(raw.len() + raw.len() / 3 + 1);
    if n < 0 {
        grouped.push('-');
    }
    for (i, digit) in raw.chars().enumerate() {
        if i > 0 && (raw.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}
