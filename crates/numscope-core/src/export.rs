//! RTF file export.
//!
//! The file sink buffers a small RTF document (Courier New, one paragraph per
//! number) and writes it durably on `finish`. File naming and collision
//! avoidance live here too: the default name is derived from the range and a
//! `_1`, `_2`, ... counter is appended while the target exists.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::sink::{group_digits, ResultSink};

const RTF_PROLOGUE: &str =
    "{\\rtf1\\ansi\\deff0\n{\\fonttbl{\\f0\\fnil\\fcharset0 Courier New;}}\n\\f0\\fs20\n";

/// [`ResultSink`] that accumulates an RTF document and writes it on finish.
pub struct RtfExporter {
    path: PathBuf,
    buffer: String,
}

impl RtfExporter {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            buffer: String::new(),
        }
    }

    /// Destination the document will be written to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultSink for RtfExporter {
    fn begin(&mut self, min: i64, max: i64) -> Result<()> {
        self.buffer.push_str(RTF_PROLOGUE);
        self.buffer.push_str(&format!(
            "Number Analysis ({} to {})\\par\n\\par\n",
            group_digits(min),
            group_digits(max)
        ));
        Ok(())
    }

    fn write_result(&mut self, number: i64, labels: &[&str]) -> Result<()> {
        self.buffer.push_str(&format!(
            "{}: {}\\par\n",
            group_digits(number),
            labels.join(", ")
        ));
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.buffer.push('}');
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, &self.buffer)?;
        Ok(())
    }
}

/// Resolve the export path for a run over `[min, max]`.
///
/// An explicit filename containing a directory component is used as given.
/// Anything else lands in `dir`, defaulting to `range_{min}_to_{max}.rtf`,
/// with a numeric suffix appended until the name is free.
pub fn unique_output_path(dir: &Path, min: i64, max: i64, explicit: Option<&str>) -> PathBuf {
    if let Some(name) = explicit {
        let given = Path::new(name);
        if given.parent().is_some_and(|p| !p.as_os_str().is_empty()) {
            return given.to_path_buf();
        }
        let stem = given
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| format!("range_{}_to_{}", min, max));
        let ext = given
            .extension()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "rtf".to_string());
        return dedup(dir, &stem, &ext);
    }

    dedup(dir, &format!("range_{}_to_{}", min, max), "rtf")
}

fn dedup(dir: &Path, stem: &str, ext: &str) -> PathBuf {
    let mut path = dir.join(format!("{}.{}", stem, ext));
    let mut counter = 1;
    while path.exists() {
        path = dir.join(format!("{}_{}.{}", stem, counter, ext));
        counter += 1;
    }
    path
}
