//! Readers and writers for the text formats exchanged with the ns-3 simulation scripts: flow
//! traces, flow size CDFs, FCT outputs, and the analysis result tables built from them.
//!
//! This crate is tightly coupled to the formats produced and consumed by the ns-3 scripts.

#![warn(unreachable_pub, missing_debug_implementations, missing_docs)]

use std::io::Write;
use std::path::{Path, PathBuf};

use tracekit_core::EDistError;

pub mod cdf;
pub mod fct;
pub mod report;
pub mod trace;

pub use cdf::{parse_cdf, read_cdf};
pub use fct::{parse_fct_records, read_fct_file, FctFile, LineLayout};
pub use report::{translate_slowdown_table, translate_throughput};
pub use trace::{parse_flows, read_flows, translate_flows, write_flows, TraceFile};

/// Writes `contents` to `path` through a temporary file in the same directory, so readers never
/// observe a partially written file.
pub fn write_atomic(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> Result<(), Error> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(contents.as_ref())?;
    file.flush()?;
    file.persist(path)?;
    Ok(())
}

pub(crate) fn read_input(path: &Path) -> Result<String, Error> {
    if !path.exists() {
        return Err(Error::MissingFile(path.into()));
    }
    Ok(std::fs::read_to_string(path)?)
}

/// A line that could not be parsed. Such lines are skipped rather than treated as fatal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedLine {
    /// Too few fields for the line's layout.
    #[error("wrong number of fields (expected at least {expected}, got {got})")]
    WrongNrFields {
        /// Minimum number of fields.
        expected: usize,
        /// Actual number of fields.
        got: usize,
    },

    /// A field is not a valid number.
    #[error("failed to parse field {index} ({value:?})")]
    ParseField {
        /// Zero-based field index.
        index: usize,
        /// The raw field.
        value: String,
    },
}

pub(crate) fn field<T>(fields: &[&str], index: usize) -> Result<T, MalformedLine>
where
    T: std::str::FromStr,
{
    fields[index].parse().map_err(|_| MalformedLine::ParseField {
        index,
        value: fields[index].to_owned(),
    })
}

/// Tally of the lines skipped while reading a file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipReport {
    /// Number of skipped lines.
    pub nr_skipped: usize,
    /// The first skipped line (one-based) and why it was skipped.
    pub first: Option<(usize, MalformedLine)>,
}

impl SkipReport {
    pub(crate) fn record(&mut self, line: usize, err: MalformedLine) {
        self.nr_skipped += 1;
        if self.first.is_none() {
            self.first = Some((line, err));
        }
    }

    pub(crate) fn log(&self, path: &Path) {
        if let Some((line, err)) = &self.first {
            log::warn!(
                "{}: skipped {} malformed lines (first at line {line}: {err})",
                path.display(),
                self.nr_skipped
            );
        }
    }
}

/// Error reading or writing ns-3 formats.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required input file does not exist.
    #[error("file not found: {0}")]
    MissingFile(PathBuf),

    /// A CDF line is not a `value percent` pair.
    #[error("invalid CDF line {line}: {reason}")]
    Cdf {
        /// One-based line number.
        line: usize,
        /// What is wrong with it.
        reason: MalformedLine,
    },

    /// The CDF does not describe a valid distribution.
    #[error("invalid CDF")]
    Distribution(#[from] EDistError),

    /// Failed to move a temporary file into place.
    #[error("failed to persist output file")]
    Persist(#[from] tempfile::PersistError),

    /// IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_atomic_replaces_contents() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out.txt");
        write_atomic(&path, "first")?;
        write_atomic(&path, "second")?;
        assert_eq!(std::fs::read_to_string(&path)?, "second");
        // Only the output file remains in the directory.
        assert_eq!(std::fs::read_dir(dir.path())?.count(), 1);
        Ok(())
    }

    #[test]
    fn missing_input_is_reported() {
        let err = read_input(Path::new("/nonexistent/trace.txt")).unwrap_err();
        assert!(matches!(err, Error::MissingFile(_)));
    }

    #[test]
    fn skip_report_keeps_first_error() {
        let mut report = SkipReport::default();
        report.record(3, MalformedLine::WrongNrFields { expected: 6, got: 2 });
        report.record(9, MalformedLine::WrongNrFields { expected: 6, got: 1 });
        assert_eq!(report.nr_skipped, 2);
        assert_eq!(report.first.map(|(line, _)| line), Some(3));
    }
}
