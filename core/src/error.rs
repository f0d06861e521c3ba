use std::{num::ParseFloatError, path::PathBuf, sync::Arc, time::Duration};

use miette::Diagnostic;
use thiserror::Error;

use crate::{formats::units, Timestamp};

/// Everything that can go wrong while resolving a point in time to a record.
///
/// "No file" and "no record in the chosen file" are different kinds and are
/// never folded into each other. `Clone`, since a single failed load is handed
/// to every caller that was waiting on it.
#[derive(Debug, Clone, Error, Diagnostic)]
pub enum LocateError {
    #[error("File name {} does not contain a date token of the form {expected}", .path.display())]
    #[diagnostic(code(tsfile_index::pattern_mismatch))]
    PatternMismatch { path: PathBuf, expected: String },

    #[error("Source {} is unavailable: {source}", .path.display())]
    #[diagnostic(code(tsfile_index::source_unavailable))]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: SourceError,
    },

    #[error("No candidate file{}", .requested.map(|t| format!(" dated at or before {t}")).unwrap_or_default())]
    #[diagnostic(
        code(tsfile_index::no_candidate_file),
        help("Every cataloged file is dated after the requested time, or the catalog is empty")
    )]
    NoCandidateFile { requested: Option<Timestamp> },

    #[error("No record within {tolerance:?} of {requested} in {}", .path.display())]
    #[diagnostic(code(tsfile_index::no_candidate_record))]
    NoCandidateRecord {
        path: PathBuf,
        requested: Timestamp,
        tolerance: Duration,
    },
}

impl LocateError {
    pub fn source_unavailable(path: impl Into<PathBuf>, source: impl Into<SourceError>) -> Self {
        Self::SourceUnavailable {
            path: path.into(),
            source: source.into(),
        }
    }
}

/// Why a file (or the file listing) could not be read.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(Arc<std::io::Error>),
    #[error("CSV error: {0}")]
    Csv(Arc<csv::Error>),
    #[error("Invalid glob pattern: {0}")]
    Glob(String),

    #[error("Missing time units header (first line)")]
    MissingUnits,
    #[error(transparent)]
    Units(#[from] units::Error),
    #[error("Invalid time offset (line {line}: {source})")]
    InvalidOffset { line: usize, source: ParseFloatError },
    #[error("Time offset {offset} at index {index} is not representable as a timestamp")]
    OffsetOutOfRange { index: usize, offset: f64 },

    #[error("Record {index} out of range ({len} records)")]
    RecordOutOfRange { index: usize, len: usize },
    #[error("{0}")]
    Other(String),
}

impl From<std::io::Error> for SourceError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(Arc::new(err))
    }
}

impl From<csv::Error> for SourceError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(Arc::new(err))
    }
}
