use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use ndarray::Array2;
use tracing::{debug, warn};

use crate::{
    axis::RawTimeAxis,
    config::expand_home,
    error::{LocateError, SourceError},
    formats,
};

/// Lists the files a lookup may choose from.
///
/// Called once per lookup, so files appearing or disappearing between
/// lookups are picked up.
pub trait FileEnumerator: Send + Sync {
    fn enumerate(&self) -> Result<Vec<PathBuf>, LocateError>;
}

/// Reads the raw time axis of one file. The only place file contents are read
/// while locating.
#[async_trait]
pub trait TimeAxisReader: Send + Sync + 'static {
    async fn read_time_axis(&self, path: &Path) -> Result<RawTimeAxis, SourceError>;
}

/// Reads a single 2-D record once a file and record index are resolved.
#[async_trait]
pub trait RecordReader: Send + Sync {
    async fn read_record(&self, path: &Path, index: usize) -> Result<Array2<f32>, SourceError>;
}

impl<T: FileEnumerator + ?Sized> FileEnumerator for Arc<T> {
    fn enumerate(&self) -> Result<Vec<PathBuf>, LocateError> {
        (**self).enumerate()
    }
}

#[async_trait]
impl<T: TimeAxisReader + ?Sized> TimeAxisReader for Arc<T> {
    async fn read_time_axis(&self, path: &Path) -> Result<RawTimeAxis, SourceError> {
        (**self).read_time_axis(path).await
    }
}

/// Enumerates files matching a glob pattern on the local file system.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GlobEnumerator {
    pattern: String,
}

impl GlobEnumerator {
    /// A leading `~` in `pattern` is expanded to the home directory.
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: expand_home(pattern),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl FileEnumerator for GlobEnumerator {
    fn enumerate(&self) -> Result<Vec<PathBuf>, LocateError> {
        let entries = glob::glob(&self.pattern).map_err(|e| {
            LocateError::source_unavailable(&self.pattern, SourceError::Glob(e.to_string()))
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            match entry {
                Ok(path) => paths.push(path),
                Err(e) => {
                    warn!(path = %e.path().display(), error = %e.error(), "Skipping unreadable path")
                }
            }
        }
        paths.sort();

        debug!(pattern = %self.pattern, matched = paths.len(), "Enumerated files");
        Ok(paths)
    }
}

/// Reads time axes stored as CSV, see [`formats::csv::read_time_axis`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CsvTimeAxisReader;

#[async_trait]
impl TimeAxisReader for CsvTimeAxisReader {
    async fn read_time_axis(&self, path: &Path) -> Result<RawTimeAxis, SourceError> {
        // TODO: Move onto the blocking pool once axes get large enough to matter
        let file = std::fs::File::open(path)?;
        formats::csv::read_time_axis(std::io::BufReader::new(file))
    }
}
