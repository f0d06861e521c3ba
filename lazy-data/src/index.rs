use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use ndarray::Array2;
use tracing::debug;
use tsfile_index_core::{
    error::LocateError,
    locate::{self, LookupResult},
    source::{FileEnumerator, GlobEnumerator, RecordReader, TimeAxisReader},
    Catalog, IndexConfig, PathDateParser, TimeAxis, Timestamp,
};

use crate::axis_cache::TimeAxisCache;

/// Resolves points in time to a file and a record inside it.
///
/// Files are enumerated afresh on every lookup; time axes are read once and
/// kept for the lifetime of the index. Lookups may run concurrently.
pub struct TimeSeriesIndex<R: TimeAxisReader, E: FileEnumerator = GlobEnumerator> {
    enumerator: E,
    parser: PathDateParser,
    skip_mismatched: bool,
    cache: TimeAxisCache<R>,
}

impl<R: TimeAxisReader> TimeSeriesIndex<R, GlobEnumerator> {
    pub fn new(config: &IndexConfig, reader: R) -> Self {
        Self::with_enumerator(config, GlobEnumerator::new(&config.pattern), reader)
    }
}

impl<R: TimeAxisReader, E: FileEnumerator> TimeSeriesIndex<R, E> {
    pub fn with_enumerator(config: &IndexConfig, enumerator: E, reader: R) -> Self {
        Self {
            enumerator,
            parser: config.date_parser(),
            skip_mismatched: config.skip_mismatched,
            cache: TimeAxisCache::new(reader),
        }
    }

    pub fn cache(&self) -> &TimeAxisCache<R> {
        &self.cache
    }

    pub fn enumerator(&self) -> &E {
        &self.enumerator
    }

    /// Enumerates the files and parses their dates.
    pub fn catalog(&self) -> Result<Catalog, LocateError> {
        let paths = self.enumerator.enumerate()?;
        Catalog::from_paths(paths, &self.parser, self.skip_mismatched)
    }

    /// Finds the record closest to `requested`, at most `tolerance` away, in
    /// the latest file dated at or before `requested`.
    ///
    /// Errors of the individual steps are returned as they are.
    pub async fn resolve(
        &self,
        requested: Timestamp,
        tolerance: Duration,
    ) -> Result<LookupResult, LocateError> {
        let catalog = self.catalog()?;
        let entry = locate::select_file(&catalog, requested)?;
        debug!(%requested, path = %entry.path.display(), date = %entry.date, "Selected file");

        let axis = self.cache.get(&entry.path).await?;
        let record_index = locate::select_record(&axis, requested, tolerance)?;
        debug!(%requested, ?tolerance, record_index, "Selected record");

        Ok(LookupResult::new(entry.path.clone(), record_index))
    }

    /// The file with the latest date, for when no point in time is requested.
    pub fn most_recent_file(&self) -> Result<PathBuf, LocateError> {
        let catalog = self.catalog()?;
        let entry = locate::select_most_recent_file(&catalog)?;
        debug!(path = %entry.path.display(), date = %entry.date, "Selected most recent file");
        Ok(entry.path.clone())
    }

    /// The (cached) time axis of any file.
    pub async fn time_axis(&self, path: &Path) -> Result<Arc<TimeAxis>, LocateError> {
        self.cache.get(path).await
    }

    /// Resolves `requested` and reads the matching record.
    pub async fn load_record<Rec>(
        &self,
        records: &Rec,
        requested: Timestamp,
        tolerance: Duration,
    ) -> Result<(LookupResult, Array2<f32>), LocateError>
    where
        Rec: RecordReader + ?Sized,
    {
        let found = self.resolve(requested, tolerance).await?;
        let record = records
            .read_record(&found.path, found.record_index)
            .await
            .map_err(|e| LocateError::source_unavailable(&found.path, e))?;
        Ok((found, record))
    }
}
