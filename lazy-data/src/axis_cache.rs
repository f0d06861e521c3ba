use std::{
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use dashmap::DashMap;
use get_size::GetSize;
use tracing::{debug, trace, warn};
use tsfile_index_core::{
    error::{LocateError, SourceError},
    source::TimeAxisReader,
    TimeAxis,
};

use crate::cached::{Cached, CachedError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of loaded time axes.
    pub entries: usize,
    /// Heap memory held by the loaded time axes.
    pub heap_bytes: usize,
    /// How often the underlying reader has been invoked.
    pub reads: usize,
}

/// Time axes by path, each read at most once for the lifetime of the cache.
///
/// Entries are never evicted. Concurrent requests for an uncached path wait
/// on a single read. A failed read leaves no entry behind.
pub struct TimeAxisCache<R: TimeAxisReader> {
    reader: Arc<R>,
    axes: DashMap<PathBuf, Cached<Arc<TimeAxis>, LocateError>>,
    reads: Arc<AtomicUsize>,
}

impl<R: TimeAxisReader> TimeAxisCache<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: Arc::new(reader),
            axes: DashMap::new(),
            reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    pub async fn get(&self, path: &Path) -> Result<Arc<TimeAxis>, LocateError> {
        // Clone the cell out so no map guard is held across the await.
        let cell = self
            .axes
            .entry(path.to_path_buf())
            .or_insert_with(Cached::empty)
            .value()
            .clone();

        if let Some(axis) = cell.try_get_sync() {
            trace!(path = %path.display(), "Time axis cache hit");
            return Ok(axis);
        }

        let reader = self.reader.clone();
        let reads = self.reads.clone();
        let owned = path.to_path_buf();

        let res = cell
            .get_cached(move || {
                Box::pin(async move {
                    reads.fetch_add(1, Ordering::SeqCst);
                    debug!(path = %owned.display(), "Reading time axis");

                    let raw = reader
                        .read_time_axis(&owned)
                        .await
                        .map_err(|e| LocateError::source_unavailable(&owned, e))?;
                    let axis = TimeAxis::from_raw(owned.clone(), &raw)
                        .map_err(|e| LocateError::source_unavailable(&owned, e))?;

                    debug!(path = %owned.display(), records = axis.len(), sorted = axis.is_sorted(), "Loaded time axis");
                    Ok::<_, LocateError>(Arc::new(axis))
                })
            })
            .await;

        res.map_err(|e| {
            let err = match e {
                CachedError::Load(err) => err,
                CachedError::Died => LocateError::source_unavailable(
                    path,
                    SourceError::Other("time axis load died".to_string()),
                ),
            };
            warn!(path = %path.display(), error = %err, "Failed to load time axis");
            // Drop the empty cell, unless a retry has already started on it.
            self.axes
                .remove_if(path, |_, cell| !cell.is_loaded() && !cell.is_loading());
            err
        })
    }

    /// Is the time axis of `path` loaded?
    pub fn contains(&self, path: &Path) -> bool {
        self.axes
            .get(path)
            .map_or(false, |cell| cell.value().is_loaded())
    }

    /// Number of loaded time axes.
    pub fn len(&self) -> usize {
        self.axes.iter().filter(|cell| cell.value().is_loaded()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn stats(&self) -> CacheStats {
        let (entries, heap_bytes) = self
            .axes
            .iter()
            .filter_map(|cell| cell.value().try_get_sync())
            .fold((0, 0), |(n, bytes), axis| (n + 1, bytes + axis.get_heap_size()));

        CacheStats {
            entries,
            heap_bytes,
            reads: self.reads(),
        }
    }
}
