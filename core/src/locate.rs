//! The two search policies: "latest file not after a date" and "nearest
//! record within a tolerance window".

use std::{path::PathBuf, time::Duration};

use derive_more::Constructor;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    axis::TimeAxis,
    catalog::{Catalog, CatalogEntry},
    error::LocateError,
    Timestamp,
};

/// A resolved file and the position of the record inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Constructor)]
pub struct LookupResult {
    pub path: PathBuf,
    pub record_index: usize,
}

/// Selects the entry with the greatest date not after `requested`.
///
/// An entry counts from midnight (UTC) of its date. Entries sharing the
/// winning date resolve to the first one in catalog (path) order.
pub fn select_file(catalog: &Catalog, requested: Timestamp) -> Result<&CatalogEntry, LocateError> {
    latest(catalog.iter().filter(|entry| entry.start() <= requested))
        .ok_or(LocateError::NoCandidateFile {
            requested: Some(requested),
        })
}

/// Selects the entry with the greatest date, without an upper bound.
///
/// Used when no point in time is requested. Ties resolve like [`select_file`].
pub fn select_most_recent_file(catalog: &Catalog) -> Result<&CatalogEntry, LocateError> {
    latest(catalog.iter()).ok_or(LocateError::NoCandidateFile { requested: None })
}

fn latest<'a>(entries: impl Iterator<Item = &'a CatalogEntry>) -> Option<&'a CatalogEntry> {
    // `max_by_key` keeps the last maximum, the first one is wanted.
    entries.fold(None, |best: Option<&CatalogEntry>, entry| match best {
        Some(best) if best.date >= entry.date => Some(best),
        _ => Some(entry),
    })
}

/// Selects the record closest to `requested` among those whose window
/// `[timestamp - tolerance, timestamp + tolerance]` contains `requested`.
///
/// Equidistant records resolve to the lowest index. Sorted axes are searched
/// with a binary search, all others with a linear scan; both give the same
/// answer.
pub fn select_record(
    axis: &TimeAxis,
    requested: Timestamp,
    tolerance: Duration,
) -> Result<usize, LocateError> {
    let nearest = if axis.is_sorted() {
        nearest_sorted(axis.timestamps(), requested)
    } else {
        nearest_linear(axis.timestamps(), requested)
    };

    trace!(path = %axis.path().display(), ?nearest, sorted = axis.is_sorted(), "Nearest record");

    nearest
        .filter(|&index| in_window(axis.timestamps()[index], requested, tolerance))
        .ok_or_else(|| LocateError::NoCandidateRecord {
            path: axis.path().to_path_buf(),
            requested,
            tolerance,
        })
}

/// Absolute difference between two timestamps.
pub fn distance(a: Timestamp, b: Timestamp) -> Duration {
    let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
    (hi - lo).to_std().unwrap_or_default()
}

/// Does the window of `timestamp` contain `requested`?
pub fn in_window(timestamp: Timestamp, requested: Timestamp, tolerance: Duration) -> bool {
    distance(timestamp, requested) <= tolerance
}

fn nearest_linear(timestamps: &[Timestamp], requested: Timestamp) -> Option<usize> {
    timestamps
        .iter()
        .enumerate()
        .min_by_key(|&(index, &t)| (distance(t, requested), index))
        .map(|(index, _)| index)
}

fn nearest_sorted(timestamps: &[Timestamp], requested: Timestamp) -> Option<usize> {
    // First record at or after the request. It is also the first occurrence of its value.
    let upper = timestamps.partition_point(|&t| t < requested);
    // First occurrence of the value right before the request.
    let lower = upper
        .checked_sub(1)
        .map(|i| timestamps.partition_point(|&t| t < timestamps[i]));

    match (lower, timestamps.get(upper).map(|_| upper)) {
        (Some(lower), Some(upper)) => {
            let d_lower = distance(timestamps[lower], requested);
            let d_upper = distance(timestamps[upper], requested);
            Some(if d_lower <= d_upper { lower } else { upper })
        }
        (lower, upper) => lower.or(upper),
    }
}
