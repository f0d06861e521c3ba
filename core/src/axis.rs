use std::path::{Path, PathBuf};

use derive_more::Constructor;
use get_size::GetSize;
use serde::{Deserialize, Serialize};

use crate::{error::SourceError, formats::units::TimeUnits, Timestamp};

/// A time axis as it is stored in a file: numeric offsets plus a units string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Constructor)]
pub struct RawTimeAxis {
    pub offsets: Vec<f64>,
    /// `"<unit> since <epoch>"`
    pub units: String,
}

impl RawTimeAxis {
    pub fn decode(&self) -> Result<Vec<Timestamp>, SourceError> {
        let units = TimeUnits::parse(&self.units)?;
        self.offsets
            .iter()
            .enumerate()
            .map(|(index, &offset)| {
                units
                    .to_timestamp(offset)
                    .ok_or(SourceError::OffsetOutOfRange { index, offset })
            })
            .collect()
    }
}

/// The absolute timestamps stored in one file.
///
/// Position `i` in the axis is record `i` in the same file. The order is
/// whatever the file holds; `is_sorted` records whether it happens to be
/// non-decreasing, which lets lookups use a binary search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeAxis {
    path: PathBuf,
    timestamps: Vec<Timestamp>,
    sorted: bool,
}

impl TimeAxis {
    pub fn new(path: impl Into<PathBuf>, timestamps: Vec<Timestamp>) -> Self {
        let sorted = timestamps.windows(2).all(|w| w[0] <= w[1]);
        Self {
            path: path.into(),
            timestamps,
            sorted,
        }
    }

    pub fn from_raw(path: impl Into<PathBuf>, raw: &RawTimeAxis) -> Result<Self, SourceError> {
        Ok(Self::new(path, raw.decode()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn timestamps(&self) -> &[Timestamp] {
        &self.timestamps
    }

    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Timestamp> {
        self.timestamps.get(index).copied()
    }

    pub fn first(&self) -> Option<Timestamp> {
        self.timestamps.first().copied()
    }

    pub fn last(&self) -> Option<Timestamp> {
        self.timestamps.last().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = Timestamp> + '_ {
        self.timestamps.iter().copied()
    }
}

// `DateTime` has no `GetSize` impl, its size is all on the stack.
impl GetSize for TimeAxis {
    fn get_heap_size(&self) -> usize {
        self.path.as_os_str().len()
            + self.timestamps.capacity() * std::mem::size_of::<Timestamp>()
    }
}
