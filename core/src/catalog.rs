use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use derive_more::Constructor;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{error::LocateError, formats::date_stamp::PathDateParser, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Constructor)]
pub struct CatalogEntry {
    pub path: PathBuf,
    pub date: NaiveDate,
}

impl CatalogEntry {
    /// Midnight UTC of the entry's date.
    pub fn start(&self) -> Timestamp {
        Utc.from_utc_datetime(&self.date.and_time(NaiveTime::MIN))
    }
}

/// The dated files found by one enumeration pass.
///
/// Entries are ordered by path and every path occurs once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn from_entries(mut entries: Vec<CatalogEntry>) -> Self {
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        entries.dedup_by(|a, b| a.path == b.path);
        Self { entries }
    }

    /// Parses the date of every path.
    ///
    /// A path without a date token fails the whole catalog unless
    /// `skip_mismatched` is set, in which case it is logged and left out.
    pub fn from_paths(
        paths: impl IntoIterator<Item = PathBuf>,
        parser: &PathDateParser,
        skip_mismatched: bool,
    ) -> Result<Self, LocateError> {
        let mut entries = Vec::new();
        for path in paths {
            match parser.parse(&path) {
                Ok(date) => entries.push(CatalogEntry { path, date }),
                Err(err) if skip_mismatched => {
                    warn!(path = %path.display(), error = %err, "Skipping file without date token");
                }
                Err(err) => return Err(err),
            }
        }

        let catalog = Self::from_entries(entries);
        if catalog.has_duplicate_dates() {
            warn!(
                entries = catalog.len(),
                "Catalog contains several files with the same date, the first path wins"
            );
        }
        Ok(catalog)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_duplicate_dates(&self) -> bool {
        let mut dates: Vec<_> = self.entries.iter().map(|e| e.date).collect();
        dates.sort_unstable();
        dates.windows(2).any(|w| w[0] == w[1])
    }
}

impl IntoIterator for Catalog {
    type Item = CatalogEntry;
    type IntoIter = std::vec::IntoIter<CatalogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
