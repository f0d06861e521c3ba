// #![warn(clippy::pedantic)]
// #![warn(clippy::nursery)]
// #![warn(clippy::cargo)]
#![warn(clippy::complexity)]
#![warn(clippy::correctness)]
#![warn(clippy::perf)]
#![warn(clippy::style)]
#![warn(clippy::suspicious)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]

// #![warn(clippy::unwrap_used)]
// #![warn(clippy::expect_used)]

//! Locating records inside directories of date-stamped time-series files.
//!
//! The building blocks live here, the caching composition root lives in
//! `tsfile-index-lazy-data`.

pub mod axis;
pub mod catalog;
pub mod config;
pub mod error;
pub mod formats;
pub mod locate;
pub mod source;

pub use axis::{RawTimeAxis, TimeAxis};
pub use catalog::{Catalog, CatalogEntry};
pub use config::IndexConfig;
pub use error::{LocateError, SourceError};
pub use formats::date_stamp::{DateTokenStyle, PathDateParser};
pub use locate::LookupResult;

/// An absolute point in time. Everything in this crate is UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
