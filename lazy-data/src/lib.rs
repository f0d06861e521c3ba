#![warn(clippy::complexity)]
#![warn(clippy::correctness)]
#![warn(clippy::perf)]
#![warn(clippy::style)]
#![warn(clippy::suspicious)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]

pub mod axis_cache;
pub mod cached;
pub mod index;

pub use axis_cache::{CacheStats, TimeAxisCache};
pub use index::TimeSeriesIndex;
