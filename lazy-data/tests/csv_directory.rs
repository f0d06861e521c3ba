use std::{fs, path::Path, time::Duration};

use chrono::{TimeZone, Utc};
use tempfile::TempDir;
use tsfile_index_core::{
    source::CsvTimeAxisReader, DateTokenStyle, IndexConfig, LocateError, LookupResult, Timestamp,
};
use tsfile_index_lazy_data::TimeSeriesIndex;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn at(d: u32, h: u32, m: u32) -> Timestamp {
    Utc.with_ymd_and_hms(2019, 1, d, h, m, 0).unwrap()
}

fn minutes(m: u64) -> Duration {
    Duration::from_secs(m * 60)
}

/// Writes a quarter-hourly axis for 08:00 to 08:30 of the day in `name`.
fn write_day(dir: &Path, name: &str, day: u32) {
    let contents = format!(
        "hours since 2019-01-{day:02} 00:00:00\n8.0\n8.25\n8.5\n"
    );
    fs::write(dir.join(name), contents).unwrap();
}

fn index(dir: &TempDir) -> TimeSeriesIndex<CsvTimeAxisReader> {
    let pattern = dir.path().join("eida50_*.csv");
    let config = IndexConfig::new(pattern.to_str().unwrap())
        .with_extension("csv")
        .with_date_token(DateTokenStyle::Underscored);
    TimeSeriesIndex::new(&config, CsvTimeAxisReader)
}

#[tokio::test]
async fn resolves_against_files_on_disk() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    write_day(dir.path(), "eida50_20190101.csv", 1);
    write_day(dir.path(), "eida50_20190115.csv", 15);

    let index = index(&dir);

    let found = index.resolve(at(1, 8, 16), minutes(7)).await.unwrap();
    assert_eq!(
        found,
        LookupResult::new(dir.path().join("eida50_20190101.csv"), 1)
    );

    let found = index.resolve(at(15, 8, 30), Duration::ZERO).await.unwrap();
    assert_eq!(
        found,
        LookupResult::new(dir.path().join("eida50_20190115.csv"), 2)
    );

    let found = index.resolve(at(1, 8, 8), minutes(7)).await.unwrap();
    assert_eq!(found.record_index, 1);
    assert!(matches!(
        index.resolve(at(1, 8, 8), minutes(6)).await,
        Err(LocateError::NoCandidateRecord { .. })
    ));

    let before = Utc.with_ymd_and_hms(2018, 12, 31, 0, 0, 0).unwrap();
    assert!(matches!(
        index.resolve(before, minutes(7)).await,
        Err(LocateError::NoCandidateFile { .. })
    ));

    assert_eq!(index.cache().reads(), 2);
    assert_eq!(
        index.most_recent_file().unwrap(),
        dir.path().join("eida50_20190115.csv")
    );
}

#[tokio::test]
async fn picks_up_new_files() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    write_day(dir.path(), "eida50_20190101.csv", 1);

    let index = index(&dir);
    let found = index.resolve(at(2, 8, 0), minutes(60 * 24)).await.unwrap();
    assert_eq!(found.path, dir.path().join("eida50_20190101.csv"));

    write_day(dir.path(), "eida50_20190102.csv", 2);
    let found = index.resolve(at(2, 8, 0), minutes(5)).await.unwrap();
    assert_eq!(found.path, dir.path().join("eida50_20190102.csv"));
    assert_eq!(found.record_index, 0);
}

#[tokio::test]
async fn unreadable_file_does_not_poison_the_cache() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("eida50_20190101.csv");
    fs::write(&path, "hours since 2019-01-01\nbroken\n").unwrap();

    let index = index(&dir);
    let err = index.resolve(at(1, 8, 0), minutes(5)).await.unwrap_err();
    assert!(matches!(err, LocateError::SourceUnavailable { .. }));
    assert!(!index.cache().contains(&path));

    write_day(dir.path(), "eida50_20190101.csv", 1);
    let found = index.resolve(at(1, 8, 0), minutes(5)).await.unwrap();
    assert_eq!(found.record_index, 0);
    assert!(index.cache().contains(&path));
}

#[tokio::test]
async fn misnamed_files_fail_the_lookup() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    write_day(dir.path(), "eida50_20190101.csv", 1);
    write_day(dir.path(), "eida50_latest.csv", 1);

    let index = index(&dir);
    assert!(matches!(
        index.resolve(at(1, 8, 0), minutes(5)).await,
        Err(LocateError::PatternMismatch { .. })
    ));
}
