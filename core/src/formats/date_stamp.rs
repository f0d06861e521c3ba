use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::LocateError;

/// Width of the `YYYYMMDD` token.
const TOKEN_LEN: usize = 8;

/// Which characters may precede the date token in a file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateTokenStyle {
    /// `YYYYMMDD.ext`, preceded by anything except another digit
    /// (so `_YYYYMMDD.ext` matches as well).
    #[default]
    Bare,
    /// `_YYYYMMDD.ext` only.
    Underscored,
}

/// Extracts the calendar date embedded in a file name.
///
/// Only the 8-digit token directly in front of the extension of the final
/// path segment is considered. Digits in directory names or elsewhere in the
/// file name are never looked at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathDateParser {
    extension: String,
    style: DateTokenStyle,
}

impl PathDateParser {
    pub fn new(extension: impl Into<String>, style: DateTokenStyle) -> Self {
        let extension = extension.into();
        let extension = extension.trim_start_matches('.').to_string();
        Self { extension, style }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn style(&self) -> DateTokenStyle {
        self.style
    }

    /// Human readable form of the accepted file name suffix, e.g. `_YYYYMMDD.nc`.
    pub fn expected(&self) -> String {
        match self.style {
            DateTokenStyle::Bare => format!("YYYYMMDD.{}", self.extension),
            DateTokenStyle::Underscored => format!("_YYYYMMDD.{}", self.extension),
        }
    }

    pub fn parse(&self, path: &Path) -> Result<NaiveDate, LocateError> {
        self.try_parse(path).ok_or_else(|| LocateError::PatternMismatch {
            path: path.to_path_buf(),
            expected: self.expected(),
        })
    }

    fn try_parse(&self, path: &Path) -> Option<NaiveDate> {
        let file_name = path.file_name()?.to_str()?;
        let stem = file_name
            .strip_suffix(self.extension.as_str())?
            .strip_suffix('.')?;

        let split = stem.len().checked_sub(TOKEN_LEN)?;
        let token = stem.as_bytes().get(split..)?;
        if !token.iter().all(u8::is_ascii_digit) {
            return None;
        }

        // `split` is a char boundary, the token is pure ASCII.
        let prefix = &stem[..split];
        let token = &stem[split..];

        let valid_prefix = match self.style {
            DateTokenStyle::Bare => !prefix.ends_with(|c: char| c.is_ascii_digit()),
            DateTokenStyle::Underscored => prefix.ends_with('_'),
        };
        if !valid_prefix {
            return None;
        }

        let year = token[0..4].parse().ok()?;
        let month = token[4..6].parse().ok()?;
        let day = token[6..8].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    }
}

impl Default for PathDateParser {
    fn default() -> Self {
        Self::new("nc", DateTokenStyle::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn bare_token() {
        let parser = PathDateParser::default();
        assert_eq!(
            parser.parse(Path::new("/data/EIDA50_takm4p4_20190101.nc")).unwrap(),
            date(2019, 1, 1)
        );
        assert_eq!(
            parser.parse(Path::new("eida20190115.nc")).unwrap(),
            date(2019, 1, 15)
        );
        assert_eq!(
            parser.parse(Path::new("20200229.nc")).unwrap(),
            date(2020, 2, 29)
        );
    }

    #[test]
    fn underscored_token() {
        let parser = PathDateParser::new(".nc", DateTokenStyle::Underscored);
        assert_eq!(parser.extension(), "nc");
        assert_eq!(
            parser.parse(Path::new("file_20190101.nc")).unwrap(),
            date(2019, 1, 1)
        );
        assert!(matches!(
            parser.parse(Path::new("file20190101.nc")),
            Err(LocateError::PatternMismatch { .. })
        ));
    }

    #[test]
    fn only_the_final_segment_counts() {
        let parser = PathDateParser::default();
        assert!(parser
            .parse(Path::new("/archive/20190101.nc/readme.nc"))
            .is_err());
        assert_eq!(
            parser
                .parse(Path::new("/archive/20180101/sat_20190101.nc"))
                .unwrap(),
            date(2019, 1, 1)
        );
    }

    #[test]
    fn rejects_other_numbers() {
        let parser = PathDateParser::default();
        // Nine digits: the token is not a standalone date.
        assert!(parser.parse(Path::new("run_120190101.nc")).is_err());
        // Digits not directly in front of the extension.
        assert!(parser.parse(Path::new("20190101_run.nc")).is_err());
        // Too short.
        assert!(parser.parse(Path::new("run_2019011.nc")).is_err());
        assert!(parser.parse(Path::new("nc")).is_err());
    }

    #[test]
    fn rejects_wrong_extension() {
        let parser = PathDateParser::default();
        assert!(parser.parse(Path::new("sat_20190101.csv")).is_err());
        assert!(parser.parse(Path::new("sat_20190101nc")).is_err());
        assert!(parser.parse(Path::new("sat_20190101.nc.bak")).is_err());
    }

    #[test]
    fn rejects_impossible_dates() {
        let parser = PathDateParser::default();
        assert!(parser.parse(Path::new("sat_20191301.nc")).is_err());
        assert!(parser.parse(Path::new("sat_20190230.nc")).is_err());
    }

    #[test]
    fn mismatch_names_the_contract() {
        let parser = PathDateParser::new("csv", DateTokenStyle::Underscored);
        match parser.parse(Path::new("bad.csv")) {
            Err(LocateError::PatternMismatch { path, expected }) => {
                assert_eq!(path, Path::new("bad.csv"));
                assert_eq!(expected, "_YYYYMMDD.csv");
            }
            other => panic!("Expected a pattern mismatch, got: {other:?}"),
        }
    }
}
