use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use winnow::{
    character::{alpha1, space1},
    IResult, Parser,
};

use crate::Timestamp;

/// Offsets beyond this many milliseconds (roughly three million years) are
/// rejected instead of overflowing the timestamp arithmetic.
const MAX_OFFSET_MILLIS: f64 = 1e17;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Malformed time units '{0}' (expected '<unit> since <epoch>')")]
    Malformed(String),
    #[error("Unknown time unit '{0}'")]
    UnknownUnit(String),
    #[error("Invalid epoch '{0}'")]
    InvalidEpoch(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    Days,
    Hours,
    Minutes,
    Seconds,
    Milliseconds,
}

impl TimeUnit {
    pub fn from_name(name: &str) -> Option<Self> {
        let unit = match name.to_ascii_lowercase().as_str() {
            "days" | "day" | "d" => Self::Days,
            "hours" | "hour" | "hrs" | "hr" | "h" => Self::Hours,
            "minutes" | "minute" | "mins" | "min" => Self::Minutes,
            "seconds" | "second" | "secs" | "sec" | "s" => Self::Seconds,
            "milliseconds" | "millisecond" | "msecs" | "msec" | "ms" => Self::Milliseconds,
            _ => return None,
        };
        Some(unit)
    }

    pub fn millis(self) -> f64 {
        match self {
            Self::Days => 86_400_000.0,
            Self::Hours => 3_600_000.0,
            Self::Minutes => 60_000.0,
            Self::Seconds => 1_000.0,
            Self::Milliseconds => 1.0,
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Days => "days",
            Self::Hours => "hours",
            Self::Minutes => "minutes",
            Self::Seconds => "seconds",
            Self::Milliseconds => "milliseconds",
        };
        f.write_str(name)
    }
}

/// A `"<unit> since <epoch>"` description of a numeric time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeUnits {
    pub unit: TimeUnit,
    pub epoch: Timestamp,
}

impl TimeUnits {
    pub fn new(unit: TimeUnit, epoch: Timestamp) -> Self {
        Self { unit, epoch }
    }

    pub fn parse(units: &str) -> Result<Self, Error> {
        let malformed = || Error::Malformed(units.to_string());

        let (epoch, (unit, since)) = header(units.trim()).map_err(|_| malformed())?;
        if !since.eq_ignore_ascii_case("since") {
            return Err(malformed());
        }

        let unit = TimeUnit::from_name(unit).ok_or_else(|| Error::UnknownUnit(unit.to_string()))?;
        let epoch = parse_epoch(epoch).ok_or_else(|| Error::InvalidEpoch(epoch.to_string()))?;

        Ok(Self { unit, epoch })
    }

    /// Converts a numeric offset into an absolute timestamp, at millisecond resolution.
    ///
    /// Returns `None` for offsets that are not finite or too large to represent.
    pub fn to_timestamp(&self, offset: f64) -> Option<Timestamp> {
        let millis = offset * self.unit.millis();
        if !millis.is_finite() || millis.abs() > MAX_OFFSET_MILLIS {
            return None;
        }
        self.epoch
            .checked_add_signed(Duration::milliseconds(millis.round() as i64))
    }
}

impl fmt::Display for TimeUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} since {}",
            self.unit,
            self.epoch.format("%Y-%m-%d %H:%M:%S")
        )
    }
}

/// `<unit> <since> <rest>`, the rest being the epoch.
fn header(input: &str) -> IResult<&str, (&str, &str)> {
    (alpha1, space1, alpha1, space1)
        .map(|(unit, _, since, _)| (unit, since))
        .parse_next(input)
}

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

fn parse_epoch(epoch: &str) -> Option<Timestamp> {
    let epoch = epoch.trim();
    let epoch = ["UTC", "Z", "+00:00", "+0000", "+00"]
        .iter()
        .find_map(|suffix| epoch.strip_suffix(suffix))
        .unwrap_or(epoch)
        .trim_end();

    let naive = DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(epoch, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(epoch, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })?;

    Some(Utc.from_utc_datetime(&naive))
}
