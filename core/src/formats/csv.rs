use std::io::Read;

use crate::{axis::RawTimeAxis, error::SourceError};

/// Reads a time axis stored as CSV.
///
/// The first line holds the units (`hours since 1970-01-01 00:00:00`), every
/// following line holds one offset in its first column. Further columns are
/// ignored, so the axis can sit in front of the data it describes.
pub fn read_time_axis(rdr: impl Read) -> Result<RawTimeAxis, SourceError> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        // Rows may carry any number of trailing columns
        .flexible(true)
        .from_reader(rdr);

    let mut rdr = rdr.into_records();

    let units = match rdr.next() {
        Some(val) => val?,
        None => return Err(SourceError::MissingUnits),
    };
    let units = match units.get(0) {
        Some(units) if !units.is_empty() => units.to_string(),
        _ => return Err(SourceError::MissingUnits),
    };

    let mut offsets = Vec::new();
    for (i, record) in rdr.enumerate() {
        let record = record?;
        let Some(value) = record.get(0).filter(|x| !x.is_empty()) else {
            continue;
        };
        let offset = value
            .parse::<f64>()
            .map_err(|source| SourceError::InvalidOffset { line: i + 2, source })?;
        offsets.push(offset);
    }

    Ok(RawTimeAxis::new(offsets, units))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_parsing() {
        let axis = read_time_axis(
            r#"hours since 2019-01-01 00:00:00
        8.0
        8.25, 1.0, 2.0
        8.5E+0
        "#
            .as_bytes(),
        )
        .unwrap();

        assert_eq!(axis.units, "hours since 2019-01-01 00:00:00");
        assert_eq!(axis.offsets, [8.0, 8.25, 8.5]);
    }

    #[test]
    fn empty_axis() {
        let axis = read_time_axis("seconds since 2019-01-01".as_bytes()).unwrap();
        assert!(axis.offsets.is_empty());
    }

    #[test]
    fn missing_units() {
        assert!(matches!(
            read_time_axis("".as_bytes()),
            Err(SourceError::MissingUnits)
        ));
        assert!(matches!(
            read_time_axis(",1.0\n2.0".as_bytes()),
            Err(SourceError::MissingUnits)
        ));
    }

    #[test]
    fn invalid_offset_reports_line() {
        let err = read_time_axis("hours since 2019-01-01\n1.0\nnoon\n".as_bytes()).unwrap_err();
        match err {
            SourceError::InvalidOffset { line, .. } => assert_eq!(line, 3),
            other => panic!("Expected an invalid offset, got: {other:?}"),
        }
    }
}
