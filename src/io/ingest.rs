//! CSV ingestion of meter readings.
//!
//! Expected header: `unitId,date,kwh,gridIntensity`. Dates are RFC 3339 or
//! `YYYY-MM-DD` (midnight UTC).

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;

use crate::config::InputPolicy;
use crate::error::IngestError;
use crate::model::EnergyReading;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CsvReading {
    unit_id: String,
    date: String,
    kwh: f64,
    grid_intensity: f64,
}

/// Parses an RFC 3339 timestamp or a bare `YYYY-MM-DD` date.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
}

fn check(line: u64, field: &'static str, value: f64) -> Result<(), IngestError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(IngestError::OutOfRange { line, field, value })
    }
}

/// Reads readings from CSV, computing emissions per row.
///
/// # Arguments
///
/// * `reader` - CSV source with a header row
/// * `policy` - Whether out-of-range consumption or intensity fails the load
///
/// # Errors
///
/// Returns the first malformed row, unparseable date, or (under
/// [`InputPolicy::Reject`]) out-of-range value, with its line number.
pub fn read_readings(
    reader: impl Read,
    policy: InputPolicy,
) -> Result<Vec<EnergyReading>, IngestError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = rdr
        .headers()
        .cloned()
        .map_err(|source| IngestError::Csv { line: 1, source })?;

    let mut readings = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|source| IngestError::Csv {
            line: source.position().map_or(0, csv::Position::line),
            source,
        })?;
        let line = record.position().map_or(0, csv::Position::line);
        let row: CsvReading = record
            .deserialize(Some(&headers))
            .map_err(|source| IngestError::Csv { line, source })?;

        let timestamp = parse_timestamp(&row.date).ok_or_else(|| IngestError::Date {
            line,
            value: row.date.clone(),
        })?;
        if policy == InputPolicy::Reject {
            check(line, "kwh", row.kwh)?;
            check(line, "gridIntensity", row.grid_intensity)?;
        }
        readings.push(EnergyReading::new(
            row.unit_id,
            timestamp,
            row.kwh,
            row.grid_intensity,
        ));
    }
    Ok(readings)
}

/// Loads readings from a CSV file.
///
/// # Errors
///
/// Returns `IngestError::Io` if the file cannot be opened, otherwise as
/// [`read_readings`].
pub fn load_readings_csv(path: &Path, policy: InputPolicy) -> Result<Vec<EnergyReading>, IngestError> {
    let file = File::open(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_readings(BufReader::new(file), policy)
}
