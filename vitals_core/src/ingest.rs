//! CSV ingestion of sensor batches and ECG waveforms.
//!
//! Batches are validated all-or-nothing: a missing required column or a
//! single unusable required cell rejects the whole file, so a partial import
//! never reaches the analyzers or the journal.

use crate::{AxisColumns, EcgWaveform, Error, Result, Sample, SampleSource, Vector3};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// Columns every sensor import must carry
pub const SENSOR_COLUMNS: [&str; 6] = ["timestamp", "bpm", "hrv", "accel_x", "accel_y", "accel_z"];

/// Columns every ECG import must carry
pub const ECG_COLUMNS: [&str; 2] = ["Time", "ECG"];

const GYRO_COLUMNS: [&str; 3] = ["gyro_x", "gyro_y", "gyro_z"];
const AXIS_COLUMNS: [&str; 3] = ["accel_x", "accel_y", "accel_z"];

/// Header name to column position
struct Columns {
    index: HashMap<String, usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Self {
        let index = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.to_string(), i))
            .collect();
        Self { index }
    }

    fn get(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Positions of `required`, or every absent name at once
    fn require<const N: usize>(&self, required: [&str; N]) -> Result<[usize; N]> {
        let missing: Vec<String> = required
            .iter()
            .filter(|name| !self.index.contains_key(**name))
            .map(|name| name.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(Error::MissingColumns(missing));
        }

        let mut positions = [0; N];
        for (slot, name) in positions.iter_mut().zip(required.iter()) {
            *slot = self.index[*name];
        }
        Ok(positions)
    }
}

fn reader_for<R: Read>(input: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(input)
}

fn cell<'a>(record: &'a StringRecord, column: usize) -> &'a str {
    record.get(column).unwrap_or("")
}

fn parse_number(record: &StringRecord, column: usize, name: &str, row: usize) -> Result<f64> {
    let raw = cell(record, column);
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(Error::InvalidNumeric {
            field: format!("{} (row {})", name, row),
            value: raw.to_string(),
        }),
    }
}

fn parse_optional_number(
    record: &StringRecord,
    column: Option<usize>,
    name: &str,
    row: usize,
) -> Result<Option<f64>> {
    match column {
        Some(column) if !cell(record, column).is_empty() => {
            parse_number(record, column, name, row).map(Some)
        }
        _ => Ok(None),
    }
}

/// Parse an RFC 3339 or `YYYY-MM-DD HH:MM:SS[.fff]` timestamp (naive means UTC)
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Read a sensor batch (`timestamp,bpm,hrv,accel_x,accel_y,accel_z`, with
/// optional `spo2` and `gyro_x,gyro_y,gyro_z`).
///
/// Samples are returned sorted by timestamp.
pub fn read_sensor_csv<R: Read>(input: R) -> Result<Vec<Sample>> {
    let mut reader = reader_for(input);
    let columns = Columns::from_headers(reader.headers()?);
    let [ts_col, bpm_col, hrv_col, ax_col, ay_col, az_col] = columns.require(SENSOR_COLUMNS)?;
    let spo2_col = columns.get("spo2");
    let gyro_cols = columns.require(GYRO_COLUMNS).ok();

    let mut samples = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let row = i + 1;

        let raw_ts = cell(&record, ts_col);
        let timestamp = parse_timestamp(raw_ts).ok_or_else(|| Error::InvalidTimestamp {
            row,
            value: raw_ts.to_string(),
        })?;

        let accel = Vector3::new(
            parse_number(&record, ax_col, "accel_x", row)?,
            parse_number(&record, ay_col, "accel_y", row)?,
            parse_number(&record, az_col, "accel_z", row)?,
        );

        let gyro = match gyro_cols {
            Some([gx, gy, gz]) => {
                let x = parse_optional_number(&record, Some(gx), "gyro_x", row)?;
                let y = parse_optional_number(&record, Some(gy), "gyro_y", row)?;
                let z = parse_optional_number(&record, Some(gz), "gyro_z", row)?;
                match (x, y, z) {
                    (Some(x), Some(y), Some(z)) => Some(Vector3::new(x, y, z)),
                    _ => None,
                }
            }
            None => None,
        };

        samples.push(Sample {
            timestamp,
            bpm: Some(parse_number(&record, bpm_col, "bpm", row)?),
            hrv: Some(parse_number(&record, hrv_col, "hrv", row)?),
            spo2: parse_optional_number(&record, spo2_col, "spo2", row)?,
            accel: Some(accel),
            gyro,
            source: SampleSource::CsvImport,
        });
    }

    if samples.windows(2).any(|w| w[0].timestamp > w[1].timestamp) {
        tracing::debug!("Sensor batch out of order, sorting by timestamp");
        samples.sort_by_key(|s| s.timestamp);
    }

    tracing::info!("Parsed {} sensor samples", samples.len());
    Ok(samples)
}

/// Read a sensor batch from a file
pub fn read_sensor_csv_path(path: &Path) -> Result<Vec<Sample>> {
    read_sensor_csv(std::fs::File::open(path)?)
}

/// Read an ECG waveform (`Time,ECG`) recorded at `sample_rate_hz`
pub fn read_ecg_csv<R: Read>(input: R, sample_rate_hz: f64) -> Result<EcgWaveform> {
    let mut reader = reader_for(input);
    let columns = Columns::from_headers(reader.headers()?);
    let [_, ecg_col] = columns.require(ECG_COLUMNS)?;

    let mut amplitudes = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        amplitudes.push(parse_number(&record, ecg_col, "ECG", i + 1)?);
    }

    tracing::info!(
        "Parsed ECG waveform: {} samples at {} Hz",
        amplitudes.len(),
        sample_rate_hz
    );

    Ok(EcgWaveform {
        sample_rate_hz,
        amplitudes,
    })
}

/// Read an ECG waveform from a file
pub fn read_ecg_csv_path(path: &Path, sample_rate_hz: f64) -> Result<EcgWaveform> {
    read_ecg_csv(std::fs::File::open(path)?, sample_rate_hz)
}

/// Read whichever acceleration columns are present.
///
/// Absent axes stay `None`; the motion analyzer decides whether that is fatal.
pub fn read_axes_csv<R: Read>(input: R) -> Result<AxisColumns> {
    let mut reader = reader_for(input);
    let columns = Columns::from_headers(reader.headers()?);
    let positions = AXIS_COLUMNS.map(|name| columns.get(name));

    let mut values: [Option<Vec<f64>>; 3] = positions.map(|p| p.map(|_| Vec::new()));
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        for ((position, axis), name) in positions.iter().zip(values.iter_mut()).zip(AXIS_COLUMNS) {
            if let (Some(column), Some(axis)) = (position, axis.as_mut()) {
                axis.push(parse_number(&record, *column, name, i + 1)?);
            }
        }
    }

    let [x, y, z] = values;
    Ok(AxisColumns { x, y, z })
}

/// Read acceleration columns from a file
pub fn read_axes_csv_path(path: &Path) -> Result<AxisColumns> {
    read_axes_csv(std::fs::File::open(path)?)
}
