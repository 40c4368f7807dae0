//! Per-user CSV export of questionnaire and sensor history.
//!
//! Questionnaire rows come first, then sensor rows; the `type` column tells
//! them apart. The file is written to a temp file and renamed into place.

use crate::repository::{QuestionnaireHistory, SensorHistory};
use crate::{Answers, Error, QuestionnaireResponse, Result, Sample, SampleSource, UserId};
use std::path::Path;
use tempfile::NamedTempFile;

const HEADERS: [&str; 21] = [
    "type",
    "timestamp",
    "questionnaire_id",
    "fatiga",
    "suenio",
    "rpe",
    "duracion_min",
    "dolor",
    "energia",
    "horas",
    "calidad",
    "bpm",
    "hrv",
    "spo2",
    "accel_x",
    "accel_y",
    "accel_z",
    "gyro_x",
    "gyro_y",
    "gyro_z",
    "source",
];

/// A row in the CSV output; field order matches `HEADERS`
#[derive(Debug, Default, serde::Serialize)]
struct ExportRow {
    kind: &'static str,
    timestamp: String,
    questionnaire_id: Option<&'static str>,
    fatigue: Option<f64>,
    sleep_hours: Option<f64>,
    rpe: Option<f64>,
    duration_min: Option<f64>,
    soreness: Option<f64>,
    energy: Option<f64>,
    hours: Option<f64>,
    quality: Option<f64>,
    bpm: Option<f64>,
    hrv: Option<f64>,
    spo2: Option<f64>,
    accel_x: Option<f64>,
    accel_y: Option<f64>,
    accel_z: Option<f64>,
    gyro_x: Option<f64>,
    gyro_y: Option<f64>,
    gyro_z: Option<f64>,
    source: Option<String>,
}

impl From<&QuestionnaireResponse> for ExportRow {
    fn from(response: &QuestionnaireResponse) -> Self {
        let mut row = ExportRow {
            kind: "questionnaire",
            timestamp: response.timestamp.to_rfc3339(),
            questionnaire_id: Some(response.answers.kind().id()),
            ..Default::default()
        };

        match &response.answers {
            Answers::General(a) => {
                row.fatigue = a.fatigue;
                row.sleep_hours = a.sleep_hours;
                row.rpe = a.rpe;
                row.duration_min = a.duration_min;
            }
            Answers::Wellbeing(a) => {
                row.soreness = a.soreness;
                row.energy = a.energy;
            }
            Answers::Sleep(a) => {
                row.hours = a.hours;
                row.quality = a.quality;
            }
        }
        row
    }
}

impl From<&Sample> for ExportRow {
    fn from(sample: &Sample) -> Self {
        ExportRow {
            kind: "sensor",
            timestamp: sample.timestamp.to_rfc3339(),
            bpm: sample.bpm,
            hrv: sample.hrv,
            spo2: sample.spo2,
            accel_x: sample.accel.map(|a| a.x),
            accel_y: sample.accel.map(|a| a.y),
            accel_z: sample.accel.map(|a| a.z),
            gyro_x: sample.gyro.map(|g| g.x),
            gyro_y: sample.gyro.map(|g| g.y),
            gyro_z: sample.gyro.map(|g| g.z),
            source: Some(source_label(&sample.source).to_string()),
            ..Default::default()
        }
    }
}

/// Short label for a sample source
pub fn source_label(source: &SampleSource) -> &str {
    match source {
        SampleSource::Simulated => "simulated",
        SampleSource::CsvImport => "csv_import",
        SampleSource::Device(name) => name,
    }
}

/// Export all history for `user_id` to `path`, returning the row count
pub fn export_user_data<H>(history: &H, user_id: UserId, path: &Path) -> Result<usize>
where
    H: SensorHistory + QuestionnaireHistory + ?Sized,
{
    let responses = history.questionnaire_history(user_id, None, None)?;
    let samples = history.history(user_id, None)?;

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    // Temp file in the target directory so the final rename stays atomic
    let temp = NamedTempFile::new_in(parent)?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(temp.as_file());
    writer.write_record(HEADERS)?;

    for response in &responses {
        writer.serialize(ExportRow::from(response))?;
    }
    for sample in &samples {
        writer.serialize(ExportRow::from(sample))?;
    }

    writer.flush()?;
    drop(writer);
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    let rows = responses.len() + samples.len();
    tracing::info!(
        "Exported {} rows for user {} to {:?}",
        rows,
        user_id,
        path
    );
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryStore;
    use crate::{GeneralAnswers, Vector3};
    use chrono::{Duration, Utc};

    fn store_with_data() -> MemoryStore {
        let now = Utc::now();
        let mut store = MemoryStore::new().with_now(now);
        store.push_response(QuestionnaireResponse::new(
            3,
            now - Duration::hours(1),
            Answers::General(GeneralAnswers {
                fatigue: Some(4.0),
                rpe: Some(6.0),
                duration_min: Some(40.0),
                ..Default::default()
            }),
        ));
        store.push_sample(
            3,
            Sample {
                timestamp: now,
                bpm: Some(72.0),
                hrv: Some(48.0),
                spo2: None,
                accel: Some(Vector3::new(0.1, 0.2, 9.8)),
                gyro: None,
                source: SampleSource::Device("band".into()),
            },
        );
        store
    }

    #[test]
    fn test_export_writes_both_row_types() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("export_user_3.csv");

        let rows = export_user_data(&store_with_data(), 3, &path).unwrap();
        assert_eq!(rows, 2);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), HEADERS.to_vec());

        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(&records[0][0], "questionnaire");
        assert_eq!(&records[0][2], "general");
        assert_eq!(&records[0][5], "6.0");
        assert_eq!(&records[1][0], "sensor");
        assert_eq!(&records[1][11], "72.0");
        assert_eq!(&records[1][5], "");
        assert_eq!(&records[1][20], "band");
    }

    #[test]
    fn test_export_leaves_no_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("out.csv");

        export_user_data(&MemoryStore::new(), 1, &path).unwrap();

        let entries: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("out.csv")]);
    }

    #[test]
    fn test_source_label() {
        assert_eq!(source_label(&SampleSource::CsvImport), "csv_import");
        assert_eq!(source_label(&SampleSource::Device("band".into())), "band");
    }
}
