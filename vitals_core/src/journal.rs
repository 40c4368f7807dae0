//! JSON-lines journal backing the history interfaces on disk.
//!
//! Records are appended to `samples.jsonl` and `questionnaires.jsonl` with
//! file locking so concurrent CLI invocations cannot interleave lines.

use crate::repository::{window_start, QuestionnaireHistory, SensorHistory};
use crate::{QuestionnaireKind, QuestionnaireResponse, Result, Sample, UserId};
use chrono::Utc;
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Sink trait for persisting incoming records
pub trait HistorySink {
    /// Append a batch of samples; the batch is written under a single lock
    fn append_samples(&mut self, user_id: UserId, samples: &[Sample]) -> Result<()>;

    fn append_response(&mut self, response: &QuestionnaireResponse) -> Result<()>;
}

/// A sample tagged with its owner
#[derive(Debug, Serialize, Deserialize)]
struct SampleRecord {
    user_id: UserId,
    sample: Sample,
}

/// Journal rooted at a directory
#[derive(Clone, Debug)]
pub struct Journal {
    dir: PathBuf,
}

impl Journal {
    /// Create a journal for the given directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn samples_path(&self) -> PathBuf {
        self.dir.join("samples.jsonl")
    }

    pub fn questionnaires_path(&self) -> PathBuf {
        self.dir.join("questionnaires.jsonl")
    }
}

impl HistorySink for Journal {
    fn append_samples(&mut self, user_id: UserId, samples: &[Sample]) -> Result<()> {
        let records: Vec<SampleRecord> = samples
            .iter()
            .map(|sample| SampleRecord {
                user_id,
                sample: sample.clone(),
            })
            .collect();
        append_lines(&self.samples_path(), &records)?;
        tracing::debug!("Appended {} samples for user {}", records.len(), user_id);
        Ok(())
    }

    fn append_response(&mut self, response: &QuestionnaireResponse) -> Result<()> {
        append_lines(&self.questionnaires_path(), std::slice::from_ref(response))?;
        tracing::debug!("Appended questionnaire response {}", response.id);
        Ok(())
    }
}

impl SensorHistory for Journal {
    fn history(&self, user_id: UserId, days: Option<u32>) -> Result<Vec<Sample>> {
        let since = window_start(Utc::now(), days);
        let mut samples: Vec<Sample> = read_lines::<SampleRecord>(&self.samples_path())?
            .into_iter()
            .filter(|r| r.user_id == user_id && since.map_or(true, |s| r.sample.timestamp >= s))
            .map(|r| r.sample)
            .collect();
        samples.sort_by_key(|s| s.timestamp);
        Ok(samples)
    }
}

impl QuestionnaireHistory for Journal {
    fn questionnaire_history(
        &self,
        user_id: UserId,
        kind: Option<QuestionnaireKind>,
        days: Option<u32>,
    ) -> Result<Vec<QuestionnaireResponse>> {
        let since = window_start(Utc::now(), days);
        let mut responses: Vec<QuestionnaireResponse> =
            read_lines::<QuestionnaireResponse>(&self.questionnaires_path())?
                .into_iter()
                .filter(|r| {
                    r.user_id == user_id
                        && kind.map_or(true, |k| r.answers.kind() == k)
                        && since.map_or(true, |s| r.timestamp >= s)
                })
                .collect();
        responses.sort_by_key(|r| r.timestamp);
        Ok(responses)
    }
}

/// Append records as JSON lines under an exclusive lock
fn append_lines<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Serialize everything first so a bad record never leaves a partial batch
    let mut buffer = Vec::new();
    for record in records {
        serde_json::to_writer(&mut buffer, record)?;
        buffer.push(b'\n');
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;

    // Acquire exclusive lock
    file.lock_exclusive()?;

    let mut writer = std::io::BufWriter::new(&file);
    writer.write_all(&buffer)?;
    writer.flush()?;
    drop(writer);

    file.unlock()?;
    Ok(())
}

/// Read every parseable line; malformed lines are skipped with a warning
fn read_lines<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    // Acquire shared lock for reading
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut records = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<T>(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(
                    "Skipping malformed record in {:?} at line {}: {}",
                    path,
                    line_num + 1,
                    e
                );
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} records from {:?}", records.len(), path);
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Answers, GeneralAnswers, SampleSource, Vector3, WellbeingAnswers};
    use chrono::{DateTime, Duration};

    fn sample_at(timestamp: DateTime<Utc>, bpm: f64) -> Sample {
        Sample {
            timestamp,
            bpm: Some(bpm),
            hrv: Some(50.0),
            spo2: None,
            accel: Some(Vector3::new(0.0, 0.0, 9.81)),
            gyro: None,
            source: SampleSource::CsvImport,
        }
    }

    #[test]
    fn test_append_and_read_samples() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut journal = Journal::new(temp_dir.path());
        let now = Utc::now();

        journal
            .append_samples(1, &[sample_at(now, 70.0), sample_at(now, 71.0)])
            .unwrap();
        journal.append_samples(2, &[sample_at(now, 99.0)]).unwrap();

        let samples = journal.history(1, None).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].accel, Some(Vector3::new(0.0, 0.0, 9.81)));
        assert_eq!(journal.history(2, None).unwrap().len(), 1);
    }

    #[test]
    fn test_history_window() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut journal = Journal::new(temp_dir.path());
        let now = Utc::now();

        journal
            .append_samples(
                1,
                &[
                    sample_at(now - Duration::days(10), 60.0),
                    sample_at(now - Duration::hours(1), 65.0),
                ],
            )
            .unwrap();

        let recent = journal.history(1, Some(7)).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].bpm, Some(65.0));
    }

    #[test]
    fn test_read_missing_journal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let journal = Journal::new(temp_dir.path().join("nonexistent"));

        assert!(journal.history(1, None).unwrap().is_empty());
        assert!(journal
            .questionnaire_history(1, None, None)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_responses_roundtrip_and_filter() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut journal = Journal::new(temp_dir.path());
        let now = Utc::now();

        let general = QuestionnaireResponse::new(
            1,
            now - Duration::hours(2),
            Answers::General(GeneralAnswers {
                rpe: Some(6.0),
                duration_min: Some(50.0),
                ..Default::default()
            }),
        );
        let wellbeing = QuestionnaireResponse::new(
            1,
            now,
            Answers::Wellbeing(WellbeingAnswers {
                soreness: Some(2.0),
                energy: Some(7.0),
            }),
        );
        journal.append_response(&wellbeing).unwrap();
        journal.append_response(&general).unwrap();

        let all = journal.questionnaire_history(1, None, None).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, general.id);

        let only_general = journal
            .questionnaire_history(1, Some(QuestionnaireKind::General), Some(7))
            .unwrap();
        assert_eq!(only_general, vec![general]);
    }

    #[test]
    fn test_malformed_line_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut journal = Journal::new(temp_dir.path());
        journal
            .append_samples(1, &[sample_at(Utc::now(), 70.0)])
            .unwrap();

        let mut file = OpenOptions::new()
            .append(true)
            .open(journal.samples_path())
            .unwrap();
        writeln!(file, "{{ not json").unwrap();

        journal
            .append_samples(1, &[sample_at(Utc::now(), 72.0)])
            .unwrap();

        assert_eq!(journal.history(1, None).unwrap().len(), 2);
    }
}
