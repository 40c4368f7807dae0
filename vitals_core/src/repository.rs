//! History interfaces consumed by the analytics, plus an in-memory store.
//!
//! Analytics never open storage themselves; they are handed something that
//! implements these traits (a [`crate::journal::Journal`] on disk, or a
//! [`MemoryStore`] in tests).

use crate::{QuestionnaireKind, QuestionnaireResponse, Result, Sample, UserId};
use chrono::{DateTime, Duration, Utc};

/// Sensor history for a user
pub trait SensorHistory {
    /// Samples ordered by timestamp ascending, optionally limited to the
    /// trailing `days`
    fn history(&self, user_id: UserId, days: Option<u32>) -> Result<Vec<Sample>>;
}

/// Questionnaire history for a user
pub trait QuestionnaireHistory {
    /// Responses ordered by timestamp ascending, optionally restricted to one
    /// questionnaire and to the trailing `days`
    fn questionnaire_history(
        &self,
        user_id: UserId,
        kind: Option<QuestionnaireKind>,
        days: Option<u32>,
    ) -> Result<Vec<QuestionnaireResponse>>;
}

/// Start of a trailing window ending at `now`.
///
/// A window reaching past the earliest representable instant covers all
/// history.
pub fn window_start(now: DateTime<Utc>, days: Option<u32>) -> Option<DateTime<Utc>> {
    days.map(|d| {
        now.checked_sub_signed(Duration::days(i64::from(d)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    })
}

/// In-memory history, mainly for tests and fixtures
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    samples: Vec<(UserId, Sample)>,
    responses: Vec<QuestionnaireResponse>,
    now: Option<DateTime<Utc>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin "now" so trailing windows are deterministic
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    pub fn push_sample(&mut self, user_id: UserId, sample: Sample) {
        self.samples.push((user_id, sample));
    }

    pub fn push_response(&mut self, response: QuestionnaireResponse) {
        self.responses.push(response);
    }

    fn now(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }
}

impl SensorHistory for MemoryStore {
    fn history(&self, user_id: UserId, days: Option<u32>) -> Result<Vec<Sample>> {
        let since = window_start(self.now(), days);
        let mut samples: Vec<Sample> = self
            .samples
            .iter()
            .filter(|(user, sample)| {
                *user == user_id && since.map_or(true, |s| sample.timestamp >= s)
            })
            .map(|(_, sample)| sample.clone())
            .collect();
        samples.sort_by_key(|s| s.timestamp);
        Ok(samples)
    }
}

impl QuestionnaireHistory for MemoryStore {
    fn questionnaire_history(
        &self,
        user_id: UserId,
        kind: Option<QuestionnaireKind>,
        days: Option<u32>,
    ) -> Result<Vec<QuestionnaireResponse>> {
        let since = window_start(self.now(), days);
        let mut responses: Vec<QuestionnaireResponse> = self
            .responses
            .iter()
            .filter(|r| {
                r.user_id == user_id
                    && kind.map_or(true, |k| r.answers.kind() == k)
                    && since.map_or(true, |s| r.timestamp >= s)
            })
            .cloned()
            .collect();
        responses.sort_by_key(|r| r.timestamp);
        Ok(responses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Answers, GeneralAnswers, SampleSource, SleepAnswers};

    fn sample_at(timestamp: DateTime<Utc>, bpm: f64) -> Sample {
        Sample {
            timestamp,
            bpm: Some(bpm),
            hrv: None,
            spo2: None,
            accel: None,
            gyro: None,
            source: SampleSource::Simulated,
        }
    }

    #[test]
    fn test_history_filters_user_and_window() {
        let now = Utc::now();
        let mut store = MemoryStore::new().with_now(now);
        store.push_sample(1, sample_at(now - Duration::days(1), 70.0));
        store.push_sample(1, sample_at(now - Duration::days(10), 80.0));
        store.push_sample(2, sample_at(now - Duration::days(1), 90.0));

        assert_eq!(store.history(1, None).unwrap().len(), 2);
        let recent = store.history(1, Some(7)).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].bpm, Some(70.0));
    }

    #[test]
    fn test_history_is_time_ordered() {
        let now = Utc::now();
        let mut store = MemoryStore::new().with_now(now);
        store.push_sample(1, sample_at(now, 72.0));
        store.push_sample(1, sample_at(now - Duration::hours(1), 70.0));

        let samples = store.history(1, None).unwrap();
        assert_eq!(samples[0].bpm, Some(70.0));
        assert_eq!(samples[1].bpm, Some(72.0));
    }

    #[test]
    fn test_questionnaire_history_filters_kind() {
        let now = Utc::now();
        let mut store = MemoryStore::new().with_now(now);
        store.push_response(QuestionnaireResponse::new(
            1,
            now,
            Answers::General(GeneralAnswers::default()),
        ));
        store.push_response(QuestionnaireResponse::new(
            1,
            now,
            Answers::Sleep(SleepAnswers::default()),
        ));

        assert_eq!(store.questionnaire_history(1, None, None).unwrap().len(), 2);
        let general = store
            .questionnaire_history(1, Some(QuestionnaireKind::General), None)
            .unwrap();
        assert_eq!(general.len(), 1);
        assert_eq!(general[0].answers.kind(), QuestionnaireKind::General);
    }

    #[test]
    fn test_huge_window_covers_all_history() {
        let now = Utc::now();
        assert_eq!(
            window_start(now, Some(u32::MAX)),
            Some(DateTime::<Utc>::MIN_UTC)
        );

        let mut store = MemoryStore::new().with_now(now);
        store.push_sample(1, sample_at(now - Duration::days(3650), 60.0));
        store.push_sample(1, sample_at(now, 70.0));
        assert_eq!(store.history(1, Some(u32::MAX)).unwrap().len(), 2);
    }
}
