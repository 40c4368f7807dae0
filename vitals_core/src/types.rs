//! Core domain types for the vitals analytics engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - Sensor samples and raw waveforms
//! - Questionnaire responses with a typed answer set per questionnaire
//! - Derived outputs (training load points, risk states)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier of an athlete, as assigned by the account system
pub type UserId = u64;

// ============================================================================
// Sensor Types
// ============================================================================

/// A tri-axial reading (accelerometer or gyroscope)
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean norm
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// Where a sample came from
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SampleSource {
    Simulated,
    CsvImport,
    Device(String),
}

/// One sensor reading. Streams are ordered by timestamp, non-decreasing.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub bpm: Option<f64>,
    pub hrv: Option<f64>,
    pub spo2: Option<f64>,
    pub accel: Option<Vector3>,
    pub gyro: Option<Vector3>,
    pub source: SampleSource,
}

/// ECG amplitudes sampled at a fixed rate
#[derive(Clone, Debug, PartialEq)]
pub struct EcgWaveform {
    pub sample_rate_hz: f64,
    pub amplitudes: Vec<f64>,
}

/// Raw acceleration columns; an axis is `None` when the source lacks it
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AxisColumns {
    pub x: Option<Vec<f64>>,
    pub y: Option<Vec<f64>>,
    pub z: Option<Vec<f64>>,
}

// ============================================================================
// Questionnaire Types
// ============================================================================

/// Questionnaire types known to the system
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum QuestionnaireKind {
    #[serde(rename = "general")]
    General,
    #[serde(rename = "bienestar")]
    Wellbeing,
    #[serde(rename = "sueno")]
    Sleep,
}

impl QuestionnaireKind {
    pub fn all() -> &'static [QuestionnaireKind] {
        &[
            QuestionnaireKind::General,
            QuestionnaireKind::Wellbeing,
            QuestionnaireKind::Sleep,
        ]
    }

    /// Identifier used in stored records and exports
    pub fn id(&self) -> &'static str {
        match self {
            QuestionnaireKind::General => "general",
            QuestionnaireKind::Wellbeing => "bienestar",
            QuestionnaireKind::Sleep => "sueno",
        }
    }
}

impl fmt::Display for QuestionnaireKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for QuestionnaireKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "general" => Ok(QuestionnaireKind::General),
            "bienestar" | "wellbeing" => Ok(QuestionnaireKind::Wellbeing),
            "sueno" | "sleep" => Ok(QuestionnaireKind::Sleep),
            other => Err(crate::Error::Other(format!(
                "Unknown questionnaire: {}",
                other
            ))),
        }
    }
}

/// Answers to the general self-perception questionnaire
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct GeneralAnswers {
    #[serde(rename = "fatiga")]
    pub fatigue: Option<f64>,
    #[serde(rename = "suenio")]
    pub sleep_hours: Option<f64>,
    pub rpe: Option<f64>,
    #[serde(rename = "duracion_min")]
    pub duration_min: Option<f64>,
}

/// Answers to the physical wellbeing questionnaire
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct WellbeingAnswers {
    #[serde(rename = "dolor")]
    pub soreness: Option<f64>,
    #[serde(rename = "energia")]
    pub energy: Option<f64>,
}

/// Answers to the sleep and recovery questionnaire
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SleepAnswers {
    #[serde(rename = "horas")]
    pub hours: Option<f64>,
    #[serde(rename = "calidad")]
    pub quality: Option<f64>,
}

/// Typed answer set, one variant per questionnaire.
///
/// Fields are optional because partially answered forms are expected.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "questionnaire_id", content = "responses")]
pub enum Answers {
    #[serde(rename = "general")]
    General(GeneralAnswers),
    #[serde(rename = "bienestar")]
    Wellbeing(WellbeingAnswers),
    #[serde(rename = "sueno")]
    Sleep(SleepAnswers),
}

impl Answers {
    pub fn kind(&self) -> QuestionnaireKind {
        match self {
            Answers::General(_) => QuestionnaireKind::General,
            Answers::Wellbeing(_) => QuestionnaireKind::Wellbeing,
            Answers::Sleep(_) => QuestionnaireKind::Sleep,
        }
    }

    /// Fatigue score, only carried by the general questionnaire
    pub fn fatigue(&self) -> Option<f64> {
        match self {
            Answers::General(general) => general.fatigue,
            _ => None,
        }
    }
}

/// A submitted questionnaire
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct QuestionnaireResponse {
    pub id: Uuid,
    pub user_id: UserId,
    pub timestamp: DateTime<Utc>,
    pub answers: Answers,
}

impl QuestionnaireResponse {
    /// Create a response stamped with a fresh id
    pub fn new(user_id: UserId, timestamp: DateTime<Utc>, answers: Answers) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            timestamp,
            answers,
        }
    }
}

// ============================================================================
// Derived Types
// ============================================================================

/// Training load of one session (RPE x minutes)
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct TrainingLoadPoint {
    pub timestamp: DateTime<Utc>,
    pub load: f64,
}

/// Timestamped movement intensity
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct IntensityPoint {
    pub timestamp: DateTime<Utc>,
    pub magnitude: f64,
}

/// Vital-sign risk state
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Safe,
    Warning,
    Danger,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Safe => f.write_str("safe"),
            RiskLevel::Warning => f.write_str("warning"),
            RiskLevel::Danger => f.write_str("danger"),
        }
    }
}

/// Fatigue state reported after a questionnaire save
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FatigueStatus {
    Optimal,
    ElevatedRisk,
}

impl fmt::Display for FatigueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FatigueStatus::Optimal => f.write_str("optimal"),
            FatigueStatus::ElevatedRisk => f.write_str("elevated-risk"),
        }
    }
}
