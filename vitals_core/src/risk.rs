//! Risk classification from the latest vital sign and fatigue score.
//!
//! Both paths are stateless and re-evaluated on every query. The heart-rate
//! chain is applied literally: danger is checked first, then warning, so
//! e.g. 45 bpm falls through to warning and 120 bpm reads as warning.

use crate::repository::SensorHistory;
use crate::{FatigueStatus, QuestionnaireKind, QuestionnaireResponse, Result, RiskLevel, Sample, UserId};

/// Fatigue at or above this score (0-10 scale) is elevated risk
pub const FATIGUE_RISK_THRESHOLD: f64 = 5.0;

/// Classify a heart rate. No reading is not treated as risk.
pub fn classify_bpm(bpm: Option<f64>) -> RiskLevel {
    let Some(bpm) = bpm else {
        return RiskLevel::Safe;
    };

    if bpm > 120.0 || bpm < 45.0 {
        RiskLevel::Danger
    } else if bpm > 100.0 || bpm < 55.0 {
        RiskLevel::Warning
    } else {
        RiskLevel::Safe
    }
}

/// Classify the most recent sample only; earlier readings are not consulted
/// even when the last one carries no heart rate.
pub fn classify_latest(samples: &[Sample]) -> RiskLevel {
    classify_bpm(samples.last().and_then(|s| s.bpm))
}

/// Vital-sign risk for a user from their sensor history
pub fn vital_risk<H: SensorHistory + ?Sized>(history: &H, user_id: UserId) -> Result<RiskLevel> {
    let samples = history.history(user_id, None)?;
    let level = classify_latest(&samples);
    tracing::debug!(
        "Vital risk for user {}: {} ({} samples)",
        user_id,
        level,
        samples.len()
    );
    Ok(level)
}

/// Classify a fatigue score; no score counts as optimal
pub fn classify_fatigue(fatigue: Option<f64>) -> FatigueStatus {
    match fatigue {
        Some(score) if score >= FATIGUE_RISK_THRESHOLD => FatigueStatus::ElevatedRisk,
        _ => FatigueStatus::Optimal,
    }
}

/// Fatigue from the most recent general questionnaire in `responses`
pub fn latest_fatigue(responses: &[QuestionnaireResponse]) -> Option<f64> {
    responses
        .iter()
        .filter(|r| r.answers.kind() == QuestionnaireKind::General)
        .max_by_key(|r| r.timestamp)
        .and_then(|r| r.answers.fatigue())
}
