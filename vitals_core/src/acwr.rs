//! Acute:chronic workload ratio.
//!
//! Both windows trail from the same "now" and are queried independently, so
//! every acute session is also part of the chronic baseline. The ratio
//! compares recent intensity against that baseline.

use crate::config::WorkloadConfig;
use crate::load::load_history;
use crate::repository::QuestionnaireHistory;
use crate::{Error, Result, TrainingLoadPoint, UserId};
use serde::{Deserialize, Serialize};

/// Informational band for a ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcwrZone {
    /// Below 0.8
    Undertrained,
    /// 0.8 to 1.3
    Optimal,
    /// Above 1.3 up to 1.5
    Caution,
    /// Above 1.5
    HighRisk,
}

impl AcwrZone {
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio < 0.8 {
            AcwrZone::Undertrained
        } else if ratio <= 1.3 {
            AcwrZone::Optimal
        } else if ratio <= 1.5 {
            AcwrZone::Caution
        } else {
            AcwrZone::HighRisk
        }
    }
}

/// Workload ratio for a user
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Acwr {
    pub ratio: f64,
    pub acute_points: usize,
    pub chronic_points: usize,
    pub zone: AcwrZone,
}

fn mean_load(points: &[TrainingLoadPoint]) -> f64 {
    points.iter().map(|p| p.load).sum::<f64>() / points.len() as f64
}

/// `mean(acute) / mean(chronic)`; undefined when either window is empty
/// or the chronic mean is zero.
pub fn ratio(acute: &[TrainingLoadPoint], chronic: &[TrainingLoadPoint]) -> Result<f64> {
    let undefined = || Error::UndefinedRatio {
        acute: acute.len(),
        chronic: chronic.len(),
    };

    if acute.is_empty() || chronic.is_empty() {
        return Err(undefined());
    }

    let ratio = mean_load(acute) / mean_load(chronic);
    if ratio.is_finite() {
        Ok(ratio)
    } else {
        Err(undefined())
    }
}

/// Query both trailing windows for `user_id` and compute the ratio
pub fn compute_acwr<H: QuestionnaireHistory + ?Sized>(
    history: &H,
    user_id: UserId,
    windows: &WorkloadConfig,
) -> Result<Acwr> {
    windows.validate()?;

    let acute = load_history(history, user_id, Some(windows.acute_days))?;
    let chronic = load_history(history, user_id, Some(windows.chronic_days))?;
    let ratio = ratio(&acute, &chronic)?;

    tracing::info!(
        "ACWR for user {}: {:.3} ({} acute / {} chronic sessions)",
        user_id,
        ratio,
        acute.len(),
        chronic.len()
    );

    Ok(Acwr {
        ratio,
        acute_points: acute.len(),
        chronic_points: chronic.len(),
        zone: AcwrZone::from_ratio(ratio),
    })
}
