//! Session training load from questionnaire answers.
//!
//! `load = rpe * duration_min`. Responses lacking either answer are skipped:
//! partially filled questionnaires are normal, not an error.

use crate::repository::QuestionnaireHistory;
use crate::{Answers, QuestionnaireKind, QuestionnaireResponse, Result, TrainingLoadPoint, UserId};

/// Load of one session, if both RPE and duration were answered
pub fn session_load(answers: &Answers) -> Option<f64> {
    match answers {
        Answers::General(general) => {
            let rpe = general.rpe.filter(|v| v.is_finite())?;
            let duration = general.duration_min.filter(|v| v.is_finite())?;
            Some(rpe * duration)
        }
        _ => None,
    }
}

/// Load series in the order of `responses`
pub fn training_load_series(responses: &[QuestionnaireResponse]) -> Vec<TrainingLoadPoint> {
    let series: Vec<TrainingLoadPoint> = responses
        .iter()
        .filter_map(|response| {
            session_load(&response.answers).map(|load| TrainingLoadPoint {
                timestamp: response.timestamp,
                load,
            })
        })
        .collect();

    let skipped = responses.len() - series.len();
    if skipped > 0 {
        tracing::debug!("Skipped {} responses without RPE and duration", skipped);
    }

    series
}

/// Load series for a user over the trailing `days` (all history if `None`)
pub fn load_history<H: QuestionnaireHistory + ?Sized>(
    history: &H,
    user_id: UserId,
    days: Option<u32>,
) -> Result<Vec<TrainingLoadPoint>> {
    let responses =
        history.questionnaire_history(user_id, Some(QuestionnaireKind::General), days)?;
    Ok(training_load_series(&responses))
}
