//! Built-in questionnaire catalog.
//!
//! Each questionnaire lists its fields with the answer range the form
//! allows. Key/value answers entered by a user are checked against this
//! catalog before becoming typed [`Answers`].

use crate::types::*;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// How a field is presented
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Slider,
    Number,
}

/// One question
#[derive(Clone, Debug)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

/// A questionnaire and its fields, in display order
#[derive(Clone, Debug)]
pub struct QuestionnaireSpec {
    pub kind: QuestionnaireKind,
    pub title: &'static str,
    pub fields: Vec<FieldSpec>,
}

impl QuestionnaireSpec {
    pub fn field(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.key == key)
    }
}

/// All known questionnaires
#[derive(Clone, Debug)]
pub struct QuestionnaireCatalog {
    pub questionnaires: HashMap<QuestionnaireKind, QuestionnaireSpec>,
}

/// Cached default catalog - built once and reused
static DEFAULT_CATALOG: Lazy<QuestionnaireCatalog> = Lazy::new(build_default_catalog);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static QuestionnaireCatalog {
    &DEFAULT_CATALOG
}

fn slider(key: &'static str, label: &'static str, min: f64, max: f64, default: f64) -> FieldSpec {
    FieldSpec {
        key,
        label,
        kind: FieldKind::Slider,
        min,
        max,
        default,
    }
}

fn number(key: &'static str, label: &'static str, min: f64, max: f64, default: f64) -> FieldSpec {
    FieldSpec {
        key,
        label,
        kind: FieldKind::Number,
        min,
        max,
        default,
    }
}

/// Builds the catalog of built-in questionnaires
pub fn build_default_catalog() -> QuestionnaireCatalog {
    let specs = [
        QuestionnaireSpec {
            kind: QuestionnaireKind::General,
            title: "General self-perception",
            fields: vec![
                slider("fatiga", "Fatigue level (1-10)", 1.0, 10.0, 5.0),
                number("suenio", "Hours of sleep", 0.0, 12.0, 8.0),
                slider("rpe", "Perceived exertion (1-10)", 1.0, 10.0, 5.0),
                number("duracion_min", "Training duration (min)", 0.0, 600.0, 60.0),
            ],
        },
        QuestionnaireSpec {
            kind: QuestionnaireKind::Wellbeing,
            title: "Physical wellbeing",
            fields: vec![
                slider("dolor", "Muscle soreness (0-10)", 0.0, 10.0, 2.0),
                slider("energia", "Current energy (1-10)", 1.0, 10.0, 7.0),
            ],
        },
        QuestionnaireSpec {
            kind: QuestionnaireKind::Sleep,
            title: "Sleep and recovery",
            fields: vec![
                number("horas", "Hours slept", 0.0, 12.0, 7.0),
                slider("calidad", "Sleep quality (1-5)", 1.0, 5.0, 4.0),
            ],
        },
    ];

    QuestionnaireCatalog {
        questionnaires: specs.into_iter().map(|spec| (spec.kind, spec)).collect(),
    }
}

impl QuestionnaireCatalog {
    pub fn get(&self, kind: QuestionnaireKind) -> Option<&QuestionnaireSpec> {
        self.questionnaires.get(&kind)
    }

    /// Turn `key=value` answers into typed answers for `kind`.
    ///
    /// Unknown keys, non-finite values and values outside the field range are
    /// rejected. Fields not mentioned stay unanswered.
    pub fn build_answers(&self, kind: QuestionnaireKind, pairs: &[(String, f64)]) -> Result<Answers> {
        let spec = self
            .get(kind)
            .ok_or_else(|| Error::Other(format!("Questionnaire {} not in catalog", kind)))?;

        let mut answers = empty_answers(kind);
        for (key, value) in pairs {
            let field = spec.field(key).ok_or_else(|| Error::UnknownField {
                questionnaire: kind.to_string(),
                field: key.clone(),
            })?;

            if !value.is_finite() {
                return Err(Error::InvalidNumeric {
                    field: key.clone(),
                    value: value.to_string(),
                });
            }
            if *value < field.min || *value > field.max {
                return Err(Error::OutOfRange {
                    field: key.clone(),
                    value: *value,
                    min: field.min,
                    max: field.max,
                });
            }

            if !set_answer(&mut answers, key, *value) {
                return Err(Error::UnknownField {
                    questionnaire: kind.to_string(),
                    field: key.clone(),
                });
            }
        }

        Ok(answers)
    }

    /// Validate catalog consistency
    ///
    /// Returns a list of validation errors, or empty vec if valid
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for kind in QuestionnaireKind::all() {
            let Some(spec) = self.get(*kind) else {
                errors.push(format!("Questionnaire '{}' missing from catalog", kind));
                continue;
            };

            if spec.fields.is_empty() {
                errors.push(format!("Questionnaire '{}' has no fields", kind));
            }

            for field in &spec.fields {
                if field.min > field.max {
                    errors.push(format!("Field '{}' has min above max", field.key));
                }
                if field.default < field.min || field.default > field.max {
                    errors.push(format!("Field '{}' default outside its range", field.key));
                }
                if !set_answer(&mut empty_answers(*kind), field.key, field.default) {
                    errors.push(format!(
                        "Field '{}' has no slot in {} answers",
                        field.key, kind
                    ));
                }
            }
        }

        errors
    }
}

fn empty_answers(kind: QuestionnaireKind) -> Answers {
    match kind {
        QuestionnaireKind::General => Answers::General(GeneralAnswers::default()),
        QuestionnaireKind::Wellbeing => Answers::Wellbeing(WellbeingAnswers::default()),
        QuestionnaireKind::Sleep => Answers::Sleep(SleepAnswers::default()),
    }
}

fn set_answer(answers: &mut Answers, key: &str, value: f64) -> bool {
    let slot = match answers {
        Answers::General(a) => match key {
            "fatiga" => &mut a.fatigue,
            "suenio" => &mut a.sleep_hours,
            "rpe" => &mut a.rpe,
            "duracion_min" => &mut a.duration_min,
            _ => return false,
        },
        Answers::Wellbeing(a) => match key {
            "dolor" => &mut a.soreness,
            "energia" => &mut a.energy,
            _ => return false,
        },
        Answers::Sleep(a) => match key {
            "horas" => &mut a.hours,
            "calidad" => &mut a.quality,
            _ => return false,
        },
    };
    *slot = Some(value);
    true
}
