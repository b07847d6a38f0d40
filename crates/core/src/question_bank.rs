//! Quiz question bank items: types, options and answer shapes.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Kinds of quiz question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    Essay,
    Matching,
    Coding,
}

impl QuestionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MultipleChoice => "multipleChoice",
            Self::TrueFalse => "trueFalse",
            Self::Essay => "essay",
            Self::Matching => "matching",
            Self::Coding => "coding",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "multipleChoice" => Ok(Self::MultipleChoice),
            "trueFalse" => Ok(Self::TrueFalse),
            "essay" => Ok(Self::Essay),
            "matching" => Ok(Self::Matching),
            "coding" => Ok(Self::Coding),
            other => Err(CoreError::Validation(format!(
                "Invalid question type '{other}'. Must be one of: multipleChoice, trueFalse, essay, matching, coding"
            ))),
        }
    }

    /// Essay and coding answers cannot be graded automatically.
    pub fn needs_manual_review(self) -> bool {
        matches!(self, Self::Essay | Self::Coding)
    }
}

/// Difficulty of a single bank item.
pub const DIFFICULTIES: &[&str] = &["easy", "medium", "hard"];

pub fn validate_difficulty(difficulty: Option<&str>) -> Result<(), CoreError> {
    match difficulty {
        Some(d) if !DIFFICULTIES.contains(&d) => Err(CoreError::Validation(format!(
            "Invalid difficulty '{d}'. Must be one of: {DIFFICULTIES:?}"
        ))),
        _ => Ok(()),
    }
}

/// One selectable option of a multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub option_id: String,
    pub content: String,
    #[serde(default)]
    pub is_correct: bool,
}

/// An answer: a single value or a list of values.
///
/// Used both for the stored correct answer and for what a learner submits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Single(String),
    Multiple(Vec<String>),
}

impl AnswerValue {
    /// Values as a slice-like list regardless of shape.
    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::Single(v) => vec![v.as_str()],
            Self::Multiple(vs) => vs.iter().map(String::as_str).collect(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.values().iter().all(|v| v.trim().is_empty())
    }
}

/// Check that a bank item's options and correct answer fit its type.
pub fn validate_question(
    question_type: QuestionType,
    options: &[QuestionOption],
    correct_answer: &AnswerValue,
) -> Result<(), CoreError> {
    match question_type {
        QuestionType::MultipleChoice => {
            if options.len() < 2 {
                return Err(CoreError::Validation(
                    "multipleChoice questions need at least 2 options".into(),
                ));
            }
            if !options.iter().any(|o| o.is_correct) {
                return Err(CoreError::Validation(
                    "multipleChoice questions need at least one correct option".into(),
                ));
            }
            for value in correct_answer.values() {
                if !options.iter().any(|o| o.option_id == value) {
                    return Err(CoreError::Validation(format!(
                        "correct_answer '{value}' does not match any option_id"
                    )));
                }
            }
        }
        QuestionType::TrueFalse => {
            let ok = matches!(correct_answer, AnswerValue::Single(v)
                if v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("false"));
            if !ok {
                return Err(CoreError::Validation(
                    "trueFalse questions need correct_answer \"true\" or \"false\"".into(),
                ));
            }
        }
        QuestionType::Matching => {
            if !matches!(correct_answer, AnswerValue::Multiple(v) if !v.is_empty()) {
                return Err(CoreError::Validation(
                    "matching questions need a list of pairs as correct_answer".into(),
                ));
            }
        }
        QuestionType::Essay | QuestionType::Coding => {}
    }
    if !question_type.needs_manual_review() && correct_answer.is_blank() {
        return Err(CoreError::Validation("correct_answer must not be empty".into()));
    }
    Ok(())
}
