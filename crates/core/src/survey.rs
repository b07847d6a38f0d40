//! Surveys: question kinds, instance lifecycle, response checks and analytics.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Text answers kept per question in analytics.
pub const TEXT_SAMPLE_LIMIT: usize = 5;

/// Rating questions use a 1..=5 scale.
pub const RATING_SCALE: std::ops::RangeInclusive<f64> = 1.0..=5.0;

/// Rating averages below this are called out in insights.
const LOW_RATING: f64 = 3.0;

// ---------------------------------------------------------------------------
// Questions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SurveyQuestionType {
    Text,
    SingleChoice,
    MultipleChoice,
    Rating,
    OpenEnded,
    Dropdown,
    Matrix,
}

impl SurveyQuestionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::SingleChoice => "SINGLE_CHOICE",
            Self::MultipleChoice => "MULTIPLE_CHOICE",
            Self::Rating => "RATING",
            Self::OpenEnded => "OPEN_ENDED",
            Self::Dropdown => "DROPDOWN",
            Self::Matrix => "MATRIX",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "TEXT" => Ok(Self::Text),
            "SINGLE_CHOICE" => Ok(Self::SingleChoice),
            "MULTIPLE_CHOICE" => Ok(Self::MultipleChoice),
            "RATING" => Ok(Self::Rating),
            "OPEN_ENDED" => Ok(Self::OpenEnded),
            "DROPDOWN" => Ok(Self::Dropdown),
            "MATRIX" => Ok(Self::Matrix),
            other => Err(CoreError::Validation(format!(
                "Invalid survey question type '{other}'. Must be one of: TEXT, SINGLE_CHOICE, \
                 MULTIPLE_CHOICE, RATING, OPEN_ENDED, DROPDOWN, MATRIX"
            ))),
        }
    }

    /// Types whose answers are picked from a fixed option list.
    pub fn is_choice(self) -> bool {
        matches!(self, Self::SingleChoice | Self::MultipleChoice | Self::Dropdown)
    }

    pub fn is_free_text(self) -> bool {
        matches!(self, Self::Text | Self::OpenEnded)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyOption {
    pub value: String,
    pub label: String,
}

/// Choice and dropdown questions need at least two distinct option values.
pub fn validate_survey_question(
    question_type: SurveyQuestionType,
    options: &[SurveyOption],
) -> Result<(), CoreError> {
    if question_type.is_choice() {
        if options.len() < 2 {
            return Err(CoreError::Validation(format!(
                "{} questions need at least 2 options",
                question_type.as_str()
            )));
        }
        let mut seen = HashSet::new();
        for option in options {
            if option.value.trim().is_empty() {
                return Err(CoreError::Validation("option value must not be empty".into()));
            }
            if !seen.insert(option.value.as_str()) {
                return Err(CoreError::Validation(format!(
                    "duplicate option value '{}'",
                    option.value
                )));
            }
        }
    }
    Ok(())
}

/// A question slot in a survey template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyQuestionItem {
    pub question_id: DbId,
    pub order: i32,
    #[serde(default)]
    pub required: Option<bool>,
}

pub fn validate_survey_items(items: &[SurveyQuestionItem]) -> Result<(), CoreError> {
    let mut seen = HashSet::new();
    for item in items {
        if item.order < 0 {
            return Err(CoreError::Validation(format!(
                "question order {} must not be negative",
                item.order
            )));
        }
        if !seen.insert(item.question_id) {
            return Err(CoreError::Validation(format!(
                "question {} appears more than once",
                item.question_id
            )));
        }
    }
    Ok(())
}

/// A question as copied into a survey instance at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotQuestion {
    pub question_id: DbId,
    pub content: String,
    pub question_type: SurveyQuestionType,
    #[serde(default)]
    pub options: Vec<SurveyOption>,
    pub required: bool,
    pub order: i32,
}

/// The bank fields a snapshot is built from.
#[derive(Debug, Clone)]
pub struct BankQuestion {
    pub id: DbId,
    pub content: String,
    pub question_type: SurveyQuestionType,
    pub options: Vec<SurveyOption>,
    pub required: bool,
}

/// Freeze template items into an ordered snapshot. The template's `required`
/// overrides the bank item's. Every item must have a bank entry.
pub fn build_snapshot(
    items: &[SurveyQuestionItem],
    bank: &[BankQuestion],
) -> Result<Vec<SnapshotQuestion>, CoreError> {
    let by_id: HashMap<DbId, &BankQuestion> = bank.iter().map(|q| (q.id, q)).collect();
    let mut ordered = items.to_vec();
    ordered.sort_by_key(|i| i.order);
    ordered
        .iter()
        .map(|item| {
            let question = by_id.get(&item.question_id).ok_or(CoreError::NotFound {
                entity: "survey_question",
                id: item.question_id,
            })?;
            Ok(SnapshotQuestion {
                question_id: question.id,
                content: question.content.clone(),
                question_type: question.question_type,
                options: question.options.clone(),
                required: item.required.unwrap_or(question.required),
                order: item.order,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Instance lifecycle
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SurveyStatus {
    Scheduled,
    Active,
    Completed,
    Cancelled,
}

impl SurveyStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "SCHEDULED",
            Self::Active => "ACTIVE",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "SCHEDULED" => Ok(Self::Scheduled),
            "ACTIVE" => Ok(Self::Active),
            "COMPLETED" => Ok(Self::Completed),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(CoreError::Validation(format!(
                "Invalid survey status '{other}'. Must be one of: SCHEDULED, ACTIVE, COMPLETED, CANCELLED"
            ))),
        }
    }

    pub fn can_transition_to(self, next: Self) -> bool {
        self == next
            || matches!(
                (self, next),
                (Self::Scheduled, Self::Active)
                    | (Self::Scheduled, Self::Cancelled)
                    | (Self::Active, Self::Completed)
                    | (Self::Active, Self::Cancelled)
            )
    }
}

pub fn validate_status_transition(current: &str, next: &str) -> Result<SurveyStatus, CoreError> {
    let current = SurveyStatus::parse(current)?;
    let next = SurveyStatus::parse(next)?;
    if !current.can_transition_to(next) {
        return Err(CoreError::Conflict(format!(
            "Survey cannot move from {} to {}",
            current.as_str(),
            next.as_str()
        )));
    }
    Ok(next)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeployOption {
    Immediate,
    Scheduled,
    Manual,
    Auto,
}

impl DeployOption {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Immediate => "IMMEDIATE",
            Self::Scheduled => "SCHEDULED",
            Self::Manual => "MANUAL",
            Self::Auto => "AUTO",
        }
    }

    /// Status a new survey starts in.
    pub fn initial_status(self) -> SurveyStatus {
        match self {
            Self::Immediate => SurveyStatus::Active,
            _ => SurveyStatus::Scheduled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeployWhen {
    BeforeCourse,
    AfterCourse,
    DuringCourse,
    Custom,
}

impl DeployWhen {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BeforeCourse => "BEFORE_COURSE",
            Self::AfterCourse => "AFTER_COURSE",
            Self::DuringCourse => "DURING_COURSE",
            Self::Custom => "CUSTOM",
        }
    }
}

pub fn validate_window(start: Timestamp, end: Timestamp) -> Result<(), CoreError> {
    if start >= end {
        return Err(CoreError::Validation(format!(
            "start_date {start} must be before end_date {end}"
        )));
    }
    Ok(())
}

/// Only active surveys inside their window take responses.
pub fn ensure_accepting(
    status: &str,
    start: Timestamp,
    end: Timestamp,
    now: Timestamp,
) -> Result<(), CoreError> {
    if SurveyStatus::parse(status)? != SurveyStatus::Active {
        return Err(CoreError::Conflict(format!(
            "Survey is {status} and does not accept responses"
        )));
    }
    if now < start {
        return Err(CoreError::Validation("Survey has not started yet".into()));
    }
    if now > end {
        return Err(CoreError::Validation("Survey has ended".into()));
    }
    Ok(())
}

/// Responses as a percentage of participants, 0 when participants are unknown.
pub fn completion_rate(total_responses: i32, total_participants: i32) -> f64 {
    if total_participants <= 0 {
        return 0.0;
    }
    let rate = f64::from(total_responses) * 100.0 / f64::from(total_participants);
    round2(rate.min(100.0))
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// A submitted value: a rating, one choice, or several choices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SurveyValue {
    Number(f64),
    Choice(String),
    Choices(Vec<String>),
}

impl SurveyValue {
    fn choices(&self) -> Vec<String> {
        match self {
            Self::Number(n) => vec![n.to_string()],
            Self::Choice(c) => vec![c.clone()],
            Self::Choices(cs) => cs.clone(),
        }
    }

    fn rating(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Choice(c) => c.trim().parse().ok(),
            Self::Choices(_) => None,
        }
    }

    /// The rating when it falls on the scale.
    fn scaled_rating(&self) -> Option<f64> {
        self.rating().filter(|r| RATING_SCALE.contains(r))
    }

    fn is_blank(&self) -> bool {
        match self {
            Self::Number(_) => false,
            Self::Choice(c) => c.trim().is_empty(),
            Self::Choices(cs) => cs.iter().all(|c| c.trim().is_empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyAnswer {
    pub question_id: DbId,
    #[serde(default)]
    pub value: Option<SurveyValue>,
    #[serde(default)]
    pub text: Option<String>,
}

impl SurveyAnswer {
    fn is_answered(&self) -> bool {
        self.value.as_ref().is_some_and(|v| !v.is_blank())
            || self.text.as_deref().is_some_and(|t| !t.trim().is_empty())
    }
}

/// Check a submission against the survey's snapshot: every answer refers to a
/// distinct survey question, choices come from the option list, ratings sit on
/// the scale, and required questions are answered.
pub fn check_answers(
    questions: &[SnapshotQuestion],
    answers: &[SurveyAnswer],
) -> Result<(), CoreError> {
    let by_id: HashMap<DbId, &SnapshotQuestion> =
        questions.iter().map(|q| (q.question_id, q)).collect();

    let mut seen = HashSet::new();
    for answer in answers {
        if !seen.insert(answer.question_id) {
            return Err(CoreError::Validation(format!(
                "question {} is answered more than once",
                answer.question_id
            )));
        }
        let question = by_id.get(&answer.question_id).ok_or_else(|| {
            CoreError::Validation(format!(
                "question {} is not part of this survey",
                answer.question_id
            ))
        })?;
        if let (true, Some(value)) = (question.question_type.is_choice(), &answer.value) {
            for choice in value.choices() {
                if !question.options.iter().any(|o| o.value == choice) {
                    return Err(CoreError::Validation(format!(
                        "'{choice}' is not an option of question {}",
                        question.question_id
                    )));
                }
            }
        }
        if question.question_type == SurveyQuestionType::Rating {
            if let Some(value) = &answer.value {
                if value.rating().is_none() {
                    return Err(CoreError::Validation(format!(
                        "question {} expects a numeric rating",
                        question.question_id
                    )));
                }
                if value.scaled_rating().is_none() {
                    return Err(CoreError::Validation(format!(
                        "rating for question {} must be between {} and {}",
                        question.question_id,
                        RATING_SCALE.start(),
                        RATING_SCALE.end()
                    )));
                }
            }
        }
    }

    let missing: Vec<String> = questions
        .iter()
        .filter(|q| q.required)
        .filter(|q| {
            !answers
                .iter()
                .any(|a| a.question_id == q.question_id && a.is_answered())
        })
        .map(|q| q.question_id.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(CoreError::Validation(format!(
            "required questions not answered: {}",
            missing.join(", ")
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionCount {
    pub value: String,
    pub label: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionBreakdown {
    pub question_id: DbId,
    pub content: String,
    pub question_type: SurveyQuestionType,
    pub answered: i64,
    pub option_counts: Vec<OptionCount>,
    pub average_rating: Option<f64>,
    pub text_samples: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurveyAnalytics {
    pub total_responses: usize,
    pub average_rating: Option<f64>,
    pub questions: Vec<QuestionBreakdown>,
    pub key_insights: Vec<String>,
}

/// Aggregate every response's answers into per-question breakdowns.
pub fn analyze(questions: &[SnapshotQuestion], responses: &[Vec<SurveyAnswer>]) -> SurveyAnalytics {
    let mut ordered: Vec<&SnapshotQuestion> = questions.iter().collect();
    ordered.sort_by_key(|q| q.order);

    let mut all_ratings = Vec::new();
    let breakdowns: Vec<QuestionBreakdown> = ordered
        .into_iter()
        .map(|question| {
            // At most one answer per response counts toward a question.
            let answers: Vec<&SurveyAnswer> = responses
                .iter()
                .filter_map(|r| {
                    r.iter()
                        .find(|a| a.question_id == question.question_id && a.is_answered())
                })
                .collect();

            let mut option_counts: Vec<OptionCount> = question
                .options
                .iter()
                .map(|o| OptionCount {
                    value: o.value.clone(),
                    label: o.label.clone(),
                    count: 0,
                })
                .collect();
            let mut ratings = Vec::new();
            let mut text_samples = Vec::new();

            for answer in &answers {
                if let Some(value) = &answer.value {
                    if question.question_type.is_choice() {
                        for choice in value.choices() {
                            if let Some(c) = option_counts.iter_mut().find(|c| c.value == choice) {
                                c.count += 1;
                            }
                        }
                    }
                    if question.question_type == SurveyQuestionType::Rating {
                        if let Some(r) = value.scaled_rating() {
                            ratings.push(r);
                        }
                    }
                }
                if text_samples.len() < TEXT_SAMPLE_LIMIT {
                    if let Some(text) = sample_text(question.question_type, answer) {
                        text_samples.push(text);
                    }
                }
            }

            all_ratings.extend_from_slice(&ratings);
            QuestionBreakdown {
                question_id: question.question_id,
                content: question.content.clone(),
                question_type: question.question_type,
                answered: answers.len() as i64,
                option_counts: if question.question_type.is_choice() {
                    option_counts
                } else {
                    Vec::new()
                },
                average_rating: average(&ratings),
                text_samples,
            }
        })
        .collect();

    let average_rating = average(&all_ratings);
    let key_insights = insights(responses.len(), average_rating, &breakdowns);
    SurveyAnalytics {
        total_responses: responses.len(),
        average_rating,
        questions: breakdowns,
        key_insights,
    }
}

/// Rating answers across every survey of a course.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SatisfactionSummary {
    pub survey_count: usize,
    pub response_count: usize,
    pub rating_count: usize,
    pub average_rating: Option<f64>,
}

/// Pool the ratings of several surveys, each given as its snapshot and the
/// answers of its responses.
pub fn satisfaction<'a, I>(surveys: I) -> SatisfactionSummary
where
    I: IntoIterator<Item = (&'a [SnapshotQuestion], &'a [Vec<SurveyAnswer>])>,
{
    let mut survey_count = 0;
    let mut response_count = 0;
    let mut ratings = Vec::new();
    for (questions, responses) in surveys {
        survey_count += 1;
        response_count += responses.len();
        for question in questions
            .iter()
            .filter(|q| q.question_type == SurveyQuestionType::Rating)
        {
            ratings.extend(responses.iter().filter_map(|r| {
                r.iter()
                    .find(|a| a.question_id == question.question_id)
                    .and_then(|a| a.value.as_ref())
                    .and_then(SurveyValue::scaled_rating)
            }));
        }
    }
    SatisfactionSummary {
        survey_count,
        response_count,
        rating_count: ratings.len(),
        average_rating: average(&ratings),
    }
}

/// Free text of an answer: the `text` field, or the value of a text question.
fn sample_text(question_type: SurveyQuestionType, answer: &SurveyAnswer) -> Option<String> {
    if let Some(text) = answer.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        return Some(text.to_string());
    }
    match &answer.value {
        Some(SurveyValue::Choice(s)) if question_type.is_free_text() && !s.trim().is_empty() => {
            Some(s.trim().to_string())
        }
        _ => None,
    }
}

fn insights(
    total: usize,
    average_rating: Option<f64>,
    breakdowns: &[QuestionBreakdown],
) -> Vec<String> {
    if total == 0 {
        return vec!["No responses yet".to_string()];
    }
    let mut out = vec![format!("{total} responses collected")];
    if let Some(avg) = average_rating {
        out.push(format!("Average rating across rating questions is {avg:.2}"));
    }
    for b in breakdowns {
        if let Some(avg) = b.average_rating {
            if avg < LOW_RATING {
                out.push(format!("'{}' is rated low ({avg:.2})", b.content));
            }
        }
        if b.answered > 0 {
            if let Some(top) = b.option_counts.iter().max_by_key(|c| c.count) {
                let share = top.count as f64 * 100.0 / b.answered as f64;
                if share >= 50.0 {
                    out.push(format!(
                        "{share:.0}% chose '{}' for '{}'",
                        top.label, b.content
                    ));
                }
            }
        }
    }
    out
}

fn average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(round2(values.iter().sum::<f64>() / values.len() as f64))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    fn option(value: &str) -> SurveyOption {
        SurveyOption {
            value: value.into(),
            label: format!("Label {value}"),
        }
    }

    fn question(id: DbId, ty: SurveyQuestionType, required: bool, order: i32) -> SnapshotQuestion {
        SnapshotQuestion {
            question_id: id,
            content: format!("Question {id}"),
            question_type: ty,
            options: if ty.is_choice() {
                vec![option("a"), option("b")]
            } else {
                Vec::new()
            },
            required,
            order,
        }
    }

    fn answer(id: DbId, value: Option<SurveyValue>, text: Option<&str>) -> SurveyAnswer {
        SurveyAnswer {
            question_id: id,
            value,
            text: text.map(str::to_string),
        }
    }

    #[test]
    fn choice_questions_need_options() {
        assert!(validate_survey_question(SurveyQuestionType::Dropdown, &[option("a")]).is_err());
        assert!(
            validate_survey_question(SurveyQuestionType::SingleChoice, &[option("a"), option("a")])
                .is_err()
        );
        assert!(
            validate_survey_question(SurveyQuestionType::SingleChoice, &[option("a"), option("b")])
                .is_ok()
        );
        assert!(validate_survey_question(SurveyQuestionType::Rating, &[]).is_ok());
    }

    #[test]
    fn snapshot_orders_and_overrides_required() {
        let bank = vec![
            BankQuestion {
                id: 1,
                content: "First".into(),
                question_type: SurveyQuestionType::Text,
                options: vec![],
                required: false,
            },
            BankQuestion {
                id: 2,
                content: "Second".into(),
                question_type: SurveyQuestionType::Rating,
                options: vec![],
                required: true,
            },
        ];
        let items = vec![
            SurveyQuestionItem { question_id: 2, order: 1, required: None },
            SurveyQuestionItem { question_id: 1, order: 0, required: Some(true) },
        ];
        let snapshot = build_snapshot(&items, &bank).unwrap();
        assert_eq!(snapshot[0].question_id, 1);
        assert!(snapshot[0].required);
        assert!(snapshot[1].required);

        let missing = vec![SurveyQuestionItem { question_id: 9, order: 0, required: None }];
        assert!(matches!(
            build_snapshot(&missing, &bank),
            Err(CoreError::NotFound { .. })
        ));
    }

    #[test]
    fn status_transitions() {
        assert_eq!(
            validate_status_transition("SCHEDULED", "ACTIVE").unwrap(),
            SurveyStatus::Active
        );
        assert!(matches!(
            validate_status_transition("COMPLETED", "ACTIVE"),
            Err(CoreError::Conflict(_))
        ));
        assert_eq!(DeployOption::Immediate.initial_status(), SurveyStatus::Active);
        assert_eq!(DeployOption::Manual.initial_status(), SurveyStatus::Scheduled);
    }

    #[test]
    fn accepting_requires_active_window() {
        let now = Utc::now();
        let start = now - Duration::days(1);
        let end = now + Duration::days(1);
        assert!(ensure_accepting("ACTIVE", start, end, now).is_ok());
        assert!(matches!(
            ensure_accepting("SCHEDULED", start, end, now),
            Err(CoreError::Conflict(_))
        ));
        assert!(ensure_accepting("ACTIVE", end, end + Duration::days(1), now).is_err());
        assert!(validate_window(end, start).is_err());
    }

    #[test]
    fn completion_rate_is_capped() {
        assert_eq!(completion_rate(5, 20), 25.0);
        assert_eq!(completion_rate(30, 20), 100.0);
        assert_eq!(completion_rate(3, 0), 0.0);
        assert_eq!(completion_rate(1, 3), 33.33);
    }

    #[test]
    fn required_questions_must_be_answered() {
        let questions = vec![
            question(1, SurveyQuestionType::Rating, true, 0),
            question(2, SurveyQuestionType::Text, false, 1),
        ];
        let ok = vec![answer(1, Some(SurveyValue::Number(4.0)), None)];
        assert!(check_answers(&questions, &ok).is_ok());

        let missing = vec![answer(2, None, Some("great"))];
        assert!(check_answers(&questions, &missing).is_err());

        let unknown = vec![answer(1, Some(SurveyValue::Number(4.0)), None), answer(7, None, Some("x"))];
        assert!(check_answers(&questions, &unknown).is_err());
    }

    #[test]
    fn choices_must_match_options() {
        let questions = vec![question(1, SurveyQuestionType::MultipleChoice, true, 0)];
        let good = vec![answer(1, Some(SurveyValue::Choices(vec!["a".into(), "b".into()])), None)];
        assert!(check_answers(&questions, &good).is_ok());
        let bad = vec![answer(1, Some(SurveyValue::Choice("z".into())), None)];
        assert!(check_answers(&questions, &bad).is_err());
    }

    #[test]
    fn each_question_is_answered_once() {
        let questions = vec![question(1, SurveyQuestionType::Rating, true, 0)];
        let twice = vec![
            answer(1, Some(SurveyValue::Number(5.0)), None),
            answer(1, Some(SurveyValue::Number(5.0)), None),
        ];
        assert!(matches!(
            check_answers(&questions, &twice),
            Err(CoreError::Validation(msg)) if msg.contains("more than once")
        ));
    }

    #[test]
    fn ratings_stay_on_the_scale() {
        let questions = vec![question(1, SurveyQuestionType::Rating, true, 0)];
        for rating in [1.0, 3.5, 5.0] {
            let ok = vec![answer(1, Some(SurveyValue::Number(rating)), None)];
            assert!(check_answers(&questions, &ok).is_ok(), "{rating} should be accepted");
        }
        for rating in [0.0, 6.0, -3.0, 1e9] {
            let bad = vec![answer(1, Some(SurveyValue::Number(rating)), None)];
            assert!(check_answers(&questions, &bad).is_err(), "{rating} should be rejected");
        }
        let text = vec![answer(1, Some(SurveyValue::Choice("10".into())), None)];
        assert!(check_answers(&questions, &text).is_err());
    }

    #[test]
    fn analytics_ignores_stored_out_of_scale_and_repeated_answers() {
        let questions = vec![question(1, SurveyQuestionType::Rating, true, 0)];
        let responses = vec![
            vec![
                answer(1, Some(SurveyValue::Number(4.0)), None),
                answer(1, Some(SurveyValue::Number(1.0)), None),
            ],
            vec![answer(1, Some(SurveyValue::Number(1e6)), None)],
        ];
        let analytics = analyze(&questions, &responses);
        assert_eq!(analytics.questions[0].answered, 2);
        assert_eq!(analytics.average_rating, Some(4.0));
    }

    #[test]
    fn survey_value_deserializes_each_shape() {
        let n: SurveyValue = serde_json::from_str("4").unwrap();
        assert_eq!(n, SurveyValue::Number(4.0));
        let c: SurveyValue = serde_json::from_str("\"a\"").unwrap();
        assert_eq!(c, SurveyValue::Choice("a".into()));
        let cs: SurveyValue = serde_json::from_str("[\"a\",\"b\"]").unwrap();
        assert_eq!(cs, SurveyValue::Choices(vec!["a".into(), "b".into()]));
    }

    #[test]
    fn analytics_aggregates_answers() {
        let questions = vec![
            question(1, SurveyQuestionType::Rating, true, 0),
            question(2, SurveyQuestionType::SingleChoice, false, 1),
            question(3, SurveyQuestionType::OpenEnded, false, 2),
        ];
        let responses = vec![
            vec![
                answer(1, Some(SurveyValue::Number(2.0)), None),
                answer(2, Some(SurveyValue::Choice("a".into())), None),
                answer(3, None, Some("More labs please")),
            ],
            vec![
                answer(1, Some(SurveyValue::Number(3.0)), None),
                answer(2, Some(SurveyValue::Choice("a".into())), None),
            ],
        ];
        let analytics = analyze(&questions, &responses);
        assert_eq!(analytics.total_responses, 2);
        assert_eq!(analytics.average_rating, Some(2.5));
        assert_eq!(analytics.questions[1].option_counts[0].count, 2);
        assert_eq!(analytics.questions[2].text_samples, vec!["More labs please"]);
        assert!(analytics.key_insights.iter().any(|i| i.contains("rated low")));
        assert!(analytics.key_insights.iter().any(|i| i.contains("100% chose 'Label a'")));
    }

    #[test]
    fn satisfaction_pools_ratings_across_surveys() {
        let first = vec![
            question(1, SurveyQuestionType::Rating, true, 0),
            question(2, SurveyQuestionType::SingleChoice, false, 1),
        ];
        let first_responses = vec![
            vec![
                answer(1, Some(SurveyValue::Number(5.0)), None),
                answer(2, Some(SurveyValue::Choice("a".into())), None),
            ],
            vec![answer(1, Some(SurveyValue::Choice("3".into())), None)],
        ];
        let second = vec![question(7, SurveyQuestionType::Rating, true, 0)];
        let second_responses = vec![vec![answer(7, Some(SurveyValue::Number(4.0)), None)]];

        let summary = satisfaction([
            (first.as_slice(), first_responses.as_slice()),
            (second.as_slice(), second_responses.as_slice()),
        ]);
        assert_eq!(summary.survey_count, 2);
        assert_eq!(summary.response_count, 3);
        assert_eq!(summary.rating_count, 3);
        assert_eq!(summary.average_rating, Some(4.0));

        let empty = satisfaction(Vec::<(&[SnapshotQuestion], &[Vec<SurveyAnswer>])>::new());
        assert_eq!(empty.survey_count, 0);
        assert_eq!(empty.average_rating, None);
    }

    #[test]
    fn analytics_without_responses() {
        let analytics = analyze(&[question(1, SurveyQuestionType::Rating, true, 0)], &[]);
        assert_eq!(analytics.average_rating, None);
        assert_eq!(analytics.key_insights, vec!["No responses yet"]);
    }
}
