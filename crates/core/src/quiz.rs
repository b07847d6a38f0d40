//! Quiz templates, grading and result aggregation.
//!
//! Grading is pure: handlers load the quiz's bank items, hand them here with
//! the learner's answers, and persist whatever comes back.

use std::collections::{HashMap, HashSet};

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::question_bank::{AnswerValue, QuestionType};
use crate::types::{DbId, Timestamp};

/// Passing score applied when a course quiz does not set one.
pub const DEFAULT_PASSING_SCORE: i32 = 70;

/// When a quiz is given relative to the course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizType {
    Pre,
    Post,
}

impl QuizType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pre => "pre",
            Self::Post => "post",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "pre" => Ok(Self::Pre),
            "post" => Ok(Self::Post),
            other => Err(CoreError::Validation(format!(
                "Invalid quiz type '{other}'. Must be one of: pre, post"
            ))),
        }
    }
}

/// Difficulty levels of a quiz template.
pub const TEMPLATE_DIFFICULTIES: &[&str] = &["beginner", "intermediate", "advanced"];

pub fn validate_template_difficulty(difficulty: Option<&str>) -> Result<(), CoreError> {
    match difficulty {
        Some(d) if !TEMPLATE_DIFFICULTIES.contains(&d) => Err(CoreError::Validation(format!(
            "Invalid difficulty '{d}'. Must be one of: {TEMPLATE_DIFFICULTIES:?}"
        ))),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Template question items
// ---------------------------------------------------------------------------

/// Reference from a quiz template to a bank item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestionItem {
    pub question_id: DbId,
    pub order: i32,
    /// Overrides the bank item's default points.
    #[serde(default)]
    pub points: Option<i32>,
}

/// Reject duplicate question references and negative point overrides.
pub fn validate_question_items(items: &[QuizQuestionItem]) -> Result<(), CoreError> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.question_id) {
            return Err(CoreError::Validation(format!(
                "Question {} appears more than once",
                item.question_id
            )));
        }
        if item.points.is_some_and(|p| p < 0) {
            return Err(CoreError::Validation(format!(
                "Question {} has negative points",
                item.question_id
            )));
        }
    }
    Ok(())
}

/// Sort items by their `order`, ties broken by question id.
pub fn ordered_items(items: &[QuizQuestionItem]) -> Vec<QuizQuestionItem> {
    let mut sorted = items.to_vec();
    sorted.sort_by_key(|i| (i.order, i.question_id));
    sorted
}

/// Sum of item points, falling back to the bank item's default.
pub fn total_points(items: &[QuizQuestionItem], bank_points: &HashMap<DbId, i32>) -> i32 {
    items
        .iter()
        .map(|i| {
            i.points
                .or_else(|| bank_points.get(&i.question_id).copied())
                .unwrap_or(1)
        })
        .sum()
}

/// Shuffle presentation order in place.
pub fn shuffle<T>(items: &mut [T]) {
    items.shuffle(&mut rand::rng());
}

// ---------------------------------------------------------------------------
// Grading
// ---------------------------------------------------------------------------

/// What grading needs to know about one question.
#[derive(Debug, Clone)]
pub struct GradableQuestion {
    pub question_id: DbId,
    pub question_type: QuestionType,
    pub correct_answer: AnswerValue,
    pub points: i32,
}

/// Outcome for one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionGrade {
    pub question_id: DbId,
    pub is_correct: bool,
    pub needs_review: bool,
    pub points_awarded: i32,
}

/// Outcome for a whole attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptGrade {
    pub earned_points: i32,
    pub total_points: i32,
    /// Percentage, 0..=100.
    pub score: i32,
    pub questions: Vec<QuestionGrade>,
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Whether `selected` answers `question` correctly.
pub fn is_answer_correct(question: &GradableQuestion, selected: &AnswerValue) -> bool {
    match question.question_type {
        QuestionType::Essay | QuestionType::Coding => false,
        QuestionType::TrueFalse => match (&question.correct_answer, selected) {
            (AnswerValue::Single(expected), AnswerValue::Single(given)) => {
                normalize(expected) == normalize(given)
            }
            _ => false,
        },
        QuestionType::MultipleChoice => {
            let expected: HashSet<String> = question
                .correct_answer
                .values()
                .into_iter()
                .map(normalize)
                .collect();
            let given: HashSet<String> = selected.values().into_iter().map(normalize).collect();
            !given.is_empty() && expected == given
        }
        QuestionType::Matching => {
            let expected: Vec<String> = question
                .correct_answer
                .values()
                .into_iter()
                .map(normalize)
                .collect();
            let given: Vec<String> = selected.values().into_iter().map(normalize).collect();
            expected == given
        }
    }
}

/// Grade a single answer. A missing answer is incorrect.
pub fn grade_answer(question: &GradableQuestion, selected: Option<&AnswerValue>) -> QuestionGrade {
    let needs_review = question.question_type.needs_manual_review();
    let is_correct = selected.is_some_and(|s| is_answer_correct(question, s));
    QuestionGrade {
        question_id: question.question_id,
        is_correct,
        needs_review,
        points_awarded: if is_correct { question.points } else { 0 },
    }
}

/// Grade every question of a quiz against the submitted answers.
pub fn grade_attempt(
    questions: &[GradableQuestion],
    answers: &HashMap<DbId, AnswerValue>,
) -> AttemptGrade {
    let grades: Vec<QuestionGrade> = questions
        .iter()
        .map(|q| grade_answer(q, answers.get(&q.question_id)))
        .collect();
    let total_points: i32 = questions.iter().map(|q| q.points).sum();
    let earned_points: i32 = grades.iter().map(|g| g.points_awarded).sum();
    AttemptGrade {
        earned_points,
        total_points,
        score: score_percent(earned_points, total_points),
        questions: grades,
    }
}

/// Rounded percentage of `earned` over `total`; 0 when nothing is gradable.
pub fn score_percent(earned: i32, total: i32) -> i32 {
    if total <= 0 {
        return 0;
    }
    let pct = f64::from(earned) * 100.0 / f64::from(total);
    pct.round().clamp(0.0, 100.0) as i32
}

pub fn is_passed(score: i32, passing_score: Option<i32>) -> bool {
    score >= passing_score.unwrap_or(DEFAULT_PASSING_SCORE)
}

pub fn validate_passing_score(passing_score: Option<i32>) -> Result<(), CoreError> {
    match passing_score {
        Some(p) if !(0..=100).contains(&p) => Err(CoreError::Validation(format!(
            "passing_score {p} must be between 0 and 100"
        ))),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Attempt gating
// ---------------------------------------------------------------------------

/// Reject submissions outside the quiz's availability window.
pub fn check_window(
    now: Timestamp,
    start_at: Option<Timestamp>,
    end_at: Option<Timestamp>,
) -> Result<(), CoreError> {
    if let Some(start) = start_at {
        if now < start {
            return Err(CoreError::Validation("Quiz is not open yet".into()));
        }
    }
    if let Some(end) = end_at {
        if now > end {
            return Err(CoreError::Validation("Quiz is closed".into()));
        }
    }
    Ok(())
}

/// Number of the next attempt, or a conflict when the limit is used up.
pub fn next_attempt_number(attempts_used: i64, max_attempts: Option<i32>) -> Result<i32, CoreError> {
    if let Some(max) = max_attempts {
        if attempts_used >= i64::from(max) {
            return Err(CoreError::Conflict(format!(
                "Maximum of {max} attempts reached"
            )));
        }
    }
    i32::try_from(attempts_used + 1)
        .map_err(|_| CoreError::Internal("attempt counter overflow".into()))
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// How one response to a question was graded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseOutcome {
    /// `None` once the bank question has been deleted.
    pub question_id: Option<DbId>,
    pub question_number: String,
    pub is_correct: bool,
}

/// Correctness rate of one question across all attempts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionStat {
    pub question_id: Option<DbId>,
    /// Position of the question in the first graded attempt.
    pub question_number: String,
    pub responses: i64,
    pub correct: i64,
    pub correct_rate: f64,
}

/// Aggregate results of a course quiz.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizResults {
    pub attempt_count: usize,
    pub average_score: f64,
    pub pass_rate: f64,
    pub questions: Vec<QuestionStat>,
}

/// Summarize attempts (`(score, passed)`) and their graded responses.
pub fn summarize_results(attempts: &[(i32, bool)], responses: &[ResponseOutcome]) -> QuizResults {
    let (average_score, pass_rate) = score_summary(attempts);
    QuizResults {
        attempt_count: attempts.len(),
        average_score,
        pass_rate,
        questions: question_stats(responses),
    }
}

/// `(average score, pass rate)`, both 0 without attempts.
fn score_summary(attempts: &[(i32, bool)]) -> (f64, f64) {
    if attempts.is_empty() {
        return (0.0, 0.0);
    }
    let n = attempts.len() as f64;
    let sum: f64 = attempts.iter().map(|(s, _)| f64::from(*s)).sum();
    let passed = attempts.iter().filter(|(_, p)| *p).count() as f64;
    (round2(sum / n), round2(passed * 100.0 / n))
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum QuestionKey {
    Id(DbId),
    /// Responses whose bank question is gone fall back to their position.
    Orphan(String),
}

/// Per-question correctness. Randomized quizzes put a question at different
/// positions, so responses are grouped by question id.
fn question_stats(responses: &[ResponseOutcome]) -> Vec<QuestionStat> {
    let mut index: HashMap<QuestionKey, usize> = HashMap::new();
    let mut stats: Vec<QuestionStat> = Vec::new();
    for r in responses {
        let key = match r.question_id {
            Some(id) => QuestionKey::Id(id),
            None => QuestionKey::Orphan(r.question_number.clone()),
        };
        let slot = *index.entry(key).or_insert_with(|| {
            stats.push(QuestionStat {
                question_id: r.question_id,
                question_number: r.question_number.clone(),
                responses: 0,
                correct: 0,
                correct_rate: 0.0,
            });
            stats.len() - 1
        });
        let stat = &mut stats[slot];
        stat.responses += 1;
        stat.correct += i64::from(r.is_correct);
    }
    for stat in &mut stats {
        stat.correct_rate = round2(stat.correct as f64 * 100.0 / stat.responses as f64);
    }
    stats.sort_by(|a, b| {
        natural_cmp(&a.question_number, &b.question_number).then(a.question_id.cmp(&b.question_id))
    });
    stats
}

// ---------------------------------------------------------------------------
// Pre/post comparison
// ---------------------------------------------------------------------------

/// Attempts of one quiz type across a course.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseSummary {
    pub attempt_count: usize,
    pub average_score: f64,
    pub pass_rate: f64,
}

/// Change in correctness of a question asked both before and after the course.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionImprovement {
    pub question_id: DbId,
    pub question_number: String,
    pub pre_correct_rate: f64,
    pub post_correct_rate: f64,
    /// Percentage points gained, negative when learners did worse.
    pub improvement: f64,
}

/// Pre-test against post-test results of a course.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizComparison {
    pub pre: PhaseSummary,
    pub post: PhaseSummary,
    /// Post average minus pre average; `None` until both phases have attempts.
    pub average_improvement: Option<f64>,
    /// Questions answered in both phases, largest gain first.
    pub questions: Vec<QuestionImprovement>,
}

/// Compare pre and post attempts (`(score, passed)`) and their responses.
pub fn compare_phases(
    pre_attempts: &[(i32, bool)],
    post_attempts: &[(i32, bool)],
    pre_responses: &[ResponseOutcome],
    post_responses: &[ResponseOutcome],
) -> QuizComparison {
    let phase = |attempts: &[(i32, bool)]| {
        let (average_score, pass_rate) = score_summary(attempts);
        PhaseSummary {
            attempt_count: attempts.len(),
            average_score,
            pass_rate,
        }
    };
    let pre = phase(pre_attempts);
    let post = phase(post_attempts);
    let average_improvement = (pre.attempt_count > 0 && post.attempt_count > 0)
        .then(|| round2(post.average_score - pre.average_score));

    let pre_rates: HashMap<DbId, f64> = question_stats(pre_responses)
        .into_iter()
        .filter_map(|s| Some((s.question_id?, s.correct_rate)))
        .collect();
    let mut questions: Vec<QuestionImprovement> = question_stats(post_responses)
        .into_iter()
        .filter_map(|s| {
            let question_id = s.question_id?;
            let pre_correct_rate = *pre_rates.get(&question_id)?;
            Some(QuestionImprovement {
                question_id,
                question_number: s.question_number,
                pre_correct_rate,
                post_correct_rate: s.correct_rate,
                improvement: round2(s.correct_rate - pre_correct_rate),
            })
        })
        .collect();
    questions.sort_by(|a, b| {
        b.improvement
            .total_cmp(&a.improvement)
            .then_with(|| natural_cmp(&a.question_number, &b.question_number))
    });

    QuizComparison {
        pre,
        post,
        average_improvement,
        questions,
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Numeric-aware ordering so question "10" sorts after "9".
fn natural_cmp(a: &str, b: &str) -> std::cmp::Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn q(id: DbId, question_type: QuestionType, answer: AnswerValue, points: i32) -> GradableQuestion {
        GradableQuestion {
            question_id: id,
            question_type,
            correct_answer: answer,
            points,
        }
    }

    fn single(v: &str) -> AnswerValue {
        AnswerValue::Single(v.into())
    }

    fn multi(vs: &[&str]) -> AnswerValue {
        AnswerValue::Multiple(vs.iter().map(|v| v.to_string()).collect())
    }

    #[test]
    fn multiple_choice_is_case_and_order_insensitive() {
        let question = q(1, QuestionType::MultipleChoice, multi(&["a", "c"]), 2);
        assert!(is_answer_correct(&question, &multi(&["C", " a "])));
        assert!(!is_answer_correct(&question, &multi(&["a"])));
        assert!(!is_answer_correct(&question, &multi(&["a", "b", "c"])));
    }

    #[test]
    fn matching_requires_same_order() {
        let question = q(1, QuestionType::Matching, multi(&["a-1", "b-2"]), 1);
        assert!(is_answer_correct(&question, &multi(&["A-1", "b-2"])));
        assert!(!is_answer_correct(&question, &multi(&["b-2", "a-1"])));
    }

    #[test]
    fn essay_needs_review_and_scores_zero() {
        let question = q(5, QuestionType::Essay, single(""), 10);
        let grade = grade_answer(&question, Some(&single("long answer")));
        assert!(!grade.is_correct);
        assert!(grade.needs_review);
        assert_eq!(grade.points_awarded, 0);
    }

    #[test]
    fn grades_whole_attempt() {
        let questions = vec![
            q(1, QuestionType::TrueFalse, single("true"), 1),
            q(2, QuestionType::MultipleChoice, single("b"), 2),
            q(3, QuestionType::MultipleChoice, single("a"), 1),
        ];
        let mut answers = HashMap::new();
        answers.insert(1, single("True"));
        answers.insert(2, single("b"));
        answers.insert(3, single("d"));
        let grade = grade_attempt(&questions, &answers);
        assert_eq!(grade.earned_points, 3);
        assert_eq!(grade.total_points, 4);
        assert_eq!(grade.score, 75);
        assert!(grade.questions[0].is_correct);
        assert!(!grade.questions[2].is_correct);
    }

    #[test]
    fn unanswered_questions_are_wrong() {
        let questions = vec![q(1, QuestionType::TrueFalse, single("false"), 1)];
        let grade = grade_attempt(&questions, &HashMap::new());
        assert_eq!(grade.score, 0);
        assert!(!grade.questions[0].is_correct);
    }

    #[test]
    fn score_and_pass() {
        assert_eq!(score_percent(2, 3), 67);
        assert_eq!(score_percent(0, 0), 0);
        assert!(is_passed(70, None));
        assert!(!is_passed(69, None));
        assert!(is_passed(50, Some(50)));
        assert!(validate_passing_score(Some(101)).is_err());
    }

    #[test]
    fn total_points_uses_overrides_then_bank() {
        let items = vec![
            QuizQuestionItem { question_id: 1, order: 1, points: Some(5) },
            QuizQuestionItem { question_id: 2, order: 2, points: None },
            QuizQuestionItem { question_id: 3, order: 3, points: None },
        ];
        let bank = HashMap::from([(1, 1), (2, 3)]);
        assert_eq!(total_points(&items, &bank), 9);
    }

    #[test]
    fn duplicate_items_rejected() {
        let items = vec![
            QuizQuestionItem { question_id: 1, order: 1, points: None },
            QuizQuestionItem { question_id: 1, order: 2, points: None },
        ];
        assert!(validate_question_items(&items).is_err());
        assert_eq!(ordered_items(&items[..1]).len(), 1);
    }

    #[test]
    fn window_and_attempt_limits() {
        let now = Utc::now();
        assert!(check_window(now, Some(now - Duration::hours(1)), Some(now + Duration::hours(1))).is_ok());
        assert!(check_window(now, Some(now + Duration::hours(1)), None).is_err());
        assert!(check_window(now, None, Some(now - Duration::hours(1))).is_err());
        assert_eq!(next_attempt_number(0, Some(1)).unwrap(), 1);
        assert!(matches!(next_attempt_number(1, Some(1)), Err(CoreError::Conflict(_))));
        assert_eq!(next_attempt_number(7, None).unwrap(), 8);
    }

    fn outcome(id: Option<DbId>, number: &str, is_correct: bool) -> ResponseOutcome {
        ResponseOutcome {
            question_id: id,
            question_number: number.into(),
            is_correct,
        }
    }

    #[test]
    fn summarizes_results() {
        let attempts = vec![(80, true), (60, false)];
        let responses = vec![
            outcome(Some(7), "10", true),
            outcome(Some(3), "2", false),
            outcome(Some(3), "2", true),
        ];
        let results = summarize_results(&attempts, &responses);
        assert_eq!(results.attempt_count, 2);
        assert_eq!(results.average_score, 70.0);
        assert_eq!(results.pass_rate, 50.0);
        assert_eq!(results.questions[0].question_number, "2");
        assert_eq!(results.questions[0].question_id, Some(3));
        assert_eq!(results.questions[0].correct_rate, 50.0);
        assert_eq!(results.questions[1].correct_rate, 100.0);
    }

    #[test]
    fn shuffled_positions_group_by_question() {
        // Two attempts of a randomized quiz: question 5 was first, then second.
        let responses = vec![
            outcome(Some(5), "1", true),
            outcome(Some(6), "2", false),
            outcome(Some(6), "1", false),
            outcome(Some(5), "2", true),
        ];
        let results = summarize_results(&[(50, false), (50, false)], &responses);
        assert_eq!(results.questions.len(), 2);
        let five = results.questions.iter().find(|q| q.question_id == Some(5)).unwrap();
        assert_eq!(five.responses, 2);
        assert_eq!(five.correct_rate, 100.0);
        let six = results.questions.iter().find(|q| q.question_id == Some(6)).unwrap();
        assert_eq!(six.correct_rate, 0.0);
    }

    #[test]
    fn deleted_questions_fall_back_to_position() {
        let responses = vec![
            outcome(None, "1", true),
            outcome(None, "1", false),
            outcome(None, "2", true),
            outcome(Some(9), "1", true),
        ];
        let results = summarize_results(&[], &responses);
        assert_eq!(results.questions.len(), 3);
        let orphan = results
            .questions
            .iter()
            .find(|q| q.question_id.is_none() && q.question_number == "1")
            .unwrap();
        assert_eq!(orphan.responses, 2);
    }

    #[test]
    fn compares_pre_and_post_phases() {
        let pre_attempts = vec![(40, false), (60, false)];
        let post_attempts = vec![(90, true), (70, true)];
        let pre_responses = vec![
            outcome(Some(1), "1", false),
            outcome(Some(1), "1", true),
            outcome(Some(2), "2", false),
            outcome(Some(2), "2", false),
            outcome(Some(3), "3", true),
        ];
        let post_responses = vec![
            outcome(Some(1), "1", true),
            outcome(Some(1), "1", true),
            outcome(Some(2), "2", true),
            outcome(Some(2), "2", false),
            outcome(Some(4), "3", true),
        ];
        let comparison = compare_phases(&pre_attempts, &post_attempts, &pre_responses, &post_responses);
        assert_eq!(comparison.pre.average_score, 50.0);
        assert_eq!(comparison.pre.pass_rate, 0.0);
        assert_eq!(comparison.post.average_score, 80.0);
        assert_eq!(comparison.post.pass_rate, 100.0);
        assert_eq!(comparison.average_improvement, Some(30.0));

        // Questions 3 and 4 were asked in only one phase.
        assert_eq!(comparison.questions.len(), 2);
        assert_eq!(comparison.questions[0].question_id, 1);
        assert_eq!(comparison.questions[0].improvement, 50.0);
        assert_eq!(comparison.questions[1].question_id, 2);
        assert_eq!(comparison.questions[1].pre_correct_rate, 0.0);
        assert_eq!(comparison.questions[1].post_correct_rate, 50.0);
    }

    #[test]
    fn comparison_without_post_attempts_has_no_improvement() {
        let comparison = compare_phases(&[(55, false)], &[], &[outcome(Some(1), "1", true)], &[]);
        assert_eq!(comparison.pre.attempt_count, 1);
        assert_eq!(comparison.post.attempt_count, 0);
        assert_eq!(comparison.average_improvement, None);
        assert!(comparison.questions.is_empty());
    }

    #[test]
    fn empty_results() {
        let results = summarize_results(&[], &[]);
        assert_eq!(results.attempt_count, 0);
        assert_eq!(results.pass_rate, 0.0);
    }
}
