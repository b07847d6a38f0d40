//! Helpers around AI-assisted quiz drafting.
//!
//! The model is prompted with chunks of catalog content and asked to answer
//! with a JSON array of questions. Everything here is text handling; the
//! HTTP call lives in the API crate.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::question_bank::{AnswerValue, QuestionOption};
use crate::quiz::QuizType;

/// Words per content chunk fed to the model.
pub const CHUNK_WORDS: usize = 50;

/// Upper bound on questions per generation request.
pub const MAX_GENERATED_QUESTIONS: usize = 20;

/// Default number of questions when the request does not say.
pub const DEFAULT_GENERATED_QUESTIONS: usize = 5;

/// Correct answer as the model reports it: an option index or the option text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GeneratedAnswer {
    Index(usize),
    Text(String),
}

/// One drafted question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: GeneratedAnswer,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Split texts into chunks of at most `words` whitespace-separated words.
pub fn split_into_chunks(texts: &[String], words: usize) -> Vec<String> {
    let words = words.max(1);
    let mut chunks = Vec::new();
    for text in texts {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        for window in tokens.chunks(words) {
            chunks.push(window.join(" "));
        }
    }
    chunks
}

/// Clamp a requested question count.
pub fn question_count(requested: Option<usize>) -> usize {
    requested
        .unwrap_or(DEFAULT_GENERATED_QUESTIONS)
        .clamp(1, MAX_GENERATED_QUESTIONS)
}

/// Build the user prompt sent to the model.
pub fn build_prompt(
    catalog_title: &str,
    chunks: &[String],
    quiz_type: QuizType,
    count: usize,
    context: Option<&str>,
) -> String {
    let focus = match quiz_type {
        QuizType::Pre => "check prior knowledge before the course starts",
        QuizType::Post => "check what learners retained after finishing the course",
    };
    let mut prompt = format!(
        "Write {count} multiple-choice questions for the course \"{catalog_title}\" that {focus}.\n"
    );
    if let Some(extra) = context.map(str::trim).filter(|c| !c.is_empty()) {
        prompt.push_str(&format!("Additional instructions: {extra}\n"));
    }
    prompt.push_str("Course material:\n");
    for (i, chunk) in chunks.iter().enumerate() {
        prompt.push_str(&format!("[{}] {chunk}\n", i + 1));
    }
    prompt.push_str(
        "Respond with only a JSON array. Each element has \"question\", \"options\" \
         (4 strings), \"correct_answer\" (index of the correct option), \"explanation\", \
         \"difficulty\" (easy|medium|hard) and \"tags\".",
    );
    prompt
}

/// Extract the JSON array of questions from a model reply.
///
/// Tolerates prose or code fences around the array.
pub fn parse_generated_questions(text: &str) -> Result<Vec<GeneratedQuestion>, CoreError> {
    let start = text.find('[');
    let end = text.rfind(']');
    let json = match (start, end) {
        (Some(s), Some(e)) if s < e => &text[s..=e],
        _ => {
            return Err(CoreError::Internal(
                "Model reply did not contain a JSON array".into(),
            ))
        }
    };
    let questions: Vec<GeneratedQuestion> = serde_json::from_str(json)
        .map_err(|e| CoreError::Internal(format!("Model reply was not valid question JSON: {e}")))?;
    Ok(questions
        .into_iter()
        .filter(|q| !q.question.trim().is_empty() && q.options.len() >= 2)
        .collect())
}

/// Convert a draft to bank options (`a`, `b`, ...) and the correct option id.
pub fn to_bank_options(
    question: &GeneratedQuestion,
) -> Result<(Vec<QuestionOption>, AnswerValue), CoreError> {
    let correct_index = match &question.correct_answer {
        GeneratedAnswer::Index(i) => *i,
        GeneratedAnswer::Text(text) => question
            .options
            .iter()
            .position(|o| o.trim().eq_ignore_ascii_case(text.trim()))
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Correct answer '{text}' is not one of the options"
                ))
            })?,
    };
    if correct_index >= question.options.len() {
        return Err(CoreError::Validation(format!(
            "Correct answer index {correct_index} is out of range"
        )));
    }
    if question.options.len() > 26 {
        return Err(CoreError::Validation("Too many options".into()));
    }
    let options: Vec<QuestionOption> = question
        .options
        .iter()
        .enumerate()
        .map(|(i, content)| QuestionOption {
            option_id: option_id(i),
            content: content.clone(),
            is_correct: i == correct_index,
        })
        .collect();
    Ok((options, AnswerValue::Single(option_id(correct_index))))
}

fn option_id(index: usize) -> String {
    char::from(b'a' + index as u8).to_string()
}

/// Deterministic placeholder questions used when no model is configured.
pub fn template_questions(topics: &[String], quiz_type: QuizType, count: usize) -> Vec<GeneratedQuestion> {
    const PRE: &[&str] = &[
        "Which statement correctly describes {}?",
        "Which of the following is NOT a key characteristic of {}?",
        "What is the main benefit of {}?",
    ];
    const POST: &[&str] = &[
        "In a production scenario, what is the best way to apply {}?",
        "Which configuration of {} carries a security risk?",
        "What matters most when designing a cost-efficient solution with {}?",
    ];
    let templates = match quiz_type {
        QuizType::Pre => PRE,
        QuizType::Post => POST,
    };
    let fallback = ["the course topic".to_string()];
    let topics = if topics.is_empty() { &fallback[..] } else { topics };
    let difficulties = ["easy", "medium", "hard"];

    (0..count)
        .map(|i| {
            let topic = &topics[i % topics.len()];
            let template = templates[i % templates.len()];
            GeneratedQuestion {
                question: template.replace("{}", topic),
                options: (1..=4)
                    .map(|n| format!("{topic}: statement {n}"))
                    .collect(),
                correct_answer: GeneratedAnswer::Index(i % 4),
                explanation: Some(format!("This question checks understanding of {topic}.")),
                difficulty: Some(difficulties[i % difficulties.len()].to_string()),
                tags: vec![topic.clone()],
            }
        })
        .collect()
}
