//! AI-assisted quiz drafting.
//!
//! [`HttpQuizGenerator`] sends catalog content to a Messages-style model
//! endpoint. [`TemplateQuizGenerator`] produces deterministic drafts from
//! module titles and is used when no API key is configured.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tnc_core::error::CoreError;
use tnc_core::quiz::QuizType;
use tnc_core::quiz_generation::{
    build_prompt, parse_generated_questions, split_into_chunks, template_questions,
    GeneratedQuestion, CHUNK_WORDS,
};

use crate::config::AiConfig;

/// Model calls can be slow; allow well past the default request budget.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const MAX_TOKENS: u32 = 4096;

const API_VERSION: &str = "2023-06-01";

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Model API error ({status}): {body}")]
    ApiError { status: u16, body: String },

    #[error(transparent)]
    Parse(#[from] CoreError),
}

/// What to draft questions about.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub catalog_title: String,
    /// Short topic names, one per module.
    pub topics: Vec<String>,
    /// Longer module and lab text the model reads.
    pub content: Vec<String>,
    pub quiz_type: QuizType,
    pub count: usize,
    pub context: Option<String>,
}

#[async_trait]
pub trait QuizGenerator: Send + Sync {
    /// `model` or `template`, reported by `/health`.
    fn mode(&self) -> &'static str;

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<GeneratedQuestion>, GenerationError>;
}

/// Pick the HTTP generator when a key is configured, the template one otherwise.
pub fn from_config(config: &AiConfig) -> Box<dyn QuizGenerator> {
    match &config.api_key {
        Some(key) => Box::new(HttpQuizGenerator::new(
            config.api_url.clone(),
            key.clone(),
            config.model.clone(),
        )),
        None => {
            tracing::info!("AI_API_KEY not set, quiz drafts use the template generator");
            Box::new(TemplateQuizGenerator)
        }
    }
}

// ---------------------------------------------------------------------------
// HTTP
// ---------------------------------------------------------------------------

pub struct HttpQuizGenerator {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl HttpQuizGenerator {
    pub fn new(api_url: String, api_key: String, model: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            api_url,
            api_key,
            model,
        }
    }
}

#[async_trait]
impl QuizGenerator for HttpQuizGenerator {
    fn mode(&self) -> &'static str {
        "model"
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<GeneratedQuestion>, GenerationError> {
        let chunks = split_into_chunks(&request.content, CHUNK_WORDS);
        let prompt = build_prompt(
            &request.catalog_title,
            &chunks,
            request.quiz_type,
            request.count,
            request.context.as_deref(),
        );
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let reply: MessagesResponse = response.json().await?;
        let text: String = reply
            .content
            .into_iter()
            .filter(|b| b.kind == "text")
            .filter_map(|b| b.text)
            .collect::<Vec<_>>()
            .join("\n");

        let mut questions = parse_generated_questions(&text)?;
        questions.truncate(request.count);
        tracing::info!(
            model = %self.model,
            requested = request.count,
            drafted = questions.len(),
            "Quiz questions drafted"
        );
        Ok(questions)
    }
}

// ---------------------------------------------------------------------------
// Template
// ---------------------------------------------------------------------------

pub struct TemplateQuizGenerator;

#[async_trait]
impl QuizGenerator for TemplateQuizGenerator {
    fn mode(&self) -> &'static str {
        "template"
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<GeneratedQuestion>, GenerationError> {
        Ok(template_questions(
            &request.topics,
            request.quiz_type,
            request.count,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(count: usize) -> GenerationRequest {
        GenerationRequest {
            catalog_title: "Cloud Foundations".into(),
            topics: vec!["IAM".into(), "VPC".into()],
            content: vec![],
            quiz_type: QuizType::Pre,
            count,
            context: None,
        }
    }

    #[tokio::test]
    async fn template_generator_cycles_topics() {
        let questions = TemplateQuizGenerator.generate(&request(3)).await.unwrap();
        assert_eq!(questions.len(), 3);
        assert_eq!(questions[0].tags, vec!["IAM".to_string()]);
        assert_eq!(questions[1].tags, vec!["VPC".to_string()]);
        assert_eq!(questions[2].tags, vec!["IAM".to_string()]);
    }

    #[test]
    fn text_blocks_are_read_from_reply() {
        let reply: MessagesResponse = serde_json::from_str(
            r#"{"content":[{"type":"text","text":"[]"},{"type":"tool_use","id":"x"}]}"#,
        )
        .unwrap();
        assert_eq!(reply.content.len(), 2);
        assert_eq!(reply.content[0].text.as_deref(), Some("[]"));
        assert!(reply.content[1].text.is_none());
    }
}
