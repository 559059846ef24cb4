//! Google Gemini `generateContent` client.

use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::analysis::{self, AnalysisError, Analyzer};
use crate::i18n::Language;
use crate::model::{AnalysisResult, UploadedImage};
use crate::schema::{self, ScorePolicy};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest<'a> {
    pub system_instruction: Content<'a>,
    pub contents: Vec<Content<'a>>,
    pub generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
pub struct Content<'a> {
    pub parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Part<'a> {
    Text(String),
    InlineData(InlineData<'a>),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData<'a> {
    pub mime_type: &'a str,
    pub data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig<'a> {
    pub response_mime_type: &'static str,
    pub response_schema: &'a Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, if it has any.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

pub fn build_request(image: &UploadedImage, language: Language) -> GenerateContentRequest<'_> {
    GenerateContentRequest {
        system_instruction: Content {
            parts: vec![Part::Text(analysis::system_instruction(language))],
        },
        contents: vec![Content {
            parts: vec![
                Part::InlineData(InlineData {
                    mime_type: &image.mime_type,
                    data: &image.base64,
                }),
                Part::Text(analysis::instruction(language)),
            ],
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
            response_schema: schema::response_schema(),
        },
    }
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    score_policy: ScorePolicy,
}

impl GeminiClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        score_policy: ScorePolicy,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            score_policy,
        }
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[async_trait]
impl Analyzer for GeminiClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn analyze(
        &self,
        image: &UploadedImage,
        language: Language,
    ) -> Result<AnalysisResult, AnalysisError> {
        analysis::check_input(image)?;

        let started = Instant::now();
        info!(
            model = %self.model,
            mime_type = %image.mime_type,
            bytes = image.byte_len(),
            %language,
            "sending analysis request to Gemini"
        );

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&build_request(image, language))
            .send()
            .await
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;

        debug!(
            %status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            body = %body.chars().take(500).collect::<String>(),
            "Gemini responded"
        );

        if !status.is_success() {
            return Err(AnalysisError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&body).map_err(|e| AnalysisError::Malformed(e.to_string()))?;

        if let Some(reason) = parsed
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.clone())
        {
            return Err(AnalysisError::Blocked(reason));
        }

        let Some(text) = parsed.text() else {
            let finish = parsed
                .candidates
                .first()
                .and_then(|c| c.finish_reason.as_deref())
                .unwrap_or("none");
            warn!(finish_reason = finish, "Gemini candidate carried no text");
            return Err(AnalysisError::EmptyResponse);
        };

        let result = schema::parse_result(&text, self.score_policy)?;
        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            overall = result.overall_score,
            features = result.features.len(),
            "analysis complete"
        );
        Ok(result)
    }
}
