// src/extraction/gemini.rs

use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use url::Url;

use super::KeySource;
use super::parse::parse_model_response;
use crate::config::Config;
use crate::error::{AppError, GradingError};
use crate::grading::RawKey;

const PROMPT: &str = r#"You are an expert at extracting answer keys from images. The image contains a list of question numbers followed by their correct answers (A, B, C, or D).

Extract all question numbers and their corresponding correct answers.

Format your response as a JSON object where keys are question numbers (as strings, e.g., "101") and values are their correct answers (as single uppercase letters, e.g., "B").

Example output:
{"101": "B", "102": "D", "103": "C"}

Ensure the JSON is valid and contains only the key-value pairs without any additional text or formatting. If a question is not found, do not include it."#;

/// Longest slice of an upstream error body echoed back to the caller.
const ERROR_DETAIL_LIMIT: usize = 300;

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    InlineData { inline_data: InlineData<'a> },
}

#[derive(Debug, Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Reads answer keys with a Gemini vision model over its REST API.
pub struct GeminiKeySource {
    http: reqwest::Client,
    endpoint: Url,
    api_key: String,
    model: String,
}

impl GeminiKeySource {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let endpoint = format!(
            "{}/models/{}:generateContent",
            config.gemini_api_base.trim_end_matches('/'),
            config.gemini_model
        );
        let endpoint = Url::parse(&endpoint)
            .map_err(|e| AppError::InternalServerError(format!("Bad model endpoint: {}", e)))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.extraction_timeout_secs))
            .build()
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;

        Ok(Self {
            http,
            endpoint,
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl KeySource for GeminiKeySource {
    async fn extract(&self, image: &[u8], mime_type: &str) -> Result<RawKey, GradingError> {
        tracing::debug!(
            "Sending {} byte {} image to model {}",
            image.len(),
            mime_type,
            self.model
        );

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text { text: PROMPT },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type,
                            data: STANDARD.encode(image),
                        },
                    },
                ],
            }],
        };

        let response = self
            .http
            .post(self.endpoint.clone())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Model request failed: {:?}", e);
                GradingError::ExtractionFailure(format!("model request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            let detail: String = detail.chars().take(ERROR_DETAIL_LIMIT).collect();
            tracing::warn!("Model returned {}: {}", status, detail);
            return Err(GradingError::ExtractionFailure(format!(
                "model returned {}: {}",
                status, detail
            )));
        }

        let body: GenerateContentResponse = response.json().await.map_err(|e| {
            GradingError::ExtractionFailure(format!("unreadable model response: {}", e))
        })?;

        let text: String = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        tracing::debug!("Model raw response text: {}", text);

        if text.trim().is_empty() {
            return Err(GradingError::ExtractionFailure(
                "model returned no text".to_string(),
            ));
        }

        parse_model_response(&text)
    }
}
