//! HTTP client for the Gemini `generateContent` API.
//!
//! Configuration is via [`crate::config::AppConfig`]; the API key comes from
//! `GEMINI_API_KEY` (or `API_KEY`) and is read once at startup.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use super::{GenerationError, GenerationRequest, TextGenerator};

/// Public Gemini endpoint.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// HTTP client for the Gemini API.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl GeminiClient {
    /// Create with explicit configuration.
    ///
    /// Fails only when the underlying HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty()),
            client,
        })
    }

    /// Read the API key from the environment.
    pub fn api_key_from_env() -> Option<String> {
        std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .ok()
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn url_for(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    /// Concatenate the text parts of the first candidate.
    fn reply_text(response: GenerateContentResponse) -> Result<String, GenerationError> {
        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.is_empty() {
            Err(GenerationError::EmptyReply)
        } else {
            Ok(text)
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let Some(ref key) = self.api_key else {
            return Err(GenerationError::Unauthorized);
        };

        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: &request.prompt,
                }],
            }],
        };

        tracing::debug!(
            model = %request.model,
            prompt_chars = request.prompt.chars().count(),
            "Sending generateContent request"
        );

        let response = self
            .client
            .post(self.url_for(&request.model))
            .header("x-goog-api-key", key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let parsed: GenerateContentResponse = response.json().await?;
            Self::reply_text(parsed)
        } else {
            let body = response.text().await.unwrap_or_default();
            match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    Err(GenerationError::Unauthorized)
                }
                _ => Err(GenerationError::Server(format!("{}: {}", status, body))),
            }
        }
    }
}
