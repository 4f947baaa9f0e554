//! Google Gemini adapter (Generative Language `generateContent` API).

use std::fmt;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use fitgen_db::models::WorkoutBody;

use super::config::{GeneratorConfig, http_client};
use super::prompt::{CONNECTION_PROBE, build_workout_prompt};
use super::{WorkoutGenerator, interpret_response};
use crate::profile::UserProfile;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
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

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

/// Generator backed by a Gemini model.
pub struct GeminiGenerator {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
}

impl GeminiGenerator {
    pub fn new(config: &GeneratorConfig) -> Result<Self> {
        Ok(Self {
            api_key: config.api_key.clone(),
            model: config.effective_model().to_owned(),
            base_url: config
                .base_url
                .as_deref()
                .unwrap_or(API_BASE_URL)
                .trim_end_matches('/')
                .to_owned(),
            client: http_client(config.timeout)?,
        })
    }

    /// Endpoint URL. The API key travels in a header, never in the URL.
    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// Send one prompt and return the concatenated text of the first candidate.
    async fn complete(&self, prompt: &str, config: Option<GenerationConfig>) -> Result<String> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: config,
        };

        debug!(model = %self.model, "sending request to Gemini API");
        let response = self
            .client
            .post(self.url())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Gemini request failed")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(reqwest::Error::without_url)
            .context("failed to read Gemini response body")?;
        if !status.is_success() {
            bail!("Gemini API returned {status}: {}", truncate(&body, 300));
        }

        let parsed: GeminiResponse =
            serde_json::from_str(&body).context("failed to decode Gemini response envelope")?;
        if let Some(err) = parsed.error {
            bail!("Gemini API error: {}", err.message);
        }

        let Some(candidate) = parsed.candidates.unwrap_or_default().into_iter().next() else {
            return Ok(String::new());
        };
        if candidate.finish_reason.as_deref() == Some("MAX_TOKENS") {
            warn!(model = %self.model, "Gemini reply was cut off at the output token limit");
        }
        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        Ok(text)
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[async_trait]
impl WorkoutGenerator for GeminiGenerator {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, profile: &UserProfile, history: Option<&str>) -> Option<WorkoutBody> {
        let prompt = build_workout_prompt(profile, history);
        let outcome = self
            .complete(
                &prompt,
                Some(GenerationConfig {
                    temperature: 0.7,
                    max_output_tokens: None,
                }),
            )
            .await;
        interpret_response(self.name(), outcome)
    }

    async fn check_connection(&self) -> Result<String> {
        let reply = self.complete(CONNECTION_PROBE, None).await?;
        let reply = reply.trim();
        if reply.is_empty() {
            bail!("Gemini returned an empty reply");
        }
        Ok(reply.to_owned())
    }
}

impl fmt::Debug for GeminiGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiGenerator")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}
