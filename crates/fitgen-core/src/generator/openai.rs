//! OpenAI chat-completions adapter.
//!
//! Works against any server speaking the `/chat/completions` protocol when
//! `base_url` is overridden.

use std::fmt;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use fitgen_db::models::WorkoutBody;

use super::config::{GeneratorConfig, http_client};
use super::prompt::{CONNECTION_PROBE, TRAINER_SYSTEM_MESSAGE, build_workout_prompt};
use super::{WorkoutGenerator, interpret_response};
use crate::profile::UserProfile;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

const API_BASE_URL: &str = "https://api.openai.com/v1";

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 1500;

#[derive(Debug, Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

/// Generator backed by an OpenAI chat model.
pub struct OpenAiGenerator {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
}

impl OpenAiGenerator {
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

    async fn complete(&self, system: Option<&str>, prompt: &str) -> Result<String> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system {
            messages.push(OpenAiMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(OpenAiMessage {
            role: "user",
            content: prompt,
        });

        let request = OpenAiRequest {
            model: &self.model,
            messages,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        debug!(model = %self.model, "sending chat completion request");
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("chat completion request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!(
                "chat completion API returned {status}: {}",
                body.chars().take(300).collect::<String>()
            );
        }

        let parsed: OpenAiResponse = response
            .json()
            .await
            .context("failed to decode chat completion response")?;
        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }
}

#[async_trait]
impl WorkoutGenerator for OpenAiGenerator {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, profile: &UserProfile, history: Option<&str>) -> Option<WorkoutBody> {
        let prompt = build_workout_prompt(profile, history);
        let outcome = self.complete(Some(TRAINER_SYSTEM_MESSAGE), &prompt).await;
        interpret_response(self.name(), outcome)
    }

    async fn check_connection(&self) -> Result<String> {
        let reply = self.complete(None, CONNECTION_PROBE).await?;
        let reply = reply.trim();
        if reply.is_empty() {
            bail!("chat completion API returned an empty reply");
        }
        Ok(reply.to_owned())
    }
}

impl fmt::Debug for OpenAiGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiGenerator")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}
