//! Provider selection and construction of the configured generator.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;

use super::WorkoutGenerator;
use super::gemini::GeminiGenerator;
use super::openai::OpenAiGenerator;

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Upper bound on the TCP/TLS connect phase.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Which LLM provider backs workout generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provider {
    #[default]
    Gemini,
    OpenAi,
}

impl Provider {
    /// Environment variable holding this provider's API key.
    pub fn api_key_env(self) -> &'static str {
        match self {
            Self::Gemini => "GEMINI_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Self::Gemini => super::gemini::DEFAULT_MODEL,
            Self::OpenAi => super::openai::DEFAULT_MODEL,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gemini => f.write_str("gemini"),
            Self::OpenAi => f.write_str("openai"),
        }
    }
}

impl FromStr for Provider {
    type Err = ProviderParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "openai" => Ok(Self::OpenAi),
            other => Err(ProviderParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid provider name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderParseError(pub String);

impl fmt::Display for ProviderParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid LLM provider: {:?} (expected gemini or openai)",
            self.0
        )
    }
}

impl std::error::Error for ProviderParseError {}

/// Everything needed to talk to the remote model.
#[derive(Clone)]
pub struct GeneratorConfig {
    pub provider: Provider,
    pub api_key: String,
    /// Model name; the provider default when `None`.
    pub model: Option<String>,
    /// Override for the API root, e.g. a proxy or a local mock.
    pub base_url: Option<String>,
    pub timeout: Duration,
}

impl GeneratorConfig {
    pub fn new(provider: Provider, api_key: impl Into<String>) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
            model: None,
            base_url: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// The model that will actually be requested.
    pub fn effective_model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }
}

impl fmt::Debug for GeneratorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorConfig")
            .field("provider", &self.provider)
            .field("model", &self.effective_model())
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Build an HTTP client whose every request is bounded by `timeout`.
pub(crate) fn http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .connect_timeout(timeout.min(Duration::from_secs(CONNECT_TIMEOUT_SECS)))
        .timeout(timeout)
        .build()
        .context("failed to build HTTP client")
}

/// Construct the generator described by `config`.
pub fn build_generator(config: &GeneratorConfig) -> Result<Arc<dyn WorkoutGenerator>> {
    anyhow::ensure!(
        !config.api_key.trim().is_empty(),
        "no API key configured for {} (set {})",
        config.provider,
        config.provider.api_key_env()
    );

    let generator: Arc<dyn WorkoutGenerator> = match config.provider {
        Provider::Gemini => Arc::new(GeminiGenerator::new(config)?),
        Provider::OpenAi => Arc::new(OpenAiGenerator::new(config)?),
    };
    tracing::info!(
        provider = %config.provider,
        model = config.effective_model(),
        timeout_secs = config.timeout.as_secs(),
        "workout generator configured"
    );
    Ok(generator)
}
