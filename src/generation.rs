//! Text-completion provider abstraction and implementations.
//!
//! Defines the [`Generator`] trait and concrete implementations:
//! - **[`DisabledGenerator`]** — always fails; used when no provider is configured.
//! - **[`OpenAiGenerator`]** — calls the OpenAI chat completions API with retry and backoff.
//!
//! # Provider Selection
//!
//! Use [`create_generator`] to instantiate the appropriate provider based
//! on the configuration:
//!
//! ```rust,no_run
//! # use designer_chat::config::GenerationConfig;
//! # use designer_chat::generation::create_generator;
//! let mut config = GenerationConfig::default();
//! config.provider = "disabled".to_string();
//! let generator = create_generator(&config).unwrap();
//! assert_eq!(generator.model_name(), "disabled");
//! ```
//!
//! # Retry Strategy
//!
//! The OpenAI provider uses exponential backoff for transient errors:
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors → retry
//! - Backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

use crate::config::GenerationConfig;
use crate::error::GenerationError;

/// A text-completion capability.
///
/// The pipeline supplies a fixed system instruction, the pruned context
/// document and the caller's instruction, and gets back the model's raw
/// text.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Returns the model identifier (e.g. `"gpt-4o"`).
    fn model_name(&self) -> &str;

    async fn generate(
        &self,
        system_instructions: &str,
        context_document: &str,
        user_instruction: &str,
    ) -> Result<String, GenerationError>;
}

// ============ Disabled Provider ============

/// A no-op generator that always returns [`GenerationError::Disabled`].
///
/// Used when `generation.provider = "disabled"` in the configuration.
pub struct DisabledGenerator;

#[async_trait]
impl Generator for DisabledGenerator {
    fn model_name(&self) -> &str {
        "disabled"
    }

    async fn generate(&self, _: &str, _: &str, _: &str) -> Result<String, GenerationError> {
        Err(GenerationError::Disabled)
    }
}

// ============ OpenAI Provider ============

/// Generator using the OpenAI chat completions API.
///
/// Calls `POST {base_url}/chat/completions` with the configured model.
/// Requires the `OPENAI_API_KEY` environment variable to be set.
pub struct OpenAiGenerator {
    client: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
    max_retries: u32,
}

impl OpenAiGenerator {
    /// Create a new OpenAI generator from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `OPENAI_API_KEY` is not in the environment or
    /// the HTTP client cannot be built.
    pub fn new(config: &GenerationConfig) -> Result<Self, GenerationError> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            GenerationError::Config("OPENAI_API_KEY environment variable not set".to_string())
        })?;
        Self::with_api_key(config, api_key)
    }

    pub fn with_api_key(
        config: &GenerationConfig,
        api_key: impl Into<String>,
    ) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerationError::Config(e.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: config.model.clone(),
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            max_retries: config.max_retries,
        })
    }

    fn request_body(&self, system: &str, context: &str, instruction: &str) -> Value {
        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                {
                    "role": "user",
                    "content": [
                        { "type": "text", "text": context },
                        { "type": "text", "text": instruction },
                    ],
                },
            ],
        })
    }
}

#[async_trait]
impl Generator for OpenAiGenerator {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        system_instructions: &str,
        context_document: &str,
        user_instruction: &str,
    ) -> Result<String, GenerationError> {
        let body = self.request_body(system_instructions, context_document, user_instruction);

        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s, 8s, ...
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tokio::time::sleep(delay).await;
            }

            let resp = self
                .client
                .post(&self.endpoint)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .json(&body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let json: Value = response.json().await?;
                        return parse_completion(&json);
                    }

                    let body_text = response.text().await.unwrap_or_default();
                    let err = GenerationError::Api {
                        status: status.as_u16(),
                        body: body_text,
                    };

                    // Rate limited or server error — retry
                    if status.as_u16() == 429 || status.is_server_error() {
                        tracing::warn!(attempt, status = status.as_u16(), "retrying generation");
                        last_err = Some(err);
                        continue;
                    }

                    // Client error (not 429) — don't retry
                    return Err(err);
                }
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "generation request failed");
                    last_err = Some(e.into());
                    continue;
                }
            }
        }

        Err(last_err
            .unwrap_or_else(|| GenerationError::Request("generation failed after retries".into())))
    }
}

/// Extract `choices[0].message.content` from a chat completions response.
pub fn parse_completion(json: &Value) -> Result<String, GenerationError> {
    json.get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(str::to_string)
        .ok_or_else(|| {
            GenerationError::InvalidResponse("missing choices[0].message.content".to_string())
        })
}

/// Create the appropriate [`Generator`] based on configuration.
///
/// | Config Value | Provider |
/// |-------------|----------|
/// | `"disabled"` | [`DisabledGenerator`] |
/// | `"openai"` | [`OpenAiGenerator`] |
pub fn create_generator(config: &GenerationConfig) -> Result<Box<dyn Generator>, GenerationError> {
    match config.provider.as_str() {
        "disabled" => Ok(Box::new(DisabledGenerator)),
        "openai" => Ok(Box::new(OpenAiGenerator::new(config)?)),
        other => Err(GenerationError::Config(format!(
            "Unknown generation provider: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_completion() {
        let json = json!({
            "choices": [
                {
                    "index": 0,
                    "message": { "role": "assistant", "content": "{\"response\":\"ok\"}" }
                }
            ]
        });
        assert_eq!(parse_completion(&json).unwrap(), "{\"response\":\"ok\"}");
    }

    #[test]
    fn test_parse_completion_missing_content() {
        let err = parse_completion(&json!({ "choices": [] })).unwrap_err();
        assert!(matches!(err, GenerationError::InvalidResponse(_)));
    }

    #[test]
    fn test_request_body_shape() {
        let config = GenerationConfig {
            base_url: "http://localhost:9999/v1/".to_string(),
            ..GenerationConfig::default()
        };
        let generator = OpenAiGenerator::with_api_key(&config, "sk-test").unwrap();
        assert_eq!(generator.endpoint, "http://localhost:9999/v1/chat/completions");

        let body = generator.request_body("SYS", "{}", "add a page");
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "SYS");
        assert_eq!(body["messages"][1]["content"][0]["text"], "{}");
        assert_eq!(body["messages"][1]["content"][1]["text"], "add a page");
    }

    #[tokio::test]
    async fn test_disabled_generator_fails() {
        let mut config = GenerationConfig::default();
        config.provider = "disabled".to_string();
        let generator = create_generator(&config).unwrap();
        let err = generator.generate("s", "{}", "i").await.unwrap_err();
        assert!(matches!(err, GenerationError::Disabled));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_request_error() {
        let config = GenerationConfig {
            base_url: "http://127.0.0.1:1/v1".to_string(),
            max_retries: 0,
            timeout_secs: 2,
            ..GenerationConfig::default()
        };
        let generator = OpenAiGenerator::with_api_key(&config, "sk-test").unwrap();
        let err = generator.generate("s", "{}", "i").await.unwrap_err();
        assert!(matches!(err, GenerationError::Request(_)));
    }
}
