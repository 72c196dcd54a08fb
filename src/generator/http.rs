//! HTTP-backed generator for the Anthropic Messages and OpenAI chat APIs

use super::{GeneratedText, GeneratorError, ProviderKind, TextGenerator};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Instant;

const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpGeneratorConfig {
    pub provider: ProviderKind,
    pub api_key: String,
    /// Full endpoint URL; provider default when unset
    pub base_url: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl HttpGeneratorConfig {
    pub fn anthropic(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: ProviderKind::Anthropic,
            api_key: api_key.into(),
            base_url: None,
            model: model.into(),
            max_tokens: 1024,
            temperature: 0.7,
        }
    }

    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: ProviderKind::OpenAI,
            ..Self::anthropic(api_key, model)
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }
}

/// Sends a single-turn prompt to a hosted model
pub struct HttpGenerator {
    config: HttpGeneratorConfig,
    client: Client,
    name: String,
}

impl HttpGenerator {
    pub fn new(config: HttpGeneratorConfig) -> Self {
        let name = format!("{}:{}", config.provider, config.model);
        Self {
            config,
            client: Client::new(),
            name,
        }
    }

    fn endpoint(&self) -> Result<&str, GeneratorError> {
        if let Some(url) = &self.config.base_url {
            return Ok(url);
        }
        match self.config.provider {
            ProviderKind::Anthropic => Ok(ANTHROPIC_URL),
            ProviderKind::OpenAI => Ok(OPENAI_URL),
            ProviderKind::Mock => Err(GeneratorError::Provider(
                "mock provider has no HTTP endpoint".to_string(),
            )),
        }
    }

    fn build_body(&self, prompt: &str) -> Value {
        json!({
            "model": self.config.model,
            "messages": [{ "role": "user", "content": prompt }],
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
        })
    }

    fn parse_response(&self, response: &Value, started: Instant) -> GeneratedText {
        let (content, tokens) = match self.config.provider {
            ProviderKind::Anthropic => (
                response["content"][0]["text"].as_str(),
                response["usage"]["output_tokens"].as_u64(),
            ),
            _ => (
                response["choices"][0]["message"]["content"].as_str(),
                response["usage"]["completion_tokens"].as_u64(),
            ),
        };

        GeneratedText {
            content: content.unwrap_or("").to_string(),
            model: response["model"]
                .as_str()
                .unwrap_or(&self.config.model)
                .to_string(),
            tokens_used: tokens.unwrap_or(0) as u32,
            response_time: started.elapsed(),
        }
    }
}

#[async_trait]
impl TextGenerator for HttpGenerator {
    async fn generate(
        &self,
        prompt: &str,
        _platform: &str,
    ) -> Result<GeneratedText, GeneratorError> {
        if self.config.api_key.is_empty() {
            return Err(GeneratorError::Auth(format!(
                "no API key configured for {}",
                self.config.provider
            )));
        }

        let url = self.endpoint()?;
        let started = Instant::now();
        let mut request = self.client.post(url).json(&self.build_body(prompt));

        request = match self.config.provider {
            ProviderKind::Anthropic => request
                .header("x-api-key", &self.config.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION),
            _ => request.bearer_auth(&self.config.api_key),
        };

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(GeneratorError::Auth(format!("{} rejected credentials", self.name)));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeneratorError::Provider(format!("{}: {}", status, body)));
        }

        let json: Value = response.json().await?;
        Ok(self.parse_response(&json, started))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
