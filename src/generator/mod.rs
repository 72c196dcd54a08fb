//! Text generation capability
//!
//! The optimizer never needs a model to produce its result. A generator is only
//! used to preview what a downstream model makes of an optimized prompt, and
//! every network-backed path degrades to [`MockGenerator`].

mod http;
mod resilient;

pub use http::{HttpGenerator, HttpGeneratorConfig};
pub use resilient::ResilientGenerator;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Backend a platform is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Mock,
    Anthropic,
    OpenAI,
}

impl ProviderKind {
    /// claude goes to Anthropic, chatgpt to OpenAI, everything else to the mock
    pub fn for_platform(platform: &str) -> Self {
        match platform {
            "claude" => ProviderKind::Anthropic,
            "chatgpt" => ProviderKind::OpenAI,
            _ => ProviderKind::Mock,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Mock => "mock",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::OpenAI => "openai",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = GeneratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mock" => Ok(ProviderKind::Mock),
            "anthropic" | "claude" => Ok(ProviderKind::Anthropic),
            "openai" | "chatgpt" => Ok(ProviderKind::OpenAI),
            other => Err(GeneratorError::Provider(format!("unknown provider: {}", other))),
        }
    }
}

/// A model's answer to a prompt
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedText {
    pub content: String,
    pub model: String,
    pub tokens_used: u32,
    pub response_time: Duration,
}

/// "Generate text given a prompt and platform"
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, platform: &str)
        -> Result<GeneratedText, GeneratorError>;

    /// Name used in logs
    fn name(&self) -> &str;
}

/// Deterministic local stand-in for a real model
#[derive(Debug, Clone)]
pub struct MockGenerator {
    model: String,
}

impl MockGenerator {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
        }
    }

    /// Synchronous core, usable without a runtime
    pub fn respond(&self, prompt: &str) -> GeneratedText {
        let start = Instant::now();
        let content = mock_completion(prompt);
        // Rough estimate: 1.3 tokens per word
        let tokens_used = (content.split_whitespace().count() as f64 * 1.3) as u32;

        GeneratedText {
            content,
            model: self.model.clone(),
            tokens_used,
            response_time: start.elapsed(),
        }
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new("mock-model")
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(
        &self,
        prompt: &str,
        _platform: &str,
    ) -> Result<GeneratedText, GeneratorError> {
        Ok(self.respond(prompt))
    }

    fn name(&self) -> &str {
        &self.model
    }
}

fn mock_completion(prompt: &str) -> String {
    if prompt.chars().count() < 10 {
        return format!("Please provide more context for: {}", prompt);
    }

    let mut completion = format!("You are an expert assistant. {}", prompt);
    let lowered = prompt.to_lowercase();
    if !lowered.contains("word") && !lowered.contains("length") {
        completion.push_str(" Please provide a comprehensive response.");
    }
    completion
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_short_prompt() {
        let text = MockGenerator::default().respond("hi");
        assert_eq!(text.content, "Please provide more context for: hi");
        assert_eq!(text.model, "mock-model");
    }

    #[test]
    fn test_mock_adds_role_and_constraint() {
        let text = MockGenerator::default().respond("Summarize the attached report");
        assert_eq!(
            text.content,
            "You are an expert assistant. Summarize the attached report \
             Please provide a comprehensive response."
        );
        assert_eq!(text.tokens_used, 18);
    }

    #[test]
    fn test_mock_respects_length_hint() {
        let text = MockGenerator::default().respond("Summarize in 50 words");
        assert_eq!(text.content, "You are an expert assistant. Summarize in 50 words");
    }

    #[test]
    fn test_mock_is_deterministic() {
        let mock = MockGenerator::default();
        assert_eq!(
            mock.respond("Explain borrowing").content,
            mock.respond("Explain borrowing").content
        );
    }

    #[test]
    fn test_mock_via_trait() {
        let text = tokio_test::block_on(MockGenerator::new("m").generate("hi", "claude")).unwrap();
        assert_eq!(text.model, "m");
    }

    #[test]
    fn test_platform_routing() {
        assert_eq!(ProviderKind::for_platform("claude"), ProviderKind::Anthropic);
        assert_eq!(ProviderKind::for_platform("chatgpt"), ProviderKind::OpenAI);
        assert_eq!(ProviderKind::for_platform("gemini"), ProviderKind::Mock);
        assert_eq!(ProviderKind::for_platform("whatever"), ProviderKind::Mock);
    }

    #[test]
    fn test_provider_parse() {
        assert_eq!("OpenAI".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAI);
        assert!("cohere".parse::<ProviderKind>().is_err());
    }
}
