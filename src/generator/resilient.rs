//! Platform routing with timeout and deterministic fallback

use super::{
    GeneratedText, GeneratorError, HttpGenerator, HttpGeneratorConfig, MockGenerator,
    ProviderKind, TextGenerator,
};
use crate::config::GeneratorSettings;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Routes each platform to a configured backend and falls back to
/// [`MockGenerator`] on any error or timeout. `generate` never fails.
pub struct ResilientGenerator {
    routes: HashMap<ProviderKind, Arc<dyn TextGenerator>>,
    timeout: Duration,
    mock: MockGenerator,
}

impl ResilientGenerator {
    /// No backends: every platform is served by the mock
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            timeout: DEFAULT_TIMEOUT,
            mock: MockGenerator::default(),
        }
    }

    /// One HTTP route per provider that has a key, when hosted generation is enabled
    pub fn from_settings(settings: &GeneratorSettings) -> Self {
        let mut generator = Self::new().with_timeout(Duration::from_secs(settings.timeout_secs));
        if !settings.enabled {
            return generator;
        }

        let routes = [
            (
                ProviderKind::Anthropic,
                &settings.anthropic_api_key,
                &settings.anthropic_model,
                &settings.anthropic_base_url,
            ),
            (
                ProviderKind::OpenAI,
                &settings.openai_api_key,
                &settings.openai_model,
                &settings.openai_base_url,
            ),
        ];

        for (provider, key, model, base_url) in routes {
            let Some(key) = key else {
                continue;
            };
            let config = HttpGeneratorConfig {
                provider,
                api_key: key.clone(),
                base_url: base_url.clone(),
                model: model.clone(),
                max_tokens: settings.max_tokens,
                temperature: settings.temperature,
            };
            generator = generator.with_route(provider, Arc::new(HttpGenerator::new(config)));
        }

        generator
    }

    pub fn with_route(mut self, provider: ProviderKind, generator: Arc<dyn TextGenerator>) -> Self {
        self.routes.insert(provider, generator);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn has_route(&self, provider: ProviderKind) -> bool {
        self.routes.contains_key(&provider)
    }

    /// Generate through the routed backend, or locally if it is missing or fails
    pub async fn generate_or_fallback(&self, prompt: &str, platform: &str) -> GeneratedText {
        let provider = ProviderKind::for_platform(platform);
        let Some(backend) = self.routes.get(&provider) else {
            return self.mock.respond(prompt);
        };

        let outcome = match tokio::time::timeout(self.timeout, backend.generate(prompt, platform))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(GeneratorError::Timeout(self.timeout)),
        };

        match outcome {
            Ok(text) => {
                info!(backend = backend.name(), tokens = text.tokens_used, "generation complete");
                text
            }
            Err(e) => {
                warn!(backend = backend.name(), "generation failed, using local fallback: {}", e);
                MockGenerator::new(format!("{}-fallback", backend.name())).respond(prompt)
            }
        }
    }
}

impl Default for ResilientGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextGenerator for ResilientGenerator {
    async fn generate(
        &self,
        prompt: &str,
        platform: &str,
    ) -> Result<GeneratedText, GeneratorError> {
        Ok(self.generate_or_fallback(prompt, platform).await)
    }

    fn name(&self) -> &str {
        "resilient"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingGenerator;

    #[async_trait]
    impl TextGenerator for FailingGenerator {
        async fn generate(&self, _: &str, _: &str) -> Result<GeneratedText, GeneratorError> {
            Err(GeneratorError::Provider("boom".to_string()))
        }
        fn name(&self) -> &str {
            "failing"
        }
    }

    struct SlowGenerator;

    #[async_trait]
    impl TextGenerator for SlowGenerator {
        async fn generate(&self, prompt: &str, _: &str) -> Result<GeneratedText, GeneratorError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(MockGenerator::new("slow").respond(prompt))
        }
        fn name(&self) -> &str {
            "slow"
        }
    }

    const PROMPT: &str = "Describe the borrow checker";

    #[tokio::test]
    async fn test_unrouted_platform_uses_mock() {
        let generator = ResilientGenerator::new();
        let text = generator.generate_or_fallback(PROMPT, "gemini").await;
        let expected = MockGenerator::default().respond(PROMPT);
        assert_eq!(text.content, expected.content);
        assert_eq!(text.model, "mock-model");
        assert_eq!(text.tokens_used, expected.tokens_used);
    }

    #[tokio::test]
    async fn test_error_falls_back() {
        let generator = ResilientGenerator::new()
            .with_route(ProviderKind::Anthropic, Arc::new(FailingGenerator));
        let text = generator.generate(PROMPT, "claude").await.unwrap();
        assert_eq!(text.model, "failing-fallback");
        assert_eq!(text.content, MockGenerator::default().respond(PROMPT).content);
    }

    #[tokio::test]
    async fn test_timeout_falls_back() {
        let generator = ResilientGenerator::new()
            .with_route(ProviderKind::OpenAI, Arc::new(SlowGenerator))
            .with_timeout(Duration::from_millis(20));
        let text = generator.generate_or_fallback(PROMPT, "chatgpt").await;
        assert_eq!(text.model, "slow-fallback");
    }

    #[test]
    fn test_from_settings() {
        let disabled = GeneratorSettings {
            anthropic_api_key: Some("k".to_string()),
            ..GeneratorSettings::default()
        };
        let generator = ResilientGenerator::from_settings(&disabled);
        assert!(!generator.has_route(ProviderKind::Anthropic));

        let enabled = GeneratorSettings {
            enabled: true,
            ..disabled
        };
        let generator = ResilientGenerator::from_settings(&enabled);
        assert!(generator.has_route(ProviderKind::Anthropic));
        assert!(!generator.has_route(ProviderKind::OpenAI));
        assert_eq!(generator.timeout, Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_routed_backend_used() {
        let generator = ResilientGenerator::new()
            .with_route(ProviderKind::OpenAI, Arc::new(MockGenerator::new("backend")));
        assert!(generator.has_route(ProviderKind::OpenAI));
        let text = generator.generate_or_fallback(PROMPT, "chatgpt").await;
        assert_eq!(text.model, "backend");
    }
}
