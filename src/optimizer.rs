//! Orchestrator: validation, cached classification, the 4-D pipeline and
//! formatting behind a single call that always returns a well-formed result.

use crate::cache::{CacheMetrics, IntentCache};
use crate::config::Config;
use crate::formatters::{
    ConversationalFormatter, Formatter, OptimizedResult, OutputMode, StructuredFormatter,
};
use crate::generator::{GeneratedText, GeneratorError, ResilientGenerator, TextGenerator};
use crate::optimization::{
    OptimizationEngine, OptimizationError, OptimizationRequest, OptimizationResult,
    KNOWN_PLATFORMS,
};
use crate::validation::{InputValidator, ValidationResult, Validator};
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

pub const ERROR_METHODOLOGY: &str = "Error Handling";
pub const FALLBACK_METHODOLOGY: &str = "Fallback Mode";
pub const FALLBACK_IMPROVEMENT: &str = "Emergency fallback applied";

/// The only failure description that reaches a fallback result
pub const PROCESSING_ERROR: &str = "Processing error occurred";

#[derive(Error, Debug)]
pub enum OptimizerError {
    #[error("Unknown output mode: {0} (expected conversational or structured)")]
    UnknownMode(String),

    #[error("Unknown platform: {0} (expected claude, chatgpt, gemini or generic)")]
    UnknownPlatform(String),

    #[error("Processing error: {0}")]
    Processing(#[from] OptimizationError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Normalize a platform name, rejecting anything without a template profile
pub fn parse_platform(value: &str) -> Result<String, OptimizerError> {
    let platform = value.trim().to_lowercase();
    if KNOWN_PLATFORMS.contains(&platform.as_str()) {
        Ok(platform)
    } else {
        Err(OptimizerError::UnknownPlatform(value.to_string()))
    }
}

pub struct PromptOptimizer {
    engine: OptimizationEngine,
    validator: Box<dyn Validator>,
    cache: Arc<IntentCache>,
    conversational: Box<dyn Formatter>,
    structured: Box<dyn Formatter>,
    generator: Arc<dyn TextGenerator>,
}

impl PromptOptimizer {
    /// Default validator, in-memory cache and mock-only generator
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> PromptOptimizerBuilder {
        PromptOptimizerBuilder::default()
    }

    pub fn from_config(config: &Config) -> Self {
        let cache = if config.cache.enabled {
            IntentCache::in_memory(config.cache.max_entries)
        } else {
            IntentCache::disabled()
        };

        Self::builder()
            .validator(InputValidator::new(config.validation.clone()))
            .cache(Arc::new(cache))
            .generator(Arc::new(ResilientGenerator::from_settings(&config.generator)))
            .build()
    }

    /// Optimize `text` for `platform` and render it in `mode`.
    ///
    /// Invalid input yields an error-shaped result paired with the validator's
    /// verdict. Any fault after validation yields the fallback result.
    pub fn optimize(
        &self,
        text: &str,
        mode: OutputMode,
        platform: &str,
    ) -> (OptimizedResult, ValidationResult) {
        let validation = self.validator.validate(text, mode);
        if !validation.is_valid {
            return (error_result(&validation.errors, mode), validation);
        }

        let sanitized = validation.sanitized_input.clone().unwrap_or_default();

        match self.run_pipeline(&sanitized, mode, platform) {
            Ok(result) => (result, validation),
            Err(e) => {
                warn!(error = %e, "optimization failed, returning fallback");
                fallback_result(&sanitized, mode)
            }
        }
    }

    fn run_pipeline(
        &self,
        text: &str,
        mode: OutputMode,
        platform: &str,
    ) -> Result<OptimizedResult, OptimizerError> {
        let (result, request, prompt) = self.prepare(text, platform)?;
        self.formatter(mode).format(&result, &request, &prompt)
    }

    fn prepare(
        &self,
        text: &str,
        platform: &str,
    ) -> Result<(OptimizationResult, OptimizationRequest, String), OptimizerError> {
        let classifier = self.engine.classifier();
        let (intent, status) = self.cache.get_or_classify(text, |t| classifier.classify(t));
        debug!(%intent, ?status, "intent resolved");

        let request = self.engine.build_request(text, intent).with_platform(platform);
        let result = self.engine.apply_optimization(&request)?;
        let prompt = self.engine.assemble_prompt(&result, &request);

        Ok((result, request, prompt))
    }

    /// The optimized prompt alone, without formatting. None when the input is
    /// rejected or the pipeline fails.
    pub fn optimized_text(&self, text: &str, platform: &str) -> Option<String> {
        let validation = self.validator.validate(text, OutputMode::default());
        if !validation.is_valid {
            return None;
        }

        let sanitized = validation.sanitized_input.unwrap_or_default();
        match self.prepare(&sanitized, platform) {
            Ok((_, _, prompt)) => Some(prompt),
            Err(e) => {
                warn!(error = %e, "optimization failed");
                None
            }
        }
    }

    fn formatter(&self, mode: OutputMode) -> &dyn Formatter {
        match mode {
            OutputMode::Conversational => self.conversational.as_ref(),
            OutputMode::Structured => self.structured.as_ref(),
        }
    }

    /// Run a prompt through the configured generator
    pub async fn preview(
        &self,
        prompt: &str,
        platform: &str,
    ) -> Result<GeneratedText, GeneratorError> {
        self.generator.generate(prompt, platform).await
    }

    pub fn cache(&self) -> &IntentCache {
        &self.cache
    }

    pub fn cache_metrics(&self) -> CacheMetrics {
        self.cache.metrics()
    }
}

impl Default for PromptOptimizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Replaces individual collaborators of a [`PromptOptimizer`]
#[derive(Default)]
pub struct PromptOptimizerBuilder {
    validator: Option<Box<dyn Validator>>,
    cache: Option<Arc<IntentCache>>,
    conversational: Option<Box<dyn Formatter>>,
    structured: Option<Box<dyn Formatter>>,
    generator: Option<Arc<dyn TextGenerator>>,
}

impl PromptOptimizerBuilder {
    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }

    pub fn cache(mut self, cache: Arc<IntentCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Install a formatter for the mode it reports
    pub fn formatter(mut self, formatter: impl Formatter + 'static) -> Self {
        let slot = match formatter.mode() {
            OutputMode::Conversational => &mut self.conversational,
            OutputMode::Structured => &mut self.structured,
        };
        *slot = Some(Box::new(formatter));
        self
    }

    pub fn generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn build(self) -> PromptOptimizer {
        PromptOptimizer {
            engine: OptimizationEngine::new(),
            validator: self
                .validator
                .unwrap_or_else(|| Box::new(InputValidator::default())),
            cache: self.cache.unwrap_or_default(),
            conversational: self
                .conversational
                .unwrap_or_else(|| Box::new(ConversationalFormatter::new())),
            structured: self
                .structured
                .unwrap_or_else(|| Box::new(StructuredFormatter::new())),
            generator: self
                .generator
                .unwrap_or_else(|| Arc::new(ResilientGenerator::new())),
        }
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn error_result(errors: &[String], mode: OutputMode) -> OptimizedResult {
    let optimized_prompt = match mode {
        OutputMode::Conversational => {
            let mut lines = vec!["**Error:**".to_string(), "Optimization failed:".to_string()];
            lines.extend(errors.iter().map(|e| format!("\u{2022} {}", e)));
            lines.join("\n")
        }
        OutputMode::Structured => pretty(&json!({
            "error": true,
            "message": "Optimization failed",
            "errors": errors,
        })),
    };

    let mut metadata = serde_json::Map::new();
    metadata.insert("error".to_string(), Value::Bool(true));
    metadata.insert("error_count".to_string(), json!(errors.len()));

    OptimizedResult {
        optimized_prompt,
        improvements: Vec::new(),
        methodology_applied: ERROR_METHODOLOGY.to_string(),
        metadata,
        format_type: mode,
    }
}

fn fallback_result(text: &str, mode: OutputMode) -> (OptimizedResult, ValidationResult) {
    let optimized_prompt = match mode {
        OutputMode::Conversational => {
            format!("**Fallback:**\n{}\n\nError: {}", text, PROCESSING_ERROR)
        }
        OutputMode::Structured => pretty(&json!({
            "status": "fallback",
            "original_prompt": text,
            "error": PROCESSING_ERROR,
        })),
    };

    let mut metadata = serde_json::Map::new();
    metadata.insert("fallback".to_string(), Value::Bool(true));
    metadata.insert("error".to_string(), json!(PROCESSING_ERROR));

    let result = OptimizedResult {
        optimized_prompt,
        improvements: vec![FALLBACK_IMPROVEMENT.to_string()],
        methodology_applied: FALLBACK_METHODOLOGY.to_string(),
        metadata,
        format_type: mode,
    };

    let validation = ValidationResult {
        is_valid: false,
        errors: vec![format!("Optimization failed: {}", PROCESSING_ERROR)],
        warnings: vec!["Using emergency fallback".to_string()],
        sanitized_input: Some(text.to_string()),
    };

    (result, validation)
}
