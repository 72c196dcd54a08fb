//! prompt-optimizer - Rewrite prompts with the 4-D methodology
//!
//! Deconstruct a prompt into intent, output type, constraints and gaps, then
//! Develop, Design and Deliver a rewritten prompt for a target platform.
//!
//! ## Key Features
//!
//! - **Intent classification**: keyword scoring with a fixed tie-break order
//! - **Platform templates**: Claude, ChatGPT, Gemini and a generic profile
//! - **Two output modes**: markdown for people, indented JSON for tools
//! - **Intent cache**: content-addressed memoization with pluggable storage
//! - **Previews**: optional hosted-model generation with a local fallback

pub mod cache;
pub mod config;
pub mod formatters;
pub mod generator;
pub mod intent;
pub mod optimization;
pub mod optimizer;
pub mod tui;
pub mod validation;

pub use cache::{CacheMetrics, CacheStatus, IntentCache, IntentStore, MemoryStore, NoopStore};
pub use config::{Config, ConfigBuilder, ConfigError};
pub use formatters::{Formatter, OptimizedResult, OutputMode};
pub use generator::{
    GeneratedText, GeneratorError, MockGenerator, ProviderKind, ResilientGenerator, TextGenerator,
};
pub use intent::{Intent, IntentClassifier};
pub use optimization::{OptimizationEngine, OptimizationRequest, OptimizationResult, Technique};
pub use optimizer::{OptimizerError, PromptOptimizer};
pub use validation::{InputValidator, ValidationResult, Validator};
