//! The 4-D optimization pipeline: Deconstruct, Develop, Design, Deliver

mod engine;
mod techniques;

pub use engine::OptimizationEngine;
pub use techniques::{OptimizationTechniques, PlatformTemplate};

use crate::intent::Intent;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Platform assigned to a request before the caller overrides it
pub const DEFAULT_PLATFORM: &str = "claude";

/// Platforms with a dedicated template profile
pub const KNOWN_PLATFORMS: [&str; 4] = ["claude", "chatgpt", "gemini", "generic"];

#[derive(Error, Debug)]
pub enum OptimizationError {
    #[error("Pipeline produced an empty prompt")]
    EmptyOutput,

    #[error("Improvement log ({improvements}) and technique log ({techniques}) are misaligned")]
    MisalignedLog {
        improvements: usize,
        techniques: usize,
    },
}

/// Expected shape of the downstream model's answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputType {
    List,
    Explanation,
    Code,
    Creative,
    General,
}

impl OutputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputType::List => "list",
            OutputType::Explanation => "explanation",
            OutputType::Code => "code",
            OutputType::Creative => "creative",
            OutputType::General => "general",
        }
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the three rewrite stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Technique {
    /// Develop: clarity and specificity
    DevelopClarity,
    /// Design: platform structure
    DesignStructure,
    /// Deliver: final formatting
    DeliverFormat,
}

impl Technique {
    /// Stages in the order the engine applies them
    pub const PIPELINE: [Technique; 3] = [
        Technique::DevelopClarity,
        Technique::DesignStructure,
        Technique::DeliverFormat,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Technique::DevelopClarity => "develop_clarity",
            Technique::DesignStructure => "design_structure",
            Technique::DeliverFormat => "deliver_format",
        }
    }

    /// Entry recorded in the improvement log when the stage changes the text
    pub fn improvement(&self) -> &'static str {
        match self {
            Technique::DevelopClarity => "Enhanced clarity and specificity",
            Technique::DesignStructure => "Optimized structure for platform",
            Technique::DeliverFormat => "Applied final formatting",
        }
    }

    /// Long-form description, listed by the shell's /help
    pub fn description(&self) -> &'static str {
        match self {
            Technique::DevelopClarity => {
                "Enhanced clarity and specificity by replacing vague terms and adding context"
            }
            Technique::DesignStructure => "Optimized structure for target platform and intent",
            Technique::DeliverFormat => "Applied final formatting and output type optimization",
        }
    }
}

impl fmt::Display for Technique {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Structured request built from raw text and its classified intent.
///
/// Owned by a single optimization call. `raw_input` cannot change after
/// construction; `platform` holds [`DEFAULT_PLATFORM`] until the caller sets it.
#[derive(Debug, Clone, Serialize)]
pub struct OptimizationRequest {
    raw_input: String,
    pub intent: Intent,
    pub output_type: OutputType,
    pub platform: String,
    pub constraints: Vec<String>,
    pub missing_info: Vec<String>,
}

impl OptimizationRequest {
    pub fn new(raw_input: impl Into<String>, intent: Intent, output_type: OutputType) -> Self {
        Self {
            raw_input: raw_input.into(),
            intent,
            output_type,
            platform: DEFAULT_PLATFORM.to_string(),
            constraints: Vec::new(),
            missing_info: Vec::new(),
        }
    }

    pub fn raw_input(&self) -> &str {
        &self.raw_input
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    pub fn with_constraints(mut self, constraints: Vec<String>) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_missing_info(mut self, missing_info: Vec<String>) -> Self {
        self.missing_info = missing_info;
        self
    }
}

/// Coarse size bucket of the original prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

impl Complexity {
    /// low < 20 words, medium 20..=50, high > 50
    pub fn from_word_count(words: usize) -> Self {
        if words > 50 {
            Complexity::High
        } else if words >= 20 {
            Complexity::Medium
        } else {
            Complexity::Low
        }
    }
}

/// Deconstruct snapshot of the original prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Components {
    pub length: usize,
    pub word_count: usize,
    pub has_questions: bool,
    pub has_examples: bool,
    pub complexity: Complexity,
}

impl Components {
    pub fn analyze(text: &str) -> Self {
        let word_count = text.split_whitespace().count();
        Self {
            length: text.chars().count(),
            word_count,
            has_questions: text.contains('?'),
            has_examples: text.to_lowercase().contains("example"),
            complexity: Complexity::from_word_count(word_count),
        }
    }
}

/// Engine output: the rewritten prompt plus a log of what changed
#[derive(Debug, Clone, Serialize)]
pub struct OptimizationResult {
    pub original_prompt: String,
    pub intent: Intent,
    pub platform: String,
    /// Index-aligned with `techniques_applied`
    pub improvements: Vec<String>,
    pub techniques_applied: Vec<Technique>,
    pub components: Components,
    pub optimized_prompt: Option<String>,
}

impl OptimizationResult {
    pub fn new(request: &OptimizationRequest) -> Self {
        Self {
            original_prompt: request.raw_input().to_string(),
            intent: request.intent,
            platform: request.platform.clone(),
            improvements: Vec::new(),
            techniques_applied: Vec::new(),
            components: Components::analyze(request.raw_input()),
            optimized_prompt: None,
        }
    }

    /// Log a stage that changed the text
    pub fn record(&mut self, technique: Technique) {
        self.improvements.push(technique.improvement().to_string());
        self.techniques_applied.push(technique);
    }

    /// Technique identifiers in application order
    pub fn technique_ids(&self) -> Vec<String> {
        self.techniques_applied
            .iter()
            .map(|t| t.id().to_string())
            .collect()
    }
}
