//! Output formatters for conversational and structured modes

mod conversational;
mod structured;

pub use conversational::ConversationalFormatter;
pub use structured::{
    ReportAnalysis, ReportBody, ReportMetadata, StructuredFormatter, StructuredReport,
};

use crate::optimization::{OptimizationRequest, OptimizationResult};
use crate::optimizer::OptimizerError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Presentation shape of an [`OptimizedResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    Conversational,
    Structured,
}

impl OutputMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputMode::Conversational => "conversational",
            OutputMode::Structured => "structured",
        }
    }
}

impl Default for OutputMode {
    fn default() -> Self {
        OutputMode::Conversational
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputMode {
    type Err = OptimizerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "conversational" => Ok(OutputMode::Conversational),
            "structured" => Ok(OutputMode::Structured),
            other => Err(OptimizerError::UnknownMode(other.to_string())),
        }
    }
}

/// Final value handed back to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizedResult {
    pub optimized_prompt: String,
    pub improvements: Vec<String>,
    pub methodology_applied: String,
    /// Formatter-specific
    pub metadata: Map<String, Value>,
    pub format_type: OutputMode,
}

impl OptimizedResult {
    /// True for validation-error results
    pub fn is_error(&self) -> bool {
        self.metadata.get("error") == Some(&Value::Bool(true))
    }

    /// True for emergency fallback results
    pub fn is_fallback(&self) -> bool {
        self.metadata.get("fallback") == Some(&Value::Bool(true))
    }
}

/// Renders engine output into one presentation shape
pub trait Formatter: Send + Sync {
    fn mode(&self) -> OutputMode;

    fn format(
        &self,
        result: &OptimizationResult,
        request: &OptimizationRequest,
        optimized_prompt: &str,
    ) -> Result<OptimizedResult, OptimizerError>;
}

/// Unwrap a JSON object, or an empty map for any other value
pub(crate) fn into_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
