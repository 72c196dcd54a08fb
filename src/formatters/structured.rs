//! Structured JSON output
//!
//! The report is a fixed set of serde structs, so field order in the rendered
//! text is stable and the text parses back into the same structs.

use super::{into_map, Formatter, OptimizedResult, OutputMode};
use crate::intent::Intent;
use crate::optimization::{Components, OptimizationRequest, OptimizationResult};
use crate::optimizer::OptimizerError;
use serde::{Deserialize, Serialize};

pub const STRUCTURED_METHODOLOGY: &str = "4-D Structured";
pub const REPORT_METHODOLOGY: &str = "4-D Optimization";
pub const REPORT_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredReport {
    pub optimization_result: ReportBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportBody {
    pub original_prompt: String,
    pub optimized_prompt: String,
    pub intent_detected: Intent,
    pub target_platform: String,
    pub improvements_applied: Vec<String>,
    pub techniques_used: Vec<String>,
    pub analysis: ReportAnalysis,
    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportAnalysis {
    pub original_length: usize,
    pub optimized_length: usize,
    pub word_count_original: usize,
    pub word_count_optimized: usize,
    pub constraints_identified: Vec<String>,
    pub missing_information: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub methodology: String,
    pub version: String,
    pub components_analyzed: Components,
}

impl StructuredReport {
    pub fn build(
        result: &OptimizationResult,
        request: &OptimizationRequest,
        optimized_prompt: &str,
    ) -> Self {
        let raw = request.raw_input();

        Self {
            optimization_result: ReportBody {
                original_prompt: raw.to_string(),
                optimized_prompt: optimized_prompt.to_string(),
                intent_detected: request.intent,
                target_platform: request.platform.clone(),
                improvements_applied: result.improvements.clone(),
                techniques_used: result.technique_ids(),
                analysis: ReportAnalysis {
                    original_length: raw.chars().count(),
                    optimized_length: optimized_prompt.chars().count(),
                    word_count_original: raw.split_whitespace().count(),
                    word_count_optimized: optimized_prompt.split_whitespace().count(),
                    constraints_identified: request.constraints.clone(),
                    missing_information: request.missing_info.clone(),
                },
                metadata: ReportMetadata {
                    methodology: REPORT_METHODOLOGY.to_string(),
                    version: REPORT_VERSION.to_string(),
                    components_analyzed: result.components.clone(),
                },
            },
        }
    }

    /// Parse rendered report text
    pub fn parse(text: &str) -> Result<Self, OptimizerError> {
        Ok(serde_json::from_str(text)?)
    }
}

#[derive(Debug, Clone, Default)]
pub struct StructuredFormatter;

impl StructuredFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl Formatter for StructuredFormatter {
    fn mode(&self) -> OutputMode {
        OutputMode::Structured
    }

    fn format(
        &self,
        result: &OptimizationResult,
        request: &OptimizationRequest,
        optimized_prompt: &str,
    ) -> Result<OptimizedResult, OptimizerError> {
        let report = StructuredReport::build(result, request, optimized_prompt);
        let text = serde_json::to_string_pretty(&report)?;
        let metadata = serde_json::to_value(&report.optimization_result.metadata)?;

        Ok(OptimizedResult {
            optimized_prompt: text,
            improvements: result.improvements.clone(),
            methodology_applied: STRUCTURED_METHODOLOGY.to_string(),
            metadata: into_map(metadata),
            format_type: OutputMode::Structured,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::{OptimizationEngine, OutputType, Technique};

    #[test]
    fn test_round_trip() {
        let engine = OptimizationEngine::new();
        let request = engine
            .extract_intent("Debug this Python code in under 100 words")
            .with_platform("chatgpt");
        let result = engine.apply_optimization(&request).unwrap();
        let optimized = engine.assemble_prompt(&result, &request);

        let out = StructuredFormatter::new()
            .format(&result, &request, &optimized)
            .unwrap();
        let parsed = StructuredReport::parse(&out.optimized_prompt).unwrap();
        let body = parsed.optimization_result;

        assert_eq!(body.original_prompt, request.raw_input());
        assert_eq!(body.optimized_prompt, optimized);
        assert_eq!(body.techniques_used, result.technique_ids());
        assert_eq!(body.intent_detected, Intent::Technical);
        assert_eq!(
            body.analysis.constraints_identified,
            vec!["Length constraint: 100 words".to_string()]
        );
        assert_eq!(body.metadata.components_analyzed, result.components);
    }

    #[test]
    fn test_rendering_is_stable_and_indented() {
        let request = OptimizationRequest::new("hi", Intent::General, OutputType::General)
            .with_platform("generic");
        let mut result = OptimizationResult::new(&request);
        result.record(Technique::DeliverFormat);

        let formatter = StructuredFormatter::new();
        let first = formatter.format(&result, &request, "hi.").unwrap();
        let second = formatter.format(&result, &request, "hi.").unwrap();
        assert_eq!(first.optimized_prompt, second.optimized_prompt);

        let text = &first.optimized_prompt;
        assert!(text
            .starts_with("{\n  \"optimization_result\": {\n    \"original_prompt\": \"hi\","));
        let original = text.find("\"original_prompt\"").unwrap();
        let techniques = text.find("\"techniques_used\"").unwrap();
        let analysis = text.find("\"analysis\"").unwrap();
        assert!(original < techniques && techniques < analysis);
    }

    #[test]
    fn test_metadata_and_labels() {
        let request = OptimizationRequest::new("hi", Intent::General, OutputType::General);
        let result = OptimizationResult::new(&request);
        let out = StructuredFormatter::new().format(&result, &request, "hi.").unwrap();

        assert_eq!(out.methodology_applied, "4-D Structured");
        assert_eq!(out.format_type, OutputMode::Structured);
        assert_eq!(out.metadata["methodology"], "4-D Optimization");
        assert_eq!(out.metadata["version"], "1.0");
        assert_eq!(out.metadata["components_analyzed"]["word_count"], 1);
        assert_eq!(out.metadata["components_analyzed"]["complexity"], "low");
    }

    #[test]
    fn test_non_ascii_kept_verbatim() {
        let request = OptimizationRequest::new("café", Intent::General, OutputType::General);
        let result = OptimizationResult::new(&request);
        let out = StructuredFormatter::new().format(&result, &request, "café.").unwrap();
        assert!(out.optimized_prompt.contains("\"café\""));
    }
}
