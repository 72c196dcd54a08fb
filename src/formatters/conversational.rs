//! Human-readable markdown output

use super::{into_map, Formatter, OptimizedResult, OutputMode};
use crate::optimization::{OptimizationRequest, OptimizationResult};
use crate::optimizer::OptimizerError;
use serde_json::json;

pub const CONVERSATIONAL_METHODOLOGY: &str = "4-D Conversational";

#[derive(Debug, Clone, Default)]
pub struct ConversationalFormatter;

impl ConversationalFormatter {
    pub fn new() -> Self {
        Self
    }

    fn render(
        &self,
        result: &OptimizationResult,
        request: &OptimizationRequest,
        optimized_prompt: &str,
    ) -> String {
        let mut parts: Vec<String> = Vec::new();

        if !result.improvements.is_empty() {
            parts.push("I've optimized your prompt with the following improvements:".to_string());
            for improvement in &result.improvements {
                parts.push(format!("\u{2022} {}", improvement));
            }
            parts.push(String::new());
        }

        parts.push("**Optimized Prompt:**".to_string());
        parts.push(optimized_prompt.to_string());

        if !request.missing_info.is_empty() {
            parts.push(String::new());
            parts.push("**Suggestions for further improvement:**".to_string());
            for suggestion in &request.missing_info {
                parts.push(format!("\u{2022} {}", suggestion));
            }
        }

        parts.join("\n")
    }
}

impl Formatter for ConversationalFormatter {
    fn mode(&self) -> OutputMode {
        OutputMode::Conversational
    }

    fn format(
        &self,
        result: &OptimizationResult,
        request: &OptimizationRequest,
        optimized_prompt: &str,
    ) -> Result<OptimizedResult, OptimizerError> {
        let metadata = json!({
            "original_length": request.raw_input().chars().count(),
            "optimized_length": optimized_prompt.chars().count(),
            "intent": request.intent,
            "platform": request.platform,
            "techniques_used": result.technique_ids(),
        });

        Ok(OptimizedResult {
            optimized_prompt: self.render(result, request, optimized_prompt),
            improvements: result.improvements.clone(),
            methodology_applied: CONVERSATIONAL_METHODOLOGY.to_string(),
            metadata: into_map(metadata),
            format_type: OutputMode::Conversational,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::Intent;
    use crate::optimization::{OutputType, Technique};

    fn request(missing: Vec<String>) -> OptimizationRequest {
        OptimizationRequest::new("make a poem", Intent::Creative, OutputType::Creative)
            .with_platform("gemini")
            .with_missing_info(missing)
    }

    #[test]
    fn test_full_layout() {
        let request = request(vec!["Creative direction could be specified".to_string()]);
        let mut result = OptimizationResult::new(&request);
        result.record(Technique::DevelopClarity);

        let out = ConversationalFormatter::new()
            .format(&result, &request, "Make a poem.")
            .unwrap();

        assert_eq!(
            out.optimized_prompt,
            "I've optimized your prompt with the following improvements:\n\
             \u{2022} Enhanced clarity and specificity\n\
             \n\
             **Optimized Prompt:**\n\
             Make a poem.\n\
             \n\
             **Suggestions for further improvement:**\n\
             \u{2022} Creative direction could be specified"
        );
        assert_eq!(out.methodology_applied, "4-D Conversational");
        assert_eq!(out.format_type, OutputMode::Conversational);
        assert_eq!(out.improvements, vec!["Enhanced clarity and specificity"]);
    }

    #[test]
    fn test_sections_omitted_when_empty() {
        let request = request(vec![]);
        let result = OptimizationResult::new(&request);

        let out = ConversationalFormatter::new()
            .format(&result, &request, "Make a poem.")
            .unwrap();

        assert_eq!(out.optimized_prompt, "**Optimized Prompt:**\nMake a poem.");
    }

    #[test]
    fn test_metadata() {
        let request = request(vec![]);
        let mut result = OptimizationResult::new(&request);
        result.record(Technique::DeliverFormat);

        let out = ConversationalFormatter::new()
            .format(&result, &request, "Make a poem.")
            .unwrap();

        assert_eq!(out.metadata["original_length"], 11);
        assert_eq!(out.metadata["optimized_length"], 12);
        assert_eq!(out.metadata["intent"], "creative");
        assert_eq!(out.metadata["platform"], "gemini");
        assert_eq!(out.metadata["techniques_used"], json!(["deliver_format"]));
    }
}
