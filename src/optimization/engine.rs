//! Core engine: request extraction and sequential technique application

use super::{
    OptimizationError, OptimizationRequest, OptimizationResult, OptimizationTechniques,
    OutputType, Technique,
};
use crate::intent::{Intent, IntentClassifier};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Output-type keywords, scanned in order; first hit wins
const OUTPUT_TYPE_KEYWORDS: [(OutputType, &[&str]); 4] = [
    (OutputType::List, &["list", "bullet", "enumerate"]),
    (OutputType::Explanation, &["explain", "describe", "tell"]),
    (OutputType::Code, &["code", "function", "script"]),
    (OutputType::Creative, &["story", "narrative", "write"]),
];

static WORD_COUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s*words?\b").expect("valid regex"));

static CHARACTER_COUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s*characters?\b").expect("valid regex"));

static LENGTH_MARKERS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    ["brief", "detailed", "short", "long"]
        .into_iter()
        .map(|marker| {
            let re = Regex::new(&format!(r"(?i)\b{}\b", marker)).expect("valid regex");
            (re, marker)
        })
        .collect()
});

static STRUCTURED_FORMAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(json|yaml|xml)\b").expect("valid regex"));

static VAGUE_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(something|anything|stuff|things|it)\b").expect("valid regex")
});

static TECHNICAL_CONTEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)context|background|use case").expect("valid regex"));

static CREATIVE_DIRECTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)style|tone|audience").expect("valid regex"));

/// Drives the 4-D methodology over a single request
#[derive(Debug, Clone, Default)]
pub struct OptimizationEngine {
    classifier: IntentClassifier,
    techniques: OptimizationTechniques,
}

impl OptimizationEngine {
    pub fn new() -> Self {
        Self {
            classifier: IntentClassifier::new(),
            techniques: OptimizationTechniques::new(),
        }
    }

    pub fn classifier(&self) -> &IntentClassifier {
        &self.classifier
    }

    pub fn techniques(&self) -> &OptimizationTechniques {
        &self.techniques
    }

    /// Classify the prompt and analyze its structure into a request
    pub fn extract_intent(&self, text: &str) -> OptimizationRequest {
        let intent = self.classifier.classify(text);
        self.build_request(text, intent)
    }

    /// Build a request around an intent the caller already has
    pub fn build_request(&self, text: &str, intent: Intent) -> OptimizationRequest {
        OptimizationRequest::new(text, intent, determine_output_type(text))
            .with_constraints(extract_constraints(text))
            .with_missing_info(identify_missing_info(text, intent))
    }

    /// Run Develop, Design and Deliver in order, logging each stage that
    /// changed the text
    pub fn apply_optimization(
        &self,
        request: &OptimizationRequest,
    ) -> Result<OptimizationResult, OptimizationError> {
        let mut result = OptimizationResult::new(request);
        let mut current = request.raw_input().to_string();

        for technique in Technique::PIPELINE {
            let next = self.techniques.apply(
                technique,
                &current,
                request.intent,
                &request.platform,
                request.output_type,
            );

            if next != current {
                debug!(technique = technique.id(), "stage changed prompt");
                result.record(technique);
            }
            current = next;
        }

        if result.improvements.len() != result.techniques_applied.len() {
            return Err(OptimizationError::MisalignedLog {
                improvements: result.improvements.len(),
                techniques: result.techniques_applied.len(),
            });
        }
        if current.trim().is_empty() {
            return Err(OptimizationError::EmptyOutput);
        }

        result.optimized_prompt = Some(current);
        Ok(result)
    }

    /// Final prompt text; falls back to the raw input if the result carries none
    pub fn assemble_prompt(
        &self,
        result: &OptimizationResult,
        request: &OptimizationRequest,
    ) -> String {
        result
            .optimized_prompt
            .clone()
            .unwrap_or_else(|| request.raw_input().to_string())
    }
}

fn determine_output_type(text: &str) -> OutputType {
    let lowered = text.to_lowercase();

    OUTPUT_TYPE_KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| lowered.contains(w)))
        .map(|(output_type, _)| *output_type)
        .unwrap_or(OutputType::General)
}

fn extract_constraints(text: &str) -> Vec<String> {
    let mut constraints = Vec::new();

    if let Some(caps) = WORD_COUNT.captures(text) {
        constraints.push(format!("Length constraint: {} words", &caps[1]));
    }
    if let Some(caps) = CHARACTER_COUNT.captures(text) {
        constraints.push(format!("Length constraint: {} characters", &caps[1]));
    }
    for (re, marker) in LENGTH_MARKERS.iter() {
        if re.is_match(text) {
            constraints.push(format!("Length constraint: {}", marker));
        }
    }

    if STRUCTURED_FORMAT.is_match(text) {
        constraints.push("Structured format required".to_string());
    }

    constraints
}

fn identify_missing_info(text: &str, intent: Intent) -> Vec<String> {
    let mut missing = Vec::new();

    if VAGUE_REFERENCE.is_match(text) {
        missing.push("Vague references need clarification".to_string());
    }

    match intent {
        Intent::Technical if !TECHNICAL_CONTEXT.is_match(text) => {
            missing.push("Technical context might be helpful".to_string());
        }
        Intent::Creative if !CREATIVE_DIRECTION.is_match(text) => {
            missing.push("Creative direction could be specified".to_string());
        }
        _ => {}
    }

    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::Complexity;

    #[test]
    fn test_extract_intent_story() {
        let engine = OptimizationEngine::new();
        let request = engine.extract_intent("Write me a story about AI");

        assert_eq!(request.intent, Intent::Creative);
        assert_eq!(request.output_type, OutputType::Creative);
        assert_eq!(request.platform, "claude");
        assert!(request.constraints.is_empty());
        assert_eq!(
            request.missing_info,
            vec!["Creative direction could be specified".to_string()]
        );
    }

    #[test]
    fn test_output_type_first_match_wins() {
        assert_eq!(determine_output_type("List and explain the code"), OutputType::List);
        assert_eq!(determine_output_type("Describe the function"), OutputType::Explanation);
        assert_eq!(determine_output_type("A python script"), OutputType::Code);
        assert_eq!(determine_output_type("hello"), OutputType::General);
    }

    #[test]
    fn test_constraints() {
        let constraints =
            extract_constraints("Give a brief summary in 200 words, max 900 characters, as JSON");
        assert_eq!(
            constraints,
            vec![
                "Length constraint: 200 words".to_string(),
                "Length constraint: 900 characters".to_string(),
                "Length constraint: brief".to_string(),
                "Structured format required".to_string(),
            ]
        );
    }

    #[test]
    fn test_length_markers_are_whole_words() {
        assert!(extract_constraints("This will belong to the shortlist").is_empty());
    }

    #[test]
    fn test_missing_info_technical() {
        let missing = identify_missing_info("Fix it", Intent::Technical);
        assert_eq!(
            missing,
            vec![
                "Vague references need clarification".to_string(),
                "Technical context might be helpful".to_string(),
            ]
        );
        assert!(identify_missing_info("Given this use case, fix the bug", Intent::Technical)
            .is_empty());
    }

    #[test]
    fn test_missing_info_creative_with_direction() {
        assert!(identify_missing_info("A poem in a playful tone", Intent::Creative).is_empty());
    }

    #[test]
    fn test_apply_optimization_logs_changed_stages() {
        let engine = OptimizationEngine::new();
        let request = engine.extract_intent("Write me a story about AI");
        let result = engine.apply_optimization(&request).unwrap();

        assert_eq!(result.improvements.len(), result.techniques_applied.len());
        assert_eq!(
            result.techniques_applied,
            vec![
                Technique::DevelopClarity,
                Technique::DesignStructure,
                Technique::DeliverFormat,
            ]
        );
        assert_eq!(
            result.optimized_prompt.as_deref(),
            Some(
                "Human: Please write me a story about ai please provide detailed information.. \
                 Be thorough and accurate. Please be creative and engaging in your response."
            )
        );
    }

    #[test]
    fn test_unchanged_stage_is_not_logged() {
        let engine = OptimizationEngine::new();
        let text = "Please organize the quarterly sales figures into a table grouped by region and product line for the board.";
        let request = engine.extract_intent(text).with_platform("generic");
        let result = engine.apply_optimization(&request).unwrap();

        assert!(result.techniques_applied.is_empty());
        assert!(result.improvements.is_empty());
        assert_eq!(result.optimized_prompt.as_deref(), Some(text));
    }

    #[test]
    fn test_components_describe_original_text() {
        let engine = OptimizationEngine::new();
        let request = engine.extract_intent("What is an example of a closure?");
        let result = engine.apply_optimization(&request).unwrap();

        assert_eq!(result.components.word_count, 7);
        assert!(result.components.has_questions);
        assert!(result.components.has_examples);
        assert_eq!(result.components.complexity, Complexity::Low);
        assert_eq!(result.original_prompt, "What is an example of a closure?");
    }

    #[test]
    fn test_assemble_prompt_defaults_to_raw_input() {
        let engine = OptimizationEngine::new();
        let request = engine.extract_intent("hello");
        let mut result = engine.apply_optimization(&request).unwrap();
        assert_eq!(
            engine.assemble_prompt(&result, &request),
            result.optimized_prompt.clone().unwrap()
        );

        result.optimized_prompt = None;
        assert_eq!(engine.assemble_prompt(&result, &request), "hello");
    }
}
