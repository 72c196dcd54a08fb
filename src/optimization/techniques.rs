//! Develop, Design and Deliver stages
//!
//! Every stage is a pure text-in, text-out function. The lookup tables are
//! built once when [`OptimizationTechniques`] is constructed.

use super::{OutputType, Technique};
use crate::intent::Intent;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Below this many words, Develop asks for more detail
const DETAIL_WORD_THRESHOLD: usize = 10;

/// Below this many words, Design applies the platform template
const TEMPLATE_WORD_THRESHOLD: usize = 15;

const DETAIL_REQUEST: &str = " Please provide detailed information.";
const ACTION_PLACEHOLDER: &str = "{action}";
const POLITE_MARKERS: [&str; 3] = ["Please", "Can you", "How"];
const TERMINAL_PUNCTUATION: &[char] = &['.', '!', '?'];

static CONTEXT_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)context|background|requirements").expect("valid regex"));

/// Anchored at word starts, so "information" is not a format mention and
/// short prompts padded with the detail request still get the instruction
static FORMAT_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(format|structur|organi[sz])").expect("valid regex"));

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

static VAGUE_TERMS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"(?i)\bsomething\b", "a specific item"),
        (r"(?i)\banything\b", "any relevant information"),
        (r"(?i)\bstuff\b", "relevant details"),
        (r"(?i)\bthings\b", "specific elements"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).expect("valid regex"), replacement))
    .collect()
});

/// Prefix, structure and suffix applied to short prompts for one platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformTemplate {
    pub prefix: &'static str,
    /// Contains `{action}` where the lower-cased prompt goes
    pub structure: &'static str,
    pub suffix: &'static str,
}

/// The three rewrite stages and their lookup tables
#[derive(Debug, Clone)]
pub struct OptimizationTechniques {
    templates: HashMap<&'static str, PlatformTemplate>,
    generic: PlatformTemplate,
    format_instructions: HashMap<OutputType, &'static str>,
}

impl OptimizationTechniques {
    pub fn new() -> Self {
        let templates = HashMap::from([
            (
                "claude",
                PlatformTemplate {
                    prefix: "Human: ",
                    structure: "Please {action}. Be thorough and accurate.",
                    suffix: "",
                },
            ),
            (
                "chatgpt",
                PlatformTemplate {
                    prefix: "",
                    structure: "Act as an expert. {action}",
                    suffix: "Provide a comprehensive response.",
                },
            ),
            (
                "gemini",
                PlatformTemplate {
                    prefix: "",
                    structure: "{action}",
                    suffix: "Be precise and helpful.",
                },
            ),
        ]);

        let generic = PlatformTemplate {
            prefix: "",
            structure: "{action}",
            suffix: "",
        };

        let format_instructions = HashMap::from([
            (
                OutputType::List,
                "Please format your response as a numbered or bulleted list.",
            ),
            (
                OutputType::Explanation,
                "Please provide a clear, step-by-step explanation.",
            ),
            (
                OutputType::Code,
                "Please provide code examples with comments and explanations.",
            ),
            (
                OutputType::Creative,
                "Please be creative and engaging in your response.",
            ),
            (
                OutputType::General,
                "Please provide a comprehensive and well-structured response.",
            ),
        ]);

        Self {
            templates,
            generic,
            format_instructions,
        }
    }

    /// Template for a platform; unknown platforms get the generic profile
    pub fn template_for(&self, platform: &str) -> &PlatformTemplate {
        self.templates.get(platform).unwrap_or(&self.generic)
    }

    /// Closing instruction for an output type
    pub fn format_instruction(&self, output_type: OutputType) -> &'static str {
        self.format_instructions
            .get(&output_type)
            .or_else(|| self.format_instructions.get(&OutputType::General))
            .copied()
            .unwrap_or_default()
    }

    /// Run a single stage by identifier
    pub fn apply(
        &self,
        technique: Technique,
        text: &str,
        intent: Intent,
        platform: &str,
        output_type: OutputType,
    ) -> String {
        match technique {
            Technique::DevelopClarity => self.develop_clarity(text, intent),
            Technique::DesignStructure => self.design_structure(text, platform, intent),
            Technique::DeliverFormat => self.deliver_format(text, output_type),
        }
    }

    /// Develop: add context for technical prompts, replace vague terms and
    /// ask for detail when the prompt is very short
    pub fn develop_clarity(&self, text: &str, intent: Intent) -> String {
        let mut enhanced = text.to_string();

        if intent == Intent::Technical && !CONTEXT_MARKER.is_match(&enhanced) {
            enhanced = format!("Context: {}", enhanced);
        }

        for (pattern, replacement) in VAGUE_TERMS.iter() {
            enhanced = pattern.replace_all(&enhanced, *replacement).into_owned();
        }

        if enhanced.split_whitespace().count() < DETAIL_WORD_THRESHOLD {
            enhanced.push_str(DETAIL_REQUEST);
        }

        enhanced
    }

    /// Design: wrap short prompts in the platform template, then phrase
    /// technical prompts as a polite request
    pub fn design_structure(&self, text: &str, platform: &str, intent: Intent) -> String {
        let template = self.template_for(platform);
        let mut structured = text.to_string();

        if structured.split_whitespace().count() < TEMPLATE_WORD_THRESHOLD {
            let action = structured.to_lowercase();
            let action = action.trim();

            if template.structure.contains(ACTION_PLACEHOLDER) {
                structured = template.structure.replace(ACTION_PLACEHOLDER, action);
            }
            if !template.prefix.is_empty() {
                structured = format!("{}{}", template.prefix, structured);
            }
            if !template.suffix.is_empty() {
                structured = format!("{} {}", structured, template.suffix);
            }
        }

        if intent == Intent::Technical
            && !POLITE_MARKERS.iter().any(|m| structured.starts_with(m))
        {
            structured = format!("Please {}", structured.to_lowercase());
        }

        structured
    }

    /// Deliver: append the output-type instruction, normalize whitespace and
    /// guarantee terminal punctuation
    pub fn deliver_format(&self, text: &str, output_type: OutputType) -> String {
        let mut formatted = text.to_string();

        if !FORMAT_MARKER.is_match(&formatted) {
            formatted.push(' ');
            formatted.push_str(self.format_instruction(output_type));
        }

        let mut formatted = WHITESPACE.replace_all(&formatted, " ").trim().to_string();

        if !formatted.ends_with(TERMINAL_PUNCTUATION) {
            formatted.push('.');
        }

        formatted
    }
}

impl Default for OptimizationTechniques {
    fn default() -> Self {
        Self::new()
    }
}
