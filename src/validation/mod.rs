//! Input validation and sanitization
//!
//! The optimizer consumes only the verdict and the sanitized text.

use crate::formatters::OutputMode;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

pub const DEFAULT_MAX_CHARS: usize = 10_000;
pub const DEFAULT_WARN_CHARS: usize = 5_000;

static SCRIPT_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script\b.*?</script\s*>").expect("valid regex"));

/// Verdict for one piece of input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub sanitized_input: Option<String>,
}

impl ValidationResult {
    pub fn valid(sanitized: String, warnings: Vec<String>) -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings,
            sanitized_input: Some(sanitized),
        }
    }

    pub fn invalid(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            is_valid: false,
            errors,
            warnings,
            sanitized_input: None,
        }
    }
}

/// Pass/fail check plus sanitized text
pub trait Validator: Send + Sync {
    fn validate(&self, text: &str, mode: OutputMode) -> ValidationResult;
}

/// Limits applied by [`InputValidator`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Hard limit, in characters
    pub max_chars: usize,
    /// Soft limit that only produces a warning
    pub warn_chars: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
            warn_chars: DEFAULT_WARN_CHARS,
        }
    }
}

/// Default validator: rejects empty and oversized input, strips control
/// characters and script blocks
#[derive(Debug, Clone, Default)]
pub struct InputValidator {
    config: ValidationConfig,
}

impl InputValidator {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    fn sanitize(&self, text: &str) -> String {
        let without_scripts = SCRIPT_BLOCK.replace_all(text, "");
        without_scripts
            .chars()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
            .collect::<String>()
            .trim()
            .to_string()
    }
}

impl Validator for InputValidator {
    fn validate(&self, text: &str, _mode: OutputMode) -> ValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        let length = text.chars().count();
        if length > self.config.max_chars {
            errors.push(format!(
                "Input exceeds maximum length of {} characters",
                self.config.max_chars
            ));
        } else if length > self.config.warn_chars {
            warnings.push("Input is very long; optimization may be less effective".to_string());
        }

        let sanitized = self.sanitize(text);
        if sanitized.is_empty() {
            errors.push("Input cannot be empty".to_string());
        } else if sanitized != text.trim() {
            warnings.push("Input was sanitized".to_string());
        }

        if !errors.is_empty() {
            info!(errors = errors.len(), "input rejected");
            return ValidationResult::invalid(errors, warnings);
        }

        ValidationResult::valid(sanitized, warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate(text: &str) -> ValidationResult {
        InputValidator::default().validate(text, OutputMode::Conversational)
    }

    #[test]
    fn test_plain_input_passes() {
        let result = validate("  Write me a story about AI \n");
        assert!(result.is_valid);
        assert!(result.warnings.is_empty());
        assert_eq!(result.sanitized_input.as_deref(), Some("Write me a story about AI"));
    }

    #[test]
    fn test_empty_input_rejected() {
        for text in ["", "   ", "\n\t"] {
            let result = validate(text);
            assert!(!result.is_valid);
            assert_eq!(result.errors, vec!["Input cannot be empty".to_string()]);
            assert!(result.sanitized_input.is_none());
        }
    }

    #[test]
    fn test_oversized_input_rejected() {
        let validator = InputValidator::new(ValidationConfig {
            max_chars: 10,
            warn_chars: 5,
        });
        let result = validator.validate("abcdefghijk", OutputMode::Structured);
        assert!(!result.is_valid);
        assert_eq!(
            result.errors,
            vec!["Input exceeds maximum length of 10 characters".to_string()]
        );
    }

    #[test]
    fn test_long_input_warns() {
        let validator = InputValidator::new(ValidationConfig {
            max_chars: 10,
            warn_chars: 5,
        });
        let result = validator.validate("abcdefg", OutputMode::Conversational);
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_sanitizes_control_chars_and_scripts() {
        let result = validate("Explain\u{0007} recursion<script>alert(1)</script>");
        assert!(result.is_valid);
        assert_eq!(result.sanitized_input.as_deref(), Some("Explain recursion"));
        assert_eq!(result.warnings, vec!["Input was sanitized".to_string()]);
    }

    #[test]
    fn test_script_only_input_is_empty() {
        let result = validate("<SCRIPT>x</SCRIPT>");
        assert!(!result.is_valid);
    }
}
