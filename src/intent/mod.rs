//! Intent classification for prompt optimization
//!
//! Each scored intent owns an ordered list of case-insensitive patterns. A prompt's
//! score for an intent is the number of non-overlapping matches summed across all
//! of that intent's patterns. The highest score wins; ties go to the intent that
//! comes first in [`Intent::PRIORITY`], and an all-zero score yields
//! [`Intent::General`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coarse purpose of a prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Creative,
    Technical,
    Educational,
    Analytical,
    Conversational,
    General,
}

impl Intent {
    /// Scored intents in tie-break order. `General` is never scored.
    pub const PRIORITY: [Intent; 5] = [
        Intent::Creative,
        Intent::Technical,
        Intent::Educational,
        Intent::Analytical,
        Intent::Conversational,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Creative => "creative",
            Intent::Technical => "technical",
            Intent::Educational => "educational",
            Intent::Analytical => "analytical",
            Intent::Conversational => "conversational",
            Intent::General => "general",
        }
    }

    /// Representative keywords, used for display only
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Intent::Creative => &["story", "creative", "write", "generate", "imaginative"],
            Intent::Technical => &["code", "technical", "program", "debug", "implement"],
            Intent::Educational => &["explain", "teach", "learn", "tutorial", "example"],
            Intent::Analytical => &["analyze", "compare", "evaluate", "data", "research"],
            Intent::Conversational => &["chat", "discuss", "opinion", "casual", "friendly"],
            Intent::General => &["help", "assist", "provide", "give", "show"],
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "creative" => Ok(Intent::Creative),
            "technical" => Ok(Intent::Technical),
            "educational" => Ok(Intent::Educational),
            "analytical" => Ok(Intent::Analytical),
            "conversational" => Ok(Intent::Conversational),
            "general" => Ok(Intent::General),
            other => Err(format!("unknown intent: {}", other)),
        }
    }
}

/// Pattern table, built once per process
static INTENT_PATTERNS: Lazy<Vec<(Intent, Vec<Regex>)>> = Lazy::new(|| {
    let table: [(Intent, &[&str]); 5] = [
        (
            Intent::Creative,
            &[
                r"\b(write|create|generate|compose)\b.*\b(story|poem|article|content)\b",
                r"\b(creative|imaginative|artistic)\b",
                r"\b(character|plot|narrative|fiction)\b",
            ],
        ),
        (
            Intent::Technical,
            &[
                r"\b(code|program|function|algorithm|debug)\b",
                r"\b(technical|programming|software|development)\b",
                r"\b(api|database|server|framework)\b",
                r"\b(explain|how does|how to)\b.*\b(work|function|implement)\b",
            ],
        ),
        (
            Intent::Educational,
            &[
                r"\b(explain|teach|learn|understand|clarify)\b",
                r"\b(what is|define|definition|concept)\b",
                r"\b(tutorial|guide|instruction|lesson)\b",
                r"\b(example|demonstrate|show me)\b",
            ],
        ),
        (
            Intent::Analytical,
            &[
                r"\b(analyze|compare|evaluate|assess|review)\b",
                r"\b(pros and cons|advantages|disadvantages)\b",
                r"\b(data|statistics|research|study)\b",
                r"\b(conclusion|summary|findings)\b",
            ],
        ),
        (
            Intent::Conversational,
            &[
                r"\b(chat|talk|discuss|conversation)\b",
                r"\b(opinion|think|feel|believe)\b",
                r"\b(casual|friendly|informal)\b",
            ],
        ),
    ];

    table
        .into_iter()
        .map(|(intent, patterns)| {
            let compiled = patterns
                .iter()
                .map(|p| Regex::new(p).expect("intent pattern must compile"))
                .collect();
            (intent, compiled)
        })
        .collect()
});

/// Scores free text against the intent pattern table
#[derive(Debug, Clone, Default)]
pub struct IntentClassifier;

impl IntentClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify a prompt into a single intent
    pub fn classify(&self, text: &str) -> Intent {
        let mut best = Intent::General;
        let mut best_score = 0;

        for (intent, score) in self.scores(text) {
            // Strictly greater keeps the earlier intent on ties
            if score > best_score {
                best = intent;
                best_score = score;
            }
        }

        best
    }

    /// Per-intent scores in priority order
    pub fn scores(&self, text: &str) -> Vec<(Intent, usize)> {
        let lowered = text.to_lowercase();

        INTENT_PATTERNS
            .iter()
            .map(|(intent, patterns)| {
                let score = patterns
                    .iter()
                    .map(|re| re.find_iter(&lowered).count())
                    .sum();
                (*intent, score)
            })
            .collect()
    }

    /// Representative keywords for an intent
    pub fn keywords_for(&self, intent: Intent) -> &'static [&'static str] {
        intent.keywords()
    }
}
