//! Interactive shell for optimizing prompts one line at a time
//!
//! Each line that is not a slash command is optimized with the session's
//! current mode and platform. History lives only as long as the shell.

pub mod commands;
pub mod prompt;
pub mod renderer;
pub mod spinner;
pub mod theme;

use crate::formatters::{OptimizedResult, OutputMode};
use crate::optimizer::{parse_platform, PromptOptimizer};
use crate::validation::ValidationResult;

use commands::{parse_command, render_help, SlashCommand, EXAMPLE_PROMPTS};
use prompt::PromptHandler;
use renderer::TerminalRenderer;
use spinner::Spinner;

use anyhow::Result;
use crossterm::style::Stylize;
use std::collections::BTreeMap;
use tracing::debug;

const HISTORY_SHOWN: usize = 10;
const HISTORY_PREVIEW_CHARS: usize = 50;

/// Intent bucket for results that do not report one (structured mode)
const UNKNOWN_INTENT: &str = "unknown";

/// One optimization performed in the session
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub input: String,
    pub mode: OutputMode,
    pub platform: String,
    pub valid: bool,
    pub improvements: usize,
    /// Detected intent, when the result's metadata carries one
    pub intent: Option<String>,
}

impl HistoryEntry {
    pub fn new(
        input: &str,
        mode: OutputMode,
        platform: &str,
        result: &OptimizedResult,
        validation: &ValidationResult,
    ) -> Self {
        Self {
            input: input.to_string(),
            mode,
            platform: platform.to_string(),
            valid: validation.is_valid,
            improvements: result.improvements.len(),
            intent: result
                .metadata
                .get("intent")
                .and_then(|v| v.as_str())
                .map(str::to_string),
        }
    }

    /// Input shortened for one-line display
    pub fn summary(&self) -> String {
        if self.input.chars().count() > HISTORY_PREVIEW_CHARS {
            let head: String = self.input.chars().take(HISTORY_PREVIEW_CHARS).collect();
            format!("{}...", head)
        } else {
            self.input.clone()
        }
    }
}

/// Aggregates over a session's history
#[derive(Debug, Default, PartialEq)]
pub struct SessionStats {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub intents: BTreeMap<String, usize>,
    pub platforms: BTreeMap<String, usize>,
    pub modes: BTreeMap<String, usize>,
}

impl SessionStats {
    pub fn from_history(history: &[HistoryEntry]) -> Self {
        let mut stats = Self {
            total: history.len(),
            ..Self::default()
        };

        for entry in history {
            if entry.valid {
                stats.successful += 1;
                let intent = entry.intent.as_deref().unwrap_or(UNKNOWN_INTENT);
                *stats.intents.entry(intent.to_string()).or_default() += 1;
            }
            *stats.platforms.entry(entry.platform.clone()).or_default() += 1;
            *stats.modes.entry(entry.mode.to_string()).or_default() += 1;
        }
        stats.failed = stats.total - stats.successful;

        stats
    }

    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.successful as f64 / self.total as f64 * 100.0
        }
    }
}

pub struct InteractiveShell {
    optimizer: PromptOptimizer,
    mode: OutputMode,
    platform: String,
    show_metadata: bool,
    history: Vec<HistoryEntry>,
    /// Last accepted input, for /preview
    last_input: Option<String>,
    renderer: TerminalRenderer,
    prompt_handler: PromptHandler,
}

impl InteractiveShell {
    pub fn new(optimizer: PromptOptimizer, mode: OutputMode, platform: impl Into<String>) -> Self {
        Self {
            optimizer,
            mode,
            platform: platform.into(),
            show_metadata: false,
            history: Vec::new(),
            last_input: None,
            renderer: TerminalRenderer::new(),
            prompt_handler: PromptHandler::default(),
        }
    }

    /// Run the shell main loop until /quit or EOF
    pub async fn run(&mut self) -> Result<()> {
        self.renderer
            .render_banner(env!("CARGO_PKG_VERSION"), self.mode, &self.platform);

        loop {
            let Some(input) = self.prompt_handler.read_line(self.renderer.prompt_color()) else {
                break;
            };

            if input.is_empty() {
                continue;
            }

            if let Some(cmd) = parse_command(&input) {
                match self.handle_command(cmd).await {
                    CommandResult::Continue => continue,
                    CommandResult::Quit => break,
                }
            } else {
                self.optimize_and_display(&input);
            }
        }

        self.renderer.render_info("Goodbye!");
        Ok(())
    }

    async fn handle_command(&mut self, cmd: SlashCommand) -> CommandResult {
        debug!(?cmd, "shell command");
        match cmd {
            SlashCommand::Help => render_help(&self.renderer),
            SlashCommand::Quit => return CommandResult::Quit,
            SlashCommand::Mode(None) => {
                self.renderer.render_info(&format!("Current mode: {}", self.mode));
            }
            SlashCommand::Mode(Some(name)) => match name.parse::<OutputMode>() {
                Ok(mode) => {
                    self.mode = mode;
                    self.renderer.render_success(&format!("Mode set to: {}", mode));
                }
                Err(e) => self.renderer.render_error(&e.to_string()),
            },
            SlashCommand::Platform(None) => {
                self.renderer
                    .render_info(&format!("Current platform: {}", self.platform));
            }
            SlashCommand::Platform(Some(name)) => match parse_platform(&name) {
                Ok(platform) => {
                    self.renderer
                        .render_success(&format!("Platform set to: {}", platform));
                    self.platform = platform;
                }
                Err(e) => self.renderer.render_error(&e.to_string()),
            },
            SlashCommand::Metadata(setting) => {
                self.show_metadata = setting.unwrap_or(!self.show_metadata);
                let state = if self.show_metadata { "on" } else { "off" };
                self.renderer
                    .render_success(&format!("Metadata display {}", state));
            }
            SlashCommand::History => self.render_history(),
            SlashCommand::Stats => self.render_stats(),
            SlashCommand::Clear => {
                self.history.clear();
                self.last_input = None;
                self.renderer.render_success("History cleared.");
            }
            SlashCommand::Examples => {
                println!();
                self.renderer.render_system("Example prompts:");
                for (i, example) in EXAMPLE_PROMPTS.iter().enumerate() {
                    println!(
                        "  {} {}",
                        format!("{}.", i + 1).with(self.renderer.dim_color()),
                        example
                    );
                }
                println!();
            }
            SlashCommand::Preview => self.preview_last().await,
            SlashCommand::Unknown(name) => {
                self.renderer.render_error(&format!(
                    "Unknown command: {}. Type /help for available commands",
                    name
                ));
            }
        }
        CommandResult::Continue
    }

    fn optimize_and_display(&mut self, input: &str) {
        let (result, validation) = self.optimizer.optimize(input, self.mode, &self.platform);

        self.history.push(HistoryEntry::new(
            input,
            self.mode,
            &self.platform,
            &result,
            &validation,
        ));

        if validation.is_valid {
            self.renderer.render_result(&result);
            self.last_input = Some(input.to_string());
        }
        self.renderer.render_validation(&validation);

        if self.show_metadata {
            self.renderer.render_metadata(&result.metadata);
        }
    }

    async fn preview_last(&mut self) {
        let Some(prompt) = self
            .last_input
            .as_deref()
            .and_then(|input| self.optimizer.optimized_text(input, &self.platform))
        else {
            self.renderer.render_info("Nothing to preview yet.");
            return;
        };

        let mut spinner = Spinner::new();
        spinner.start("Generating preview...");
        let outcome = self.optimizer.preview(&prompt, &self.platform).await;
        spinner.stop();

        match outcome {
            Ok(text) => self.renderer.render_preview(&text),
            Err(e) => self.renderer.render_error(&format!("Preview failed: {}", e)),
        }
    }

    fn render_history(&self) {
        if self.history.is_empty() {
            self.renderer.render_info("No history yet.");
            return;
        }

        println!();
        self.renderer
            .render_system(&format!("History ({} items):", self.history.len()));

        let start = self.history.len().saturating_sub(HISTORY_SHOWN);
        for (i, entry) in self.history[start..].iter().enumerate() {
            println!(
                "  {} {}",
                format!("{}.", start + i + 1).with(self.renderer.dim_color()),
                entry.summary()
            );
            let outcome = if entry.valid {
                format!("{} improvements applied", entry.improvements)
            } else {
                "failed validation".to_string()
            };
            self.renderer.render_info(&format!(
                "   {} / {}: {}",
                entry.mode, entry.platform, outcome
            ));
        }
        println!();
    }

    fn render_stats(&self) {
        let stats = SessionStats::from_history(&self.history);
        let dim = self.renderer.dim_color();
        let num = self.renderer.stats_color();

        println!();
        self.renderer.render_system("Session Statistics:");
        println!("  {} {}", "Total prompts:".with(dim), format!("{}", stats.total).with(num));
        println!(
            "  {} {}",
            "Successful:".with(dim),
            format!("{} ({:.1}%)", stats.successful, stats.success_rate()).with(num)
        );
        println!("  {} {}", "Failed:".with(dim), format!("{}", stats.failed).with(num));

        for (title, counts) in [
            ("Intents:", &stats.intents),
            ("Platforms:", &stats.platforms),
            ("Modes:", &stats.modes),
        ] {
            if counts.is_empty() {
                continue;
            }
            println!("  {}", title.with(dim));
            for (name, count) in counts {
                println!(
                    "    {} {}",
                    format!("{}:", name).with(dim),
                    format!("{}", count).with(num)
                );
            }
        }

        println!();
        for line in self.optimizer.cache_metrics().to_string().lines() {
            self.renderer.render_info(line);
        }
        println!();
    }
}

/// Result of handling a slash command
enum CommandResult {
    Continue,
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(input: &str, platform: &str, valid: bool, intent: Option<&str>) -> HistoryEntry {
        HistoryEntry {
            input: input.to_string(),
            mode: OutputMode::Conversational,
            platform: platform.to_string(),
            valid,
            improvements: if valid { 3 } else { 0 },
            intent: intent.map(str::to_string),
        }
    }

    #[test]
    fn test_history_entry_from_result() {
        let optimizer = PromptOptimizer::new();
        let (result, validation) =
            optimizer.optimize("Debug this function", OutputMode::Conversational, "claude");
        let entry = HistoryEntry::new(
            "Debug this function",
            OutputMode::Conversational,
            "claude",
            &result,
            &validation,
        );

        assert!(entry.valid);
        assert_eq!(entry.intent.as_deref(), Some("technical"));
        assert_eq!(entry.improvements, result.improvements.len());
    }

    #[test]
    fn test_history_entry_for_invalid_input() {
        let optimizer = PromptOptimizer::new();
        let (result, validation) = optimizer.optimize("", OutputMode::Structured, "gemini");
        let entry = HistoryEntry::new("", OutputMode::Structured, "gemini", &result, &validation);

        assert!(!entry.valid);
        assert_eq!(entry.intent, None);
        assert_eq!(entry.improvements, 0);
    }

    #[test]
    fn test_summary_truncates_on_char_boundary() {
        let long = "\u{e9}".repeat(60);
        let summary = entry(&long, "claude", true, None).summary();
        assert_eq!(summary.chars().count(), 53);
        assert!(summary.ends_with("..."));

        assert_eq!(entry("short", "claude", true, None).summary(), "short");
    }

    #[test]
    fn test_session_stats() {
        let history = vec![
            entry("a", "claude", true, Some("technical")),
            entry("b", "claude", true, Some("creative")),
            entry("c", "gemini", true, Some("technical")),
            entry("", "gemini", false, None),
        ];

        let stats = SessionStats::from_history(&history);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.successful, 3);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.intents.get("technical"), Some(&2));
        assert_eq!(stats.platforms.get("gemini"), Some(&2));
        assert_eq!(stats.modes.get("conversational"), Some(&4));
        assert!((stats.success_rate() - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_stats() {
        let stats = SessionStats::from_history(&[]);
        assert_eq!(stats, SessionStats::default());
        assert_eq!(stats.success_rate(), 0.0);
    }

    #[test]
    fn test_structured_runs_count_as_unknown_intent() {
        let optimizer = PromptOptimizer::new();
        let (result, validation) =
            optimizer.optimize("Debug this function", OutputMode::Structured, "claude");
        let structured = HistoryEntry::new(
            "Debug this function",
            OutputMode::Structured,
            "claude",
            &result,
            &validation,
        );
        assert!(structured.valid);
        assert_eq!(structured.intent, None);

        let history = vec![structured, entry("a", "claude", true, Some("technical"))];
        let stats = SessionStats::from_history(&history);
        assert_eq!(stats.intents.get("unknown"), Some(&1));
        assert_eq!(stats.intents.get("technical"), Some(&1));
        assert_eq!(stats.intents.values().sum::<usize>(), stats.successful);
    }

    #[tokio::test]
    async fn test_commands_update_session() {
        let mut shell =
            InteractiveShell::new(PromptOptimizer::new(), OutputMode::Conversational, "claude");

        shell
            .handle_command(SlashCommand::Mode(Some("structured".to_string())))
            .await;
        assert_eq!(shell.mode, OutputMode::Structured);

        shell
            .handle_command(SlashCommand::Platform(Some("Gemini".to_string())))
            .await;
        assert_eq!(shell.platform, "gemini");

        shell
            .handle_command(SlashCommand::Platform(Some("llama".to_string())))
            .await;
        assert_eq!(shell.platform, "gemini");

        shell.handle_command(SlashCommand::Metadata(None)).await;
        assert!(shell.show_metadata);

        assert!(matches!(
            shell.handle_command(SlashCommand::Quit).await,
            CommandResult::Quit
        ));
    }

    #[tokio::test]
    async fn test_optimize_records_history() {
        let mut shell =
            InteractiveShell::new(PromptOptimizer::new(), OutputMode::Conversational, "claude");
        shell.optimize_and_display("Write a poem about rust");
        shell.optimize_and_display("   ");

        assert_eq!(shell.history.len(), 2);
        assert!(shell.history[0].valid);
        assert!(!shell.history[1].valid);
        assert_eq!(shell.last_input.as_deref(), Some("Write a poem about rust"));

        shell.handle_command(SlashCommand::Clear).await;
        assert!(shell.history.is_empty());
        assert!(shell.last_input.is_none());
    }
}
