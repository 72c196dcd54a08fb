//! Terminal rendering with markdown support

use crossterm::style::{Color, Stylize};
use serde_json::{Map, Value};
use termimad::MadSkin;

use super::theme::Theme;
use crate::formatters::{OptimizedResult, OutputMode};
use crate::generator::GeneratedText;
use crate::validation::ValidationResult;

/// Terminal renderer with markdown and styled output
pub struct TerminalRenderer {
    theme: Theme,
    skin: MadSkin,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        let theme = Theme::default();
        let skin = Self::build_skin(&theme);
        Self { theme, skin }
    }

    fn build_skin(theme: &Theme) -> MadSkin {
        let mut skin = MadSkin::default();
        skin.set_headers_fg(to_termimad_color(theme.title));
        skin.bold.set_fg(to_termimad_color(theme.command));
        skin.italic.set_fg(to_termimad_color(Color::DarkYellow));
        skin.inline_code.set_fg(to_termimad_color(Color::Green));
        skin.code_block.set_fg(to_termimad_color(Color::Green));
        skin
    }

    /// Render the welcome banner
    pub fn render_banner(&self, version: &str, mode: OutputMode, platform: &str) {
        println!();
        println!("{}", "  Prompt Optimizer Shell".with(self.theme.title));
        println!("  {} {}", "v".with(self.theme.dim), version.with(self.theme.dim));
        println!(
            "  {} {} {} {}",
            "Mode:".with(self.theme.dim),
            mode.as_str().with(self.theme.stats),
            "Platform:".with(self.theme.dim),
            platform.with(self.theme.stats),
        );
        println!(
            "  {}",
            "Type a prompt to optimize it, /help for commands, /quit to exit".with(self.theme.dim)
        );
        println!();
    }

    /// Render an optimization result: markdown for conversational text,
    /// verbatim for structured text
    pub fn render_result(&self, result: &OptimizedResult) {
        println!();
        match result.format_type {
            OutputMode::Conversational => self.skin.print_text(&result.optimized_prompt),
            OutputMode::Structured => {
                println!("{}", result.optimized_prompt.as_str().with(self.theme.result))
            }
        }
        println!();
    }

    /// Warnings for valid input, the error list otherwise
    pub fn render_validation(&self, validation: &ValidationResult) {
        if validation.is_valid {
            for warning in &validation.warnings {
                self.render_warning(warning);
            }
            return;
        }

        self.render_error("Validation failed:");
        for error in &validation.errors {
            println!("    {} {}", "\u{2022}".with(self.theme.error), error);
        }
    }

    pub fn render_metadata(&self, metadata: &Map<String, Value>) {
        self.render_system("Metadata:");
        for (key, value) in metadata {
            let shown = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            println!(
                "    {} {}",
                format!("{}:", key).with(self.theme.dim),
                shown.with(self.theme.stats)
            );
        }
        println!();
    }

    pub fn render_preview(&self, text: &GeneratedText) {
        println!();
        self.skin.print_text(&text.content);
        println!(
            "\n  {} {} tokens in {:.2}s [{}]",
            "\u{2022}".with(self.theme.dim),
            format!("{}", text.tokens_used).with(self.theme.stats),
            text.response_time.as_secs_f64(),
            text.model.as_str().with(self.theme.dim),
        );
        println!();
    }

    /// Render a system message
    pub fn render_system(&self, msg: &str) {
        println!("  {} {}", "\u{25b6}".with(self.theme.system), msg.with(self.theme.system));
    }

    pub fn render_warning(&self, msg: &str) {
        println!("  {} {}", "!".with(self.theme.warning), msg.with(self.theme.warning));
    }

    /// Render an error message
    pub fn render_error(&self, msg: &str) {
        println!("  {} {}", "\u{2717}".with(self.theme.error), msg.with(self.theme.error));
    }

    /// Render a success message
    pub fn render_success(&self, msg: &str) {
        println!("  {} {}", "\u{2713}".with(self.theme.success), msg.with(self.theme.success));
    }

    /// Render info text
    pub fn render_info(&self, msg: &str) {
        println!("  {}", msg.with(self.theme.dim));
    }

    pub fn prompt_color(&self) -> Color {
        self.theme.prompt
    }

    pub fn command_color(&self) -> Color {
        self.theme.command
    }

    pub fn dim_color(&self) -> Color {
        self.theme.dim
    }

    pub fn stats_color(&self) -> Color {
        self.theme.stats
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert crossterm Color to termimad color
fn to_termimad_color(color: Color) -> termimad::crossterm::style::Color {
    use termimad::crossterm::style::Color as T;

    match color {
        Color::Black => T::Black,
        Color::DarkGrey => T::DarkGrey,
        Color::Red => T::Red,
        Color::DarkRed => T::DarkRed,
        Color::Green => T::Green,
        Color::DarkGreen => T::DarkGreen,
        Color::Yellow => T::Yellow,
        Color::DarkYellow => T::DarkYellow,
        Color::Blue => T::Blue,
        Color::DarkBlue => T::DarkBlue,
        Color::Magenta => T::Magenta,
        Color::DarkMagenta => T::DarkMagenta,
        Color::Cyan => T::Cyan,
        Color::DarkCyan => T::DarkCyan,
        Color::White => T::White,
        Color::Grey => T::Grey,
        _ => T::Reset,
    }
}
