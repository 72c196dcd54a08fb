//! Slash command parsing and definitions

use crate::optimization::Technique;
use crossterm::style::Stylize;

/// Available slash commands
#[derive(Debug, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    Quit,
    Mode(Option<String>),
    Platform(Option<String>),
    /// Toggle, or set explicitly with on/off
    Metadata(Option<bool>),
    History,
    Stats,
    Clear,
    Examples,
    /// Send the last optimized prompt to the generator
    Preview,
    Unknown(String),
}

/// Parse a slash command from user input.
/// Returns None if the input is not a slash command.
pub fn parse_command(input: &str) -> Option<SlashCommand> {
    let input = input.trim();
    if !input.starts_with('/') {
        return None;
    }

    let mut parts = input.split_whitespace();
    let cmd = parts.next().unwrap_or("/").to_lowercase();
    let arg = parts.next().map(|s| s.to_string());

    let command = match cmd.as_str() {
        "/help" | "/h" | "/?" => SlashCommand::Help,
        "/quit" | "/q" | "/exit" => SlashCommand::Quit,
        "/mode" | "/m" => SlashCommand::Mode(arg),
        "/platform" | "/p" => SlashCommand::Platform(arg),
        "/metadata" | "/meta" => SlashCommand::Metadata(arg.as_deref().and_then(parse_switch)),
        "/history" => SlashCommand::History,
        "/stats" => SlashCommand::Stats,
        "/clear" | "/cls" => SlashCommand::Clear,
        "/examples" => SlashCommand::Examples,
        "/preview" => SlashCommand::Preview,
        other => SlashCommand::Unknown(other.to_string()),
    };
    Some(command)
}

fn parse_switch(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Prompts worth trying in a fresh session
pub const EXAMPLE_PROMPTS: [&str; 8] = [
    "Write a technical blog post about machine learning",
    "Create a user manual for a mobile app",
    "Explain quantum computing to a 10-year-old",
    "Debug this Python sorting function",
    "Generate test cases for a login system",
    "Write a creative story about time travel",
    "Analyze the pros and cons of remote work",
    "Create a marketing strategy for a startup",
];

/// Render help text for all slash commands
pub fn render_help(renderer: &super::renderer::TerminalRenderer) {
    let cmd_color = renderer.command_color();
    let dim_color = renderer.dim_color();

    println!();
    renderer.render_system("Available commands:");
    println!();

    let commands = [
        ("/help", "Show this help message"),
        ("/quit", "Exit the shell"),
        ("/mode [name]", "Show or change the output mode (conversational, structured)"),
        ("/platform [name]", "Show or change the platform (claude, chatgpt, gemini, generic)"),
        ("/metadata [on|off]", "Toggle metadata display"),
        ("/history", "Show the last 10 optimizations"),
        ("/stats", "Show session and cache statistics"),
        ("/clear", "Clear the optimization history"),
        ("/examples", "Show example prompts"),
        ("/preview", "Run the last optimized prompt through the generator"),
    ];

    for (cmd, desc) in &commands {
        println!("  {:<22} {}", cmd.with(cmd_color), desc.with(dim_color));
    }
    println!();

    renderer.render_system("Optimization stages:");
    println!();
    for technique in Technique::PIPELINE {
        println!(
            "  {:<22} {}",
            technique.id().with(cmd_color),
            technique.description().with(dim_color)
        );
    }
    println!();
}
