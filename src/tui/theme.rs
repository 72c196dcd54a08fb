//! Terminal colors

use crossterm::style::Color;

pub struct Theme {
    /// Input label
    pub prompt: Color,
    /// Optimized prompt text in plain (non-markdown) output
    pub result: Color,
    pub system: Color,
    pub warning: Color,
    pub error: Color,
    /// Secondary info
    pub dim: Color,
    pub success: Color,
    pub title: Color,
    /// Counts and labels in /stats and /history
    pub stats: Color,
    /// Slash command names
    pub command: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            prompt: Color::Cyan,
            result: Color::White,
            system: Color::DarkYellow,
            warning: Color::Yellow,
            error: Color::Red,
            dim: Color::DarkGrey,
            success: Color::Green,
            title: Color::Magenta,
            stats: Color::Blue,
            command: Color::Yellow,
        }
    }
}
