//! Line input for the interactive shell

use crossterm::style::{Color, Stylize};
use std::io::{self, BufRead, Write};

/// Reads one prompt per line from stdin behind a styled label
pub struct PromptHandler {
    label: String,
}

impl PromptHandler {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    /// Display the label and read a trimmed line.
    /// Returns None on EOF (Ctrl+D) or a read error.
    pub fn read_line(&self, color: Color) -> Option<String> {
        print!("{} ", self.label.as_str().with(color));
        io::stdout().flush().ok()?;

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }
}

impl Default for PromptHandler {
    fn default() -> Self {
        Self::new("optimize>")
    }
}
