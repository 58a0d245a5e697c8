//! Terminal styling helpers
//!
//! Output goes through `anstream`, which strips the escapes when stdout is
//! not a terminal.

use indicatif::ProgressStyle;
use owo_colors::OwoColorize;
use std::fmt;

/// Success mark
pub const CHECK: &str = "✓";

/// List bullet
pub const ARROW: &str = "→";

/// Semantic styles for anything displayable
pub trait Stylize: fmt::Display + Sized {
    /// Headings and key values
    fn emphasis(&self) -> String {
        self.bold().to_string()
    }

    /// Branch names, counts
    fn accent(&self) -> String {
        self.cyan().to_string()
    }

    /// Secondary text
    fn muted(&self) -> String {
        self.dimmed().to_string()
    }

    /// Completed actions
    fn success(&self) -> String {
        self.green().to_string()
    }

    /// Warnings
    fn warn(&self) -> String {
        self.yellow().to_string()
    }
}

impl<T: fmt::Display> Stylize for T {}

/// Styled check mark
pub fn check() -> String {
    CHECK.success()
}

/// Styled arrow bullet
pub fn arrow() -> String {
    ARROW.muted()
}

/// Spinner used while waiting on the network
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// `text` as a clickable link where the terminal supports it
pub fn link(text: &str, url: &str) -> String {
    if url.is_empty() || !supports_hyperlinks::on(supports_hyperlinks::Stream::Stdout) {
        return text.to_string();
    }
    terminal_link::Link::new(text, url).to_string()
}
