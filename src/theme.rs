//! Terminal styling for report output

use colored::{ColoredString, Colorize};

pub struct Theme;

impl Theme {
    pub fn header(text: &str) -> ColoredString {
        text.bold()
    }

    pub fn primary(text: &str) -> ColoredString {
        text.normal()
    }

    pub fn muted(text: &str) -> ColoredString {
        text.dimmed()
    }

    pub fn value(text: &str) -> ColoredString {
        text.bold()
    }

    pub fn info(text: &str) -> ColoredString {
        text.cyan()
    }

    pub fn success(text: &str) -> ColoredString {
        text.green().bold()
    }

    pub fn warning(text: &str) -> ColoredString {
        text.yellow()
    }

    pub fn warning_msg(text: &str) -> ColoredString {
        text.yellow().bold()
    }

    pub fn error(text: &str) -> ColoredString {
        text.red().bold()
    }

    /// Modified files are the most serious finding
    pub fn danger(text: &str) -> ColoredString {
        text.red().bold()
    }

    pub fn command(text: &str) -> ColoredString {
        text.cyan().bold()
    }

    pub fn divider(width: usize) -> ColoredString {
        "─".repeat(width).dimmed()
    }

    pub fn divider_bold(width: usize) -> ColoredString {
        "━".repeat(width).normal()
    }
}
