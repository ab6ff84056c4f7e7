//! Color, emoji, and formatting utilities for terminal output

use crate::core::constants::display;
use crate::core::types::LinkStatus;

pub struct Colors;

impl Colors {
    pub const RESET: &'static str = "\x1b[0m";
    pub const BOLD: &'static str = "\x1b[1m";
    pub const DIM: &'static str = "\x1b[2m";

    pub const CYAN: &'static str = "\x1b[36m";
    pub const BRIGHT_RED: &'static str = "\x1b[91m";
    pub const BRIGHT_GREEN: &'static str = "\x1b[92m";
    pub const BRIGHT_YELLOW: &'static str = "\x1b[93m";
    pub const BRIGHT_BLUE: &'static str = "\x1b[94m";
    pub const BRIGHT_CYAN: &'static str = "\x1b[96m";
    pub const BRIGHT_WHITE: &'static str = "\x1b[97m";
}

/// Apply color to text if terminal supports it
pub fn colorize(text: &str, color: &str) -> String {
    paint(text, color, supports_formatting())
}

/// Bold and colored heading text
pub fn heading(text: &str, color: &str) -> String {
    paint(text, &format!("{}{color}", Colors::BOLD), supports_formatting())
}

fn paint(text: &str, color: &str, enabled: bool) -> String {
    if enabled {
        format!("{color}{text}{}", Colors::RESET)
    } else {
        text.to_string()
    }
}

pub fn status_color(status: LinkStatus) -> &'static str {
    match status {
        LinkStatus::Valid => Colors::BRIGHT_GREEN,
        LinkStatus::Broken => Colors::BRIGHT_RED,
        LinkStatus::Skipped => Colors::DIM,
        LinkStatus::Warning => Colors::BRIGHT_YELLOW,
    }
}

pub fn status_emoji(status: LinkStatus) -> &'static str {
    match status {
        LinkStatus::Valid => display::VALID_EMOJI,
        LinkStatus::Broken => display::BROKEN_EMOJI,
        LinkStatus::Skipped => display::SKIPPED_EMOJI,
        LinkStatus::Warning => display::WARNING_EMOJI,
    }
}

/// Check if the current environment supports ANSI colors and emojis
pub fn supports_formatting() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }

    // Keep test output plain
    if cfg!(test) {
        return false;
    }

    match std::env::var("TERM") {
        Ok(term) => !(term == "dumb" || term.is_empty()),
        Err(_) => false,
    }
}
