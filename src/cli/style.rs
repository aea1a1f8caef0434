//! Terminal output markers shared by the commands.

use owo_colors::OwoColorize;

pub const INFO_CHAR: &str = "\u{2139}"; // ℹ
pub const OK_CHAR: &str = "\u{2714}"; // ✔
pub const WARN_CHAR: &str = "\u{26a0}"; // ⚠
pub const ALERT_CHAR: &str = "\u{2716}"; // ✖
pub const WORKING_CHAR: &str = "\u{2699}"; // ⚙

/// Primary highlight for names and counts.
pub fn hilite(text: impl std::fmt::Display) -> String {
    text.bold().cyan().to_string()
}

/// Secondary highlight.
pub fn lolite(text: impl std::fmt::Display) -> String {
    text.yellow().to_string()
}
