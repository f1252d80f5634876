//! Terminal output and prompt helpers
//!
//! Themed dialoguer prompts plus the styled status lines used by every
//! command.

use anyhow::Result;
use console::style;
use dialoguer::{Confirm, Input, theme::ColorfulTheme};
use rokosync_core::{LogEntry, LogLevel, SessionReport, SessionState};

/// Get the shared theme for all prompts
pub fn theme() -> ColorfulTheme {
    ColorfulTheme::default()
}

/// Confirm yes/no with default
pub fn confirm(prompt: &str, default: bool) -> Result<bool> {
    let theme = theme();
    Ok(Confirm::with_theme(&theme)
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}

/// Get text input, re-prompting until `validate` accepts it
pub fn input_validated<F>(prompt: &str, default: &str, validate: F) -> Result<String>
where
    F: Fn(&String) -> Result<(), String>,
{
    let theme = theme();
    Ok(Input::with_theme(&theme)
        .with_prompt(prompt)
        .default(default.to_string())
        .validate_with(|value: &String| validate(value))
        .interact_text()?)
}

/// Print a styled header
pub fn header(text: &str) {
    println!();
    println!("{}", style(text).bold().cyan());
    println!();
}

/// Print a success message
pub fn success(text: &str) {
    println!("{} {}", style("✓").green().bold(), text);
}

/// Print an error message
pub fn error(text: &str) {
    eprintln!("{} {}", style("✗").red().bold(), text);
}

/// Print an info message
pub fn info(text: &str) {
    println!("{} {}", style("ℹ").blue(), text);
}

/// Print one session log entry, colored by level
pub fn log_entry(entry: &LogEntry) {
    let time = style(entry.timestamp.format("%H:%M:%S").to_string()).dim();
    let level = match entry.level {
        LogLevel::Info => style(entry.level.as_str()).blue(),
        LogLevel::Warning => style(entry.level.as_str()).yellow(),
        LogLevel::Error => style(entry.level.as_str()).red().bold(),
    };
    println!("[{time}] {level:<7} {}", entry.message);
}

/// Print the aggregate result of a begin or end
pub fn report(report: &SessionReport) {
    if report.success() {
        success(&report.summary());
    } else {
        error(&report.summary());
    }
}

/// Print what the next keypress will do
pub fn prompt(state: SessionState) {
    let text = match state {
        SessionState::Idle => "Press Enter to start recording mocap and audio (q + Enter to quit)",
        SessionState::Recording => "Press Enter to stop recording",
        SessionState::Stopping => "Stopping...",
    };
    println!("{}", style(text).bold());
}
