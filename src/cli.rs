//! Shared CLI output helpers for genic binaries.

use std::time::{Duration, Instant};

use colored::Colorize;

/// How many individual warnings to print before collapsing the rest into a count.
pub const MAX_LISTED_WARNINGS: usize = 5;

pub fn banner(subtitle: &str) {
    eprintln!();
    eprintln!("{} {}", "genic".bold().cyan(), subtitle.dimmed());
    eprintln!();
}

pub fn section(title: &str) {
    let bar = "─".repeat(50);
    eprintln!("{} {}", title.bold().blue(), bar.dimmed());
}

pub fn kv(key: &str, value: &str) {
    eprintln!("  {:<20} {}", key.dimmed(), value);
}

pub fn success(msg: &str) {
    eprintln!("  {} {}", "✓".green().bold(), msg);
}

pub fn warning(msg: &str) {
    eprintln!("  {} {}", "⚠".yellow(), msg.yellow());
}

/// Print the first few items as warnings, then a single line with the remainder.
pub fn warn_each<T: std::fmt::Display>(items: &[T], what: &str) {
    for item in items.iter().take(MAX_LISTED_WARNINGS) {
        warning(&item.to_string());
    }
    if items.len() > MAX_LISTED_WARNINGS {
        warning(&format!(
            "... and {} more {what}",
            items.len() - MAX_LISTED_WARNINGS
        ));
    }
}

pub fn print_summary(start: Instant) {
    eprintln!();
    eprintln!("{}  {}", "Time".dimmed(), format_elapsed(start.elapsed()).bold());
    eprintln!();
}

/// Formats a duration as `HH:MM:SS.t`.
#[must_use]
pub fn format_elapsed(d: Duration) -> String {
    let total_secs = d.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let tenths = d.subsec_millis() / 100;
    format!("{hours:02}:{minutes:02}:{seconds:02}.{tenths}")
}
