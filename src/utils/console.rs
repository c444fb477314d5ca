// src/utils/console.rs

//! Console presentation helpers with server-style formatting.
//!
//! Output is gated on the `log` facade's max level, so `--verbose` and
//! `RUST_LOG` control it the same way they control regular log lines.

use chrono::Local;
use log::LevelFilter;

/// Check if informational console output should be displayed
fn enabled() -> bool {
    log::max_level() >= LevelFilter::Info
}

/// Format a console line with timestamp
fn format_line(message: &str) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    format!("[{}] {}", timestamp, message)
}

/// Print a header
pub fn header(title: &str) {
    if enabled() {
        let border = "═".repeat(60);
        println!("{}", format_line(&border));
        println!("{}", format_line(&format!("  {}", title)));
        println!("{}", format_line(&border));
    }
}

/// Print a step in a process
pub fn step(step_num: usize, total: usize, message: &str) {
    if enabled() {
        println!(
            "{}",
            format_line(&format!("[STEP {}/{}] {}", step_num, total, message))
        );
    }
}

/// Print a sub-item (indented)
pub fn sub_item(message: &str) {
    if enabled() {
        println!("{}", format_line(&format!("    {}", message)));
    }
}

/// Print a summary section
pub fn summary(title: &str, items: &[(&str, String)]) {
    if enabled() {
        println!();
        println!("{}", format_line(&format!("[SUMMARY] {}", title)));
        for (key, value) in items {
            println!("{}", format_line(&format!("    {}: {}", key, value)));
        }
    }
}

/// Percentage of `part` in `whole` with one decimal, 0 when `whole` is 0.
pub fn percent(part: usize, whole: usize) -> String {
    if whole == 0 {
        return "0.0%".into();
    }
    format!("{:.1}%", part as f64 / whole as f64 * 100.0)
}
