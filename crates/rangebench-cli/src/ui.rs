//! UI helpers for CLI display.

use console::style;

/// Check if color output is disabled via `NO_COLOR` env var.
#[must_use]
pub fn is_color_disabled() -> bool {
    std::env::var_os("NO_COLOR").is_some()
}

fn header_line(text: &str, plain: bool) -> String {
    let line = format!("=== {text} ===");
    if plain {
        line
    } else {
        style(line).bold().cyan().to_string()
    }
}

fn warning_line(text: &str, plain: bool) -> String {
    if plain {
        format!("[WARN] {text}")
    } else {
        format!("{} {text}", style("[WARN]").yellow().bold())
    }
}

fn error_line(text: &str, plain: bool) -> String {
    if plain {
        format!("[ERROR] {text}")
    } else {
        format!("{} {text}", style("[ERROR]").red().bold())
    }
}

/// Print a styled header.
pub fn print_header(text: &str) {
    println!("{}", header_line(text, is_color_disabled()));
}

/// Print a warning message to stderr.
pub fn print_warning(text: &str) {
    eprintln!("{}", warning_line(text, is_color_disabled()));
}

/// Print an error message to stderr.
pub fn print_error(text: &str) {
    eprintln!("{}", error_line(text, is_color_disabled()));
}
