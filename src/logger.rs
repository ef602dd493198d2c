//! Logging utilities with colored output and a watch-mode status block.
//!
//! This module provides:
//! - `log!` macro for formatted terminal output with colored prefixes
//! - `debug!` macro for output only shown with `--verbose`
//! - `WatchStatus` for watch mode status messages that overwrite each other
//!
//! # Example
//!
//! ```ignore
//! log!("size"; "main.css 12.1 kB (gzipped 3.2 kB)");
//! status_error("failed: styles/main.scss", "expected \";\"");
//! ```

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::{
    io::{Write, stdout},
    sync::LazyLock,
    sync::atomic::{AtomicBool, Ordering},
};

/// Global verbose flag (set by --verbose CLI argument)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when --verbose is enabled)
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix
#[inline]
pub fn log(module: &str, message: &str) {
    let module_lower = module.to_ascii_lowercase();
    let prefix = colorize_prefix(module, &module_lower);

    let mut stdout = stdout().lock();
    execute!(stdout, Clear(ClearType::UntilNewLine)).ok();
    writeln!(stdout, "{prefix} {message}").ok();
    stdout.flush().ok();
}

/// Apply color to a module prefix based on module type
#[inline]
fn colorize_prefix(module: &str, module_lower: &str) -> String {
    let prefix = format!("[{module}]");
    match module_lower {
        "proxy" | "serve" => prefix.bright_blue().bold().to_string(),
        "watch" => prefix.bright_green().bold().to_string(),
        "error" => prefix.bright_red().bold().to_string(),
        "size" | "minify" => prefix.bright_magenta().bold().to_string(),
        _ => prefix.bright_yellow().bold().to_string(),
    }
}

/// Current local time formatted as HH:MM:SS
pub fn now() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

// ============================================================================
// Watch Status (single-block status with overwrite)
// ============================================================================

/// Status display for watch mode
///
/// Each message overwrites the previous block so a long watch session keeps
/// one current status instead of a scroll of stale errors.
pub struct WatchStatus {
    /// Lines of previous output to clear
    last_lines: usize,
}

static WATCH_STATUS: LazyLock<Mutex<WatchStatus>> =
    LazyLock::new(|| Mutex::new(WatchStatus::new()));

impl WatchStatus {
    pub const fn new() -> Self {
        Self { last_lines: 0 }
    }

    /// Display success message (✓ prefix, green).
    pub fn success(&mut self, message: &str) {
        self.display(format!("{}", "✓".green()), message);
    }

    /// Display error message (✗ prefix, red) with optional detail.
    pub fn error(&mut self, summary: &str, detail: &str) {
        let message = if detail.is_empty() {
            summary.to_string()
        } else {
            format!("{summary}\n{detail}")
        };
        self.display(format!("{}", "✗".red()), &message);
    }

    fn display(&mut self, symbol: String, message: &str) {
        let mut stdout = stdout().lock();

        if self.last_lines > 0 {
            #[allow(clippy::cast_possible_truncation)]
            let lines = self.last_lines as u16;
            execute!(stdout, cursor::MoveUp(lines)).ok();
            execute!(stdout, Clear(ClearType::FromCursorDown)).ok();
        }

        let timestamp = format!("[{}]", now()).dimmed().to_string();
        writeln!(stdout, "{timestamp} {symbol} {message}").ok();
        stdout.flush().ok();

        self.last_lines = line_count(message);
    }
}

/// Number of terminal lines a status message occupies.
fn line_count(message: &str) -> usize {
    message.matches('\n').count() + 1
}

/// Global watch status: success
pub fn status_success(message: &str) {
    WATCH_STATUS.lock().success(message);
}

/// Global watch status: error
pub fn status_error(summary: &str, detail: &str) {
    WATCH_STATUS.lock().error(summary, detail);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_status_new() {
        let status = WatchStatus::new();
        assert_eq!(status.last_lines, 0);
    }

    #[test]
    fn test_line_count_single() {
        assert_eq!(line_count("rebuilt: styles/main.scss"), 1);
    }

    #[test]
    fn test_line_count_error_with_detail() {
        let message = "failed: styles/main.scss\nexpected \";\"\n  line 4";
        assert_eq!(line_count(message), 3);
    }

    #[test]
    fn test_now_format() {
        let stamp = now();
        assert_eq!(stamp.len(), 8);
        assert_eq!(stamp.matches(':').count(), 2);
    }

    #[test]
    fn test_verbose_toggle() {
        set_verbose(true);
        assert!(is_verbose());
        set_verbose(false);
        assert!(!is_verbose());
    }
}
