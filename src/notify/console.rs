//! Terminal output for build errors.

use super::{Notification, Notifier};
use crate::log;
use crate::logger::status_error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleStyle {
    /// Plain log lines; one-shot builds.
    Log,
    /// Overwriting status block; watch mode.
    Status,
}

pub struct ConsoleNotifier {
    style: ConsoleStyle,
}

impl ConsoleNotifier {
    pub fn new(style: ConsoleStyle) -> Self {
        Self { style }
    }
}

/// Structured lines: separator, location, message and asset when present.
fn log_lines(n: &Notification) -> Vec<String> {
    let mut lines = vec![
        "--------------".to_string(),
        format!("file: {}", n.location()),
        format!("message: {}", n.message),
    ];
    if let Some(asset) = &n.asset {
        lines.push(format!("asset: {asset}"));
    }
    lines.push(format!("stage: {}", n.kind));
    lines
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, n: &Notification) {
        match self.style {
            ConsoleStyle::Log => {
                for line in log_lines(n) {
                    log!("error"; "{line}");
                }
            }
            ConsoleStyle::Status => {
                let mut detail = n.message.clone();
                if let Some(asset) = &n.asset {
                    detail.push_str(&format!("\nasset: {asset}"));
                }
                status_error(&format!("{} error: {}", n.kind, n.location()), &detail);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::BuildError;

    #[test]
    fn test_log_lines_for_asset_error() {
        let err = BuildError::asset("styles/main.scss", Some(12), "hero.jpg", "file not found");
        let lines = log_lines(&Notification::from_error("Styles", &err));
        assert_eq!(
            lines,
            [
                "--------------",
                "file: styles/main.scss:12",
                "message: file not found",
                "asset: hero.jpg",
                "stage: asset",
            ]
        );
    }

    #[test]
    fn test_log_lines_without_line() {
        let err = BuildError::tool("utilities", "styles/main.scss", None, "exit status 1");
        let lines = log_lines(&Notification::from_error("Styles", &err));
        assert_eq!(lines[1], "file: styles/main.scss");
        assert_eq!(lines.len(), 4);
    }
}
