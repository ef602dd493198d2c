//! Desktop notifications through the platform notifier binary.
//!
//! - macOS: `osascript -e 'display notification ...'` (with sound)
//! - elsewhere: `notify-send` (libnotify)
//!
//! The binary runs on its own thread so a slow notification daemon never
//! holds up the next build.

use std::path::PathBuf;

use super::{Notification, Notifier};
use crate::config::NotifyConfig;
use crate::debug;
use crate::utils::exec::{Cmd, SILENT_FILTER};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Backend {
    NotifySend(PathBuf),
    Osascript(PathBuf),
}

pub struct DesktopNotifier {
    backend: Backend,
    sound: Option<String>,
    timeout_ms: u32,
}

impl DesktopNotifier {
    /// Locate the notifier binary. `None` when disabled or not installed.
    pub fn detect(config: &NotifyConfig) -> Option<Self> {
        if !config.desktop {
            return None;
        }
        let backend = if cfg!(target_os = "macos") {
            which::which("osascript").ok().map(Backend::Osascript)
        } else {
            which::which("notify-send").ok().map(Backend::NotifySend)
        };
        let Some(backend) = backend else {
            debug!("notify"; "no desktop notifier found, skipping");
            return None;
        };
        Some(Self {
            backend,
            sound: config.sound.clone(),
            timeout_ms: config.timeout.saturating_mul(1000),
        })
    }

    fn command(&self, n: &Notification) -> Cmd {
        let body = format!("{}\n{} ({})", n.message, n.location(), n.time());
        match &self.backend {
            Backend::NotifySend(bin) => Cmd::new(bin).args([
                "-a".to_string(),
                "sheen".to_string(),
                "-u".to_string(),
                n.severity.urgency().to_string(),
                "-t".to_string(),
                self.timeout_ms.to_string(),
                n.title.clone(),
                body,
            ]),
            Backend::Osascript(bin) => {
                Cmd::new(bin).args(["-e".to_string(), apple_script(n, self.sound.as_deref())])
            }
        }
    }
}

/// `display notification` script for `n`.
fn apple_script(n: &Notification, sound: Option<&str>) -> String {
    let mut script = format!(
        "display notification {} with title {} subtitle {}",
        quote(&n.message),
        quote(&n.title),
        quote(&format!("{} ({})", n.location(), n.time())),
    );
    if let Some(sound) = sound {
        script.push_str(&format!(" sound name {}", quote(sound)));
    }
    script
}

/// AppleScript string literal.
fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

impl Notifier for DesktopNotifier {
    fn notify(&self, n: &Notification) {
        let cmd = self.command(n).filter(&SILENT_FILTER);
        std::thread::spawn(move || {
            if let Err(e) = cmd.run() {
                debug!("notify"; "desktop notification failed: {e:#}");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::BuildError;

    fn notification() -> Notification {
        let err = BuildError::compile("styles/main.scss", Some(4), "expected \";\".");
        Notification::from_error("Styles", &err)
    }

    #[test]
    fn test_disabled_detects_nothing() {
        let config = NotifyConfig {
            desktop: false,
            ..NotifyConfig::default()
        };
        assert!(DesktopNotifier::detect(&config).is_none());
    }

    #[test]
    fn test_apple_script_escapes_quotes() {
        let script = apple_script(&notification(), Some("Frog"));
        assert!(script.starts_with("display notification \"expected \\\";\\\".\""));
        assert!(script.contains("with title \"Styles\""));
        assert!(script.contains("subtitle \"styles/main.scss:4 ("));
        assert!(script.ends_with("sound name \"Frog\""));
    }

    #[test]
    fn test_apple_script_without_sound() {
        let script = apple_script(&notification(), None);
        assert!(!script.contains("sound name"));
    }
}
