//! Error notification side channel.
//!
//! A failing build produces exactly one [`Notification`], fanned out by the
//! [`Reporter`] to every registered [`Notifier`]:
//!
//! ```text
//! BuildError ──> Reporter ──┬──> ConsoleNotifier  (log lines / status block)
//!                           ├──> DesktopNotifier  (notify-send / osascript)
//!                           └──> BrowserNotifier  (overlay, watch mode only)
//! ```
//!
//! When the next build succeeds, [`Reporter::recovered`] clears whatever the
//! sinks are still showing.

mod console;
mod desktop;

pub use console::{ConsoleNotifier, ConsoleStyle};
pub use desktop::DesktopNotifier;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Local};

use crate::config::SiteConfig;
use crate::pipeline::BuildError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
}

impl Severity {
    /// Urgency understood by `notify-send`.
    pub fn urgency(self) -> &'static str {
        match self {
            Self::Error => "critical",
        }
    }
}

/// One user-facing report of a failed build.
#[derive(Debug, Clone)]
pub struct Notification {
    pub title: String,
    pub message: String,
    /// Failing file, relative to the project root when inside it.
    pub file: PathBuf,
    pub line: Option<u32>,
    /// `compile`, `asset` or the failing stage name.
    pub kind: &'static str,
    /// Unresolved asset reference, for asset errors.
    pub asset: Option<String>,
    pub severity: Severity,
    pub timestamp: DateTime<Local>,
}

impl Notification {
    pub fn from_error(title: &str, err: &BuildError) -> Self {
        Self {
            title: title.to_string(),
            message: err.message().to_string(),
            file: err.file().to_path_buf(),
            line: err.line(),
            kind: err.kind(),
            asset: err.asset_ref().map(str::to_string),
            severity: Severity::Error,
            timestamp: Local::now(),
        }
    }

    /// `file:line`, or just `file`.
    pub fn location(&self) -> String {
        match self.line {
            Some(line) => format!("{}:{line}", self.file.display()),
            None => self.file.display().to_string(),
        }
    }

    pub fn time(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }
}

/// A destination for notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification);

    /// The build that failed has recovered.
    fn clear(&self) {}
}

/// Fans a build error out to every sink, once.
pub struct Reporter {
    root: PathBuf,
    title: String,
    sinks: Vec<Arc<dyn Notifier>>,
    /// A failure was reported and not yet cleared.
    failing: AtomicBool,
}

impl Reporter {
    pub fn new(root: impl Into<PathBuf>, title: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            title: title.into(),
            sinks: Vec::new(),
            failing: AtomicBool::new(false),
        }
    }

    /// Console output in `style`, plus desktop notifications when enabled
    /// and a notifier binary is available.
    pub fn standard(config: &SiteConfig, style: ConsoleStyle) -> Self {
        let mut reporter = Self::new(&config.root, &config.notify.title)
            .with(Arc::new(ConsoleNotifier::new(style)));
        if let Some(desktop) = DesktopNotifier::detect(&config.notify) {
            reporter = reporter.with(Arc::new(desktop));
        }
        reporter
    }

    pub fn with(mut self, sink: Arc<dyn Notifier>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Report a failed entry.
    pub fn error(&self, err: &BuildError) {
        let err = err.clone().relative_to(&self.root);
        let notification = Notification::from_error(&self.title, &err);
        for sink in &self.sinks {
            sink.notify(&notification);
        }
        self.failing.store(true, Ordering::SeqCst);
    }

    /// Report a fully successful build. Sinks are cleared only after a failure.
    pub fn recovered(&self) {
        if self.failing.swap(false, Ordering::SeqCst) {
            for sink in &self.sinks {
                sink.clear();
            }
        }
    }

    #[cfg(test)]
    pub fn is_failing(&self) -> bool {
        self.failing.load(Ordering::SeqCst)
    }
}

/// Sink that keeps every notification, for assertions.
#[cfg(test)]
#[derive(Default)]
pub struct Recorder {
    pub seen: parking_lot::Mutex<Vec<Notification>>,
    pub cleared: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl Notifier for Recorder {
    fn notify(&self, notification: &Notification) {
        self.seen.lock().push(notification.clone());
    }

    fn clear(&self) {
        self.cleared.fetch_add(1, Ordering::SeqCst);
    }
}
