//! External command execution.
//!
//! Builder API for running the utility-class generator and the desktop
//! notifier binaries, with output filtering.
//!
//! # Examples
//!
//! ```ignore
//! use crate::utils::exec::Cmd;
//!
//! Cmd::from_slice(&["npx", "tailwindcss"])
//!     .args(["-i", "in.css", "-o", "out.css"])
//!     .cwd(root)
//!     .filter(&TAILWIND_FILTER)
//!     .run()?;
//!
//! Cmd::new("notify-send").args(["sheen", "build failed"]).run()?;
//! ```

use crate::log;
use anyhow::{Context, Result};
use regex::Regex;
use std::{
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
    process::{Command, Output, Stdio},
    sync::OnceLock,
};

// ============================================================================
// Builder API
// ============================================================================

/// Command builder for external process execution.
#[derive(Default)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    filter: Option<&'static FilterRule>,
}

impl Cmd {
    /// Create a new command builder.
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            ..Default::default()
        }
    }

    /// Create from a command array (e.g., `["tailwindcss"]` or `["npx", "tailwindcss"]`).
    pub fn from_slice<S: AsRef<OsStr>>(cmd: &[S]) -> Self {
        let mut iter = cmd.iter();
        let program = iter
            .next()
            .map(|s| s.as_ref().to_owned())
            .unwrap_or_default();
        let args: Vec<_> = iter.map(|s| s.as_ref().to_owned()).collect();
        Self {
            program,
            args,
            ..Default::default()
        }
    }

    /// Add a single argument.
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        let arg = arg.as_ref();
        if !arg.is_empty() {
            self.args.push(arg.to_owned());
        }
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            let arg = arg.as_ref();
            if !arg.is_empty() {
                self.args.push(arg.to_owned());
            }
        }
        self
    }

    /// Set working directory.
    pub fn cwd<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.cwd = Some(dir.as_ref().to_owned());
        self
    }

    /// Set output filter for logging.
    pub fn filter(mut self, filter: &'static FilterRule) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Execute the command and return output.
    ///
    /// A non-zero exit status is an error carrying the filtered stderr.
    pub fn run(self) -> Result<Output> {
        let filter = self.filter.unwrap_or(&EMPTY_FILTER);
        let name = self.program.to_string_lossy().to_string();

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }

        let output = cmd
            .stdin(Stdio::null())
            .spawn()
            .with_context(|| format!("Failed to execute `{name}`"))?
            .wait_with_output()
            .with_context(|| format!("Failed to wait for `{name}`"))?;

        if !output.status.success() {
            anyhow::bail!(format_error(&name, &output, filter));
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        filter.log(&name, stderr.trim());
        Ok(output)
    }
}

// ============================================================================
// Output Filtering
// ============================================================================

/// Filter rule for command output logging.
///
/// Used to reduce noise by skipping known banner or progress lines.
pub struct FilterRule {
    /// Prefixes to skip when logging output.
    pub skip_prefixes: &'static [&'static str],
}

impl FilterRule {
    pub const fn new(skip_prefixes: &'static [&'static str]) -> Self {
        Self { skip_prefixes }
    }

    fn should_skip(&self, line: &str) -> bool {
        line.is_empty() || self.skip_prefixes.iter().any(|p| line.starts_with(p))
    }

    /// Log output lines that pass the filter.
    pub fn log(&self, name: &str, output: &str) {
        let lines: Vec<_> = output
            .lines()
            .filter(|line| {
                let plain = strip_ansi(line);
                let trimmed = plain.trim();
                !trimmed.is_empty() && !self.should_skip(trimmed)
            })
            .collect();

        if !lines.is_empty() {
            log!(name; "{}", lines.join("\n"));
        }
    }
}

/// Empty filter (no skipping).
pub const EMPTY_FILTER: FilterRule = FilterRule::new(&[]);

/// Silent filter (skip all output).
pub const SILENT_FILTER: FilterRule = FilterRule::new(&[""]);

// ============================================================================
// Helpers
// ============================================================================

/// Strip ANSI escape codes from string.
pub fn strip_ansi(s: &str) -> std::borrow::Cow<'_, str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*m").expect("valid ansi regex"));
    re.replace_all(s, "")
}

/// Format error message for failed command.
fn format_error(name: &str, output: &Output, filter: &'static FilterRule) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);

    let stderr = strip_ansi(stderr.trim()).into_owned();
    let error_msg = filter
        .skip_prefixes
        .iter()
        .filter(|p| !p.is_empty())
        .fold(stderr.as_str(), |s, p| s.trim_start_matches(p).trim_start());

    let mut msg = format!("Command `{name}` failed with {}\n", output.status);
    if !error_msg.is_empty() {
        msg.push_str(error_msg);
    }

    let stdout_trimmed = stdout.trim();
    if !stdout_trimmed.is_empty() {
        msg.push_str("\nStdout:\n");
        msg.push_str(stdout_trimmed);
    }
    msg
}

// ============================================================================
// Tests
// ============================================================================
