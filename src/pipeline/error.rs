//! Build errors raised by pipeline stages.
//!
//! Three kinds, matching where the failure originates:
//! - `Compile`: the pre-processor rejected the source
//! - `Asset`: an asset referenced from the stylesheet is missing or unreadable
//! - `Tool`: any later stage (import inlining, lightningcss, utilities, write)

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum BuildError {
    #[error("compile error in {}{}: {message}", file.display(), line_suffix(*line))]
    Compile {
        file: PathBuf,
        line: Option<u32>,
        message: String,
    },

    #[error("asset error in {}{}: {message}", file.display(), line_suffix(*line))]
    Asset {
        file: PathBuf,
        line: Option<u32>,
        asset: String,
        message: String,
    },

    #[error("{stage} error in {}{}: {message}", file.display(), line_suffix(*line))]
    Tool {
        stage: &'static str,
        file: PathBuf,
        line: Option<u32>,
        message: String,
    },
}

impl BuildError {
    pub fn compile(file: impl Into<PathBuf>, line: Option<u32>, message: impl Into<String>) -> Self {
        Self::Compile {
            file: file.into(),
            line,
            message: message.into(),
        }
    }

    pub fn asset(
        file: impl Into<PathBuf>,
        line: Option<u32>,
        asset: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Asset {
            file: file.into(),
            line,
            asset: asset.into(),
            message: message.into(),
        }
    }

    pub fn tool(
        stage: &'static str,
        file: impl Into<PathBuf>,
        line: Option<u32>,
        message: impl Into<String>,
    ) -> Self {
        Self::Tool {
            stage,
            file: file.into(),
            line,
            message: message.into(),
        }
    }

    /// File the error points at.
    pub fn file(&self) -> &Path {
        match self {
            Self::Compile { file, .. } | Self::Asset { file, .. } | Self::Tool { file, .. } => file,
        }
    }

    /// 1-based line number, when the failing tool reported one.
    pub fn line(&self) -> Option<u32> {
        match self {
            Self::Compile { line, .. } | Self::Asset { line, .. } | Self::Tool { line, .. } => {
                *line
            }
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Compile { message, .. }
            | Self::Asset { message, .. }
            | Self::Tool { message, .. } => message,
        }
    }

    /// Asset reference that could not be resolved.
    pub fn asset_ref(&self) -> Option<&str> {
        match self {
            Self::Asset { asset, .. } => Some(asset),
            _ => None,
        }
    }

    /// Short label of the failing stage: `compile`, `asset` or the tool stage name.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Compile { .. } => "compile",
            Self::Asset { .. } => "asset",
            Self::Tool { stage, .. } => stage,
        }
    }

    /// `file:line` (or just `file`) for logs and notifications.
    pub fn location(&self) -> String {
        match self.line() {
            Some(line) => format!("{}:{line}", self.file().display()),
            None => self.file().display().to_string(),
        }
    }

    /// Same error with the file path shown relative to `root`.
    pub fn relative_to(mut self, root: &Path) -> Self {
        let file = match &mut self {
            Self::Compile { file, .. } | Self::Asset { file, .. } | Self::Tool { file, .. } => file,
        };
        if let Ok(rel) = file.strip_prefix(root) {
            *file = rel.to_path_buf();
        }
        self
    }
}

/// `:<line>` when a line is known.
fn line_suffix(line: Option<u32>) -> String {
    line.map(|l| format!(":{l}")).unwrap_or_default()
}
