//! `[styles]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [styles]
//! entries = ["styles/main.scss"]   # Compiled one output file per entry
//! output = "public/css"            # Output directory
//! load_paths = ["node_modules"]    # Extra @use/@import lookup directories
//! source_map = "file"              # "file" | "inline" | "none"
//! ```

use crate::config::{ConfigDiagnostics, FieldPath, resolve_config_path};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const ENTRIES: FieldPath = FieldPath::new("styles.entries");
const LOAD_PATHS: FieldPath = FieldPath::new("styles.load_paths");

/// Where the source map of each output stylesheet goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceMapMode {
    /// Adjacent `<name>.css.map` file.
    #[default]
    File,
    /// Base64 data URI in the trailing comment.
    Inline,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StylesConfig {
    /// Entry stylesheets (SCSS, Sass or plain CSS).
    pub entries: Vec<PathBuf>,
    /// Output directory for compiled stylesheets.
    pub output: PathBuf,
    /// Additional pre-processor load paths.
    pub load_paths: Vec<PathBuf>,
    pub source_map: SourceMapMode,
}

impl Default for StylesConfig {
    fn default() -> Self {
        Self {
            entries: vec!["styles/main.scss".into()],
            output: "public/css".into(),
            load_paths: Vec::new(),
            source_map: SourceMapMode::File,
        }
    }
}

impl StylesConfig {
    pub fn normalize(&mut self, root: &Path) {
        let join = |p: &PathBuf| resolve_config_path(p, root);
        self.entries = self.entries.iter().map(join).collect();
        self.load_paths = self.load_paths.iter().map(join).collect();
        self.output = join(&self.output);
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.entries.is_empty() {
            diag.error(ENTRIES, "no entry stylesheet configured");
        }
        for entry in &self.entries {
            if !entry.is_file() {
                diag.error_with_hint(
                    ENTRIES,
                    format!("`{}` does not exist", entry.display()),
                    "paths are relative to the directory containing sheen.toml",
                );
            }
        }
        for dir in &self.load_paths {
            if !dir.is_dir() {
                diag.error(LOAD_PATHS, format!("`{}` is not a directory", dir.display()));
            }
        }
    }

    /// Output path for an entry: `<output>/<entry stem>.css`.
    pub fn output_for(&self, entry: &Path) -> PathBuf {
        let stem = entry
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "style".to_string());
        self.output.join(format!("{stem}.css"))
    }
}
