//! Project configuration from `sheen.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # One module per TOML section
//! ├── types/         # ConfigError, ConfigDiagnostics, FieldPath
//! ├── util.rs        # find_config_file, resolve_config_path
//! └── mod.rs         # SiteConfig (this file)
//! ```
//!
//! The configuration is loaded once at startup, normalized to absolute paths
//! and validated, then shared read-only as `Arc<SiteConfig>`.

pub mod section;
pub mod types;
mod util;

pub use section::{
    AssetsConfig, NotifyConfig, ServeConfig, SourceMapMode, StylesConfig, TargetsConfig,
    UtilitiesConfig, WatchConfig,
};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};
pub use util::resolve_config_path;

use crate::{cli::Cli, log};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use util::find_config_file;

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing sheen.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Absolute path to the config file (may not exist)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file, or cwd without one
    #[serde(skip)]
    pub root: PathBuf,

    pub styles: StylesConfig,
    pub assets: AssetsConfig,
    pub targets: TargetsConfig,
    pub utilities: UtilitiesConfig,
    pub watch: WatchConfig,
    pub serve: ServeConfig,
    pub notify: NotifyConfig,
}

impl SiteConfig {
    /// Load configuration for the CLI invocation.
    ///
    /// Searches upward from cwd for the config file. Without one, defaults
    /// apply and the project root is the current directory.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let (mut config, config_path) = match find_config_file(&cli.config) {
            Some(path) => (Self::from_path(&path)?, path),
            None => {
                log!("config"; "no {} found, using defaults", cli.config.display());
                (Self::default(), cwd.join(&cli.config))
            }
        };

        let root = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or(cwd);
        config.config_path = config_path;
        config.finalize(&root);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {} are ignored: {}", display_path, fields.join(", "));
    }

    /// Anchor every configured path at `root`.
    pub fn finalize(&mut self, root: &Path) {
        let root = crate::utils::path::normalize_path(root);
        self.styles.normalize(&root);
        self.assets.normalize(&root);
        self.root = root;
    }

    /// Validate every section, reporting all problems at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.styles.validate(&mut diag);
        self.assets.validate(&mut diag);
        self.targets.validate(&mut diag);
        self.utilities.validate(&mut diag);
        self.watch.validate(&mut diag);
        self.serve.validate(&mut diag);

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }

    /// Get path relative to the project root (for display)
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config text. Panics on unknown fields to catch typos in tests.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> SiteConfig {
    let (parsed, ignored) = SiteConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

/// Parse config text and anchor its paths at `root`.
#[cfg(test)]
pub fn test_config_at(root: &Path, extra: &str) -> SiteConfig {
    let mut config = test_parse_config(extra);
    config.config_path = root.join("sheen.toml");
    config.finalize(root);
    config
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_invalid_toml() {
        assert!(SiteConfig::parse_with_ignored("[styles\nentries = []").is_err());
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[styles]\noutput = \"dist\"\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = SiteConfig::parse_with_ignored(content).unwrap();

        assert_eq!(config.styles.output, PathBuf::from("dist"));
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_finalize_anchors_paths() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config_at(dir.path(), "");
        let root = crate::utils::path::normalize_path(dir.path());

        assert_eq!(config.root, root);
        assert_eq!(config.styles.output, root.join("public/css"));
        assert_eq!(config.styles.entries, vec![root.join("styles/main.scss")]);
        assert_eq!(config.assets.load_paths, vec![root.join("images")]);
    }

    #[test]
    fn test_validate_reports_missing_entry() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config_at(dir.path(), "");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("styles.entries"));
    }

    #[test]
    fn test_validate_ok_with_entry() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("styles")).unwrap();
        std::fs::write(dir.path().join("styles/main.scss"), "a { b: c }").unwrap();
        let config = test_config_at(dir.path(), "");
        config.validate().unwrap();
    }

    #[test]
    fn test_root_relative() {
        let mut config = SiteConfig::default();
        config.root = PathBuf::from("/site");
        assert_eq!(
            config.root_relative("/site/styles/main.scss"),
            PathBuf::from("styles/main.scss")
        );
    }
}
