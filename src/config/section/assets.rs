//! `[assets]` section configuration.
//!
//! Controls how `resolve()`, `inline()`, `width()`, `height()` and `size()`
//! find files and how resolved URLs are written.
//!
//! # Example
//!
//! ```toml
//! [assets]
//! load_paths = ["images"]   # Searched in order for asset references
//! relative = true           # URLs relative to the output stylesheet
//! base_url = "/"            # Prefix when relative = false
//! cache_buster = true       # Append ?<content hash> to resolved URLs
//! ```

use crate::config::{ConfigDiagnostics, FieldPath, resolve_config_path};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const LOAD_PATHS: FieldPath = FieldPath::new("assets.load_paths");
const BASE_URL: FieldPath = FieldPath::new("assets.base_url");

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    pub load_paths: Vec<PathBuf>,
    pub relative: bool,
    pub base_url: String,
    pub cache_buster: bool,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            load_paths: vec!["images".into()],
            relative: true,
            base_url: "/".into(),
            cache_buster: true,
        }
    }
}

impl AssetsConfig {
    pub fn normalize(&mut self, root: &Path) {
        self.load_paths = self
            .load_paths
            .iter()
            .map(|p| resolve_config_path(p, root))
            .collect();
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        for dir in &self.load_paths {
            if !dir.is_dir() {
                diag.hint(
                    LOAD_PATHS,
                    format!("`{}` does not exist yet", dir.display()),
                );
            }
        }
        if !self.relative && !self.base_url.starts_with('/') && !self.base_url.contains("://") {
            diag.error_with_hint(
                BASE_URL,
                format!("`{}` is neither absolute nor a URL", self.base_url),
                "use \"/\" or a full origin such as \"https://cdn.example.com/\"",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_assets_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.assets.load_paths, vec![PathBuf::from("images")]);
        assert!(config.assets.relative);
        assert!(config.assets.cache_buster);
        assert_eq!(config.assets.base_url, "/");
    }

    #[test]
    fn test_assets_absolute_urls() {
        let config = test_parse_config("[assets]\nrelative = false\nbase_url = \"/static/\"");
        assert!(!config.assets.relative);
        assert_eq!(config.assets.base_url, "/static/");
    }

    #[test]
    fn test_bad_base_url() {
        let assets = AssetsConfig {
            relative: false,
            base_url: "static".into(),
            load_paths: Vec::new(),
            ..AssetsConfig::default()
        };
        let mut diag = ConfigDiagnostics::new();
        assets.validate(&mut diag);
        assert!(diag.has_errors());
    }
}
