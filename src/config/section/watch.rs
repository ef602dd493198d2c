//! `[watch]` section configuration.
//!
//! Glob patterns (relative to the project root) for the three change
//! categories of the watch task.
//!
//! # Example
//!
//! ```toml
//! [watch]
//! images = ["images/**/*"]
//! styles = ["styles/**/*.scss", "styles/**/*.css"]
//! content = ["public/**/*.html", "public/**/*.php"]
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub images: Vec<String>,
    pub styles: Vec<String>,
    pub content: Vec<String>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            images: vec!["images/**/*".into()],
            styles: vec![
                "styles/**/*.scss".into(),
                "styles/**/*.sass".into(),
                "styles/**/*.css".into(),
            ],
            content: vec!["public/**/*.html".into(), "public/**/*.php".into()],
        }
    }
}

impl WatchConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        let groups = [
            ("watch.images", &self.images),
            ("watch.styles", &self.styles),
            ("watch.content", &self.content),
        ];
        for (field, patterns) in groups {
            for pattern in patterns {
                if let Err(e) = glob::Pattern::new(pattern) {
                    diag.error(FieldPath::new(field), format!("`{pattern}`: {}", e.msg));
                }
            }
        }
    }

    /// Literal directory prefix of a pattern (`styles/**/*.scss` -> `styles`).
    ///
    /// The watcher only needs to subscribe to these roots.
    pub fn static_prefix(pattern: &str) -> &str {
        let cut = pattern
            .find(['*', '?', '[', '{'])
            .unwrap_or(pattern.len());
        let prefix = &pattern[..cut];
        match prefix.rfind('/') {
            Some(idx) => &prefix[..idx],
            None if cut == pattern.len() => prefix,
            None => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_watch_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.watch.images, vec!["images/**/*".to_string()]);
        assert!(config.watch.content.contains(&"public/**/*.php".to_string()));
    }

    #[test]
    fn test_invalid_glob_reported() {
        let watch = WatchConfig {
            styles: vec!["styles/[*.scss".into()],
            ..WatchConfig::default()
        };
        let mut diag = ConfigDiagnostics::new();
        watch.validate(&mut diag);
        assert_eq!(diag.errors().len(), 1);
    }

    #[test]
    fn test_static_prefix() {
        assert_eq!(WatchConfig::static_prefix("styles/**/*.scss"), "styles");
        assert_eq!(WatchConfig::static_prefix("public/pages/*.html"), "public/pages");
        assert_eq!(WatchConfig::static_prefix("*.html"), "");
        assert_eq!(WatchConfig::static_prefix("index.php"), "index.php");
    }
}
