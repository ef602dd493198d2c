//! Changed-file categories and the browser reaction each one triggers.
//!
//! | Category | Reaction |
//! |----------|----------|
//! | Styles   | rebuild, push the stylesheet |
//! | Images   | rebuild, push the stylesheet |
//! | Content  | rebuild, full page reload |
//!
//! A batch with several categories reacts once, with the strongest one.

use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};

use crate::config::{SiteConfig, WatchConfig};

/// Ordered by strength: `Content` beats `Images` beats `Styles`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Styles,
    Images,
    Content,
}

impl Category {
    pub fn reaction(self) -> Reaction {
        match self {
            Self::Styles | Self::Images => Reaction::Css,
            Self::Content => Reaction::Reload,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Styles => "styles",
            Self::Images => "images",
            Self::Content => "content",
        }
    }
}

/// What connected browsers are told after the rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    /// Swap the rebuilt stylesheets in place.
    Css,
    /// Reload the page.
    Reload,
}

const MATCH: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Maps changed paths to categories using the `[watch]` globs.
#[derive(Debug, Clone)]
pub struct Classifier {
    root: PathBuf,
    output_dir: PathBuf,
    styles: Vec<Pattern>,
    images: Vec<Pattern>,
    content: Vec<Pattern>,
}

impl Classifier {
    pub fn new(config: &SiteConfig) -> Self {
        // Patterns were validated with the config; skip any that slipped through.
        let compile = |patterns: &[String]| -> Vec<Pattern> {
            patterns.iter().filter_map(|p| Pattern::new(p).ok()).collect()
        };
        Self {
            root: config.root.clone(),
            output_dir: config.styles.output.clone(),
            styles: compile(&config.watch.styles),
            images: compile(&config.watch.images),
            content: compile(&config.watch.content),
        }
    }

    /// Category of `path`, `None` when no pattern matches or the file is
    /// build output.
    pub fn classify(&self, path: &Path) -> Option<Category> {
        if path.starts_with(&self.output_dir) {
            return None;
        }
        let rel = path.strip_prefix(&self.root).ok()?;
        let matches = |patterns: &[Pattern]| {
            patterns.iter().any(|p| p.matches_path_with(rel, MATCH))
        };

        if matches(&self.content) {
            Some(Category::Content)
        } else if matches(&self.images) {
            Some(Category::Images)
        } else if matches(&self.styles) {
            Some(Category::Styles)
        } else {
            None
        }
    }

    /// Directories to subscribe to, deduplicated, parents before children.
    pub fn watch_roots(config: &SiteConfig) -> Vec<PathBuf> {
        let watch = &config.watch;
        let mut roots: Vec<PathBuf> = watch
            .styles
            .iter()
            .chain(&watch.images)
            .chain(&watch.content)
            .map(|p| config.root.join(WatchConfig::static_prefix(p)))
            .collect();
        roots.sort();
        roots.dedup();

        let mut kept: Vec<PathBuf> = Vec::new();
        for root in roots {
            if !kept.iter().any(|k| root.starts_with(k)) {
                kept.push(root);
            }
        }
        kept
    }
}

/// Classified paths of one debounced batch.
#[derive(Debug, Clone, Default)]
pub struct ChangeBatch {
    pub changes: Vec<(PathBuf, Category)>,
}

impl ChangeBatch {
    pub fn classify(classifier: &Classifier, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        let changes = paths
            .into_iter()
            .filter_map(|p| classifier.classify(&p).map(|c| (p, c)))
            .collect();
        Self { changes }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn strongest(&self) -> Option<Category> {
        self.changes.iter().map(|(_, c)| *c).max()
    }

    /// Short description for logs and reload reasons, e.g. `styles/main.scss`
    /// or `styles/a.scss (+2 more)`.
    pub fn describe(&self, root: &Path) -> String {
        let Some((first, _)) = self.changes.first() else {
            return String::new();
        };
        let name = first.strip_prefix(root).unwrap_or(first).display().to_string();
        match self.changes.len() {
            1 => name,
            n => format!("{name} (+{} more)", n - 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config_at;

    fn classifier() -> (Classifier, PathBuf) {
        let root = PathBuf::from("/site");
        (Classifier::new(&test_config_at(&root, "")), root)
    }

    #[test]
    fn test_classify_defaults() {
        let (c, root) = classifier();
        assert_eq!(c.classify(&root.join("styles/main.scss")), Some(Category::Styles));
        assert_eq!(c.classify(&root.join("styles/parts/_grid.scss")), Some(Category::Styles));
        assert_eq!(c.classify(&root.join("images/icons/logo.svg")), Some(Category::Images));
        assert_eq!(c.classify(&root.join("public/index.php")), Some(Category::Content));
        assert_eq!(c.classify(&root.join("README.md")), None);
        assert_eq!(c.classify(Path::new("/elsewhere/styles/main.scss")), None);
    }

    #[test]
    fn test_output_dir_ignored() {
        let root = PathBuf::from("/site");
        let config = test_config_at(&root, "[watch]\nstyles = [\"public/**/*.css\"]");
        let c = Classifier::new(&config);
        assert_eq!(c.classify(&root.join("public/css/main.css")), None);
    }

    #[test]
    fn test_content_wins_batch() {
        let (c, root) = classifier();
        let batch = ChangeBatch::classify(
            &c,
            [
                root.join("styles/main.scss"),
                root.join("public/index.html"),
                root.join("images/a.png"),
            ],
        );
        assert_eq!(batch.strongest(), Some(Category::Content));
        assert_eq!(batch.strongest().map(Category::reaction), Some(Reaction::Reload));
        assert_eq!(batch.describe(&root), "styles/main.scss (+2 more)");
    }

    #[test]
    fn test_styles_and_images_push_css() {
        let (c, root) = classifier();
        let batch = ChangeBatch::classify(&c, [root.join("styles/main.scss"), root.join("images/a.png")]);
        assert_eq!(batch.strongest(), Some(Category::Images));
        assert_eq!(batch.strongest().map(Category::reaction), Some(Reaction::Css));
    }

    #[test]
    fn test_unmatched_batch_is_empty() {
        let (c, root) = classifier();
        let batch = ChangeBatch::classify(&c, [root.join("notes.txt")]);
        assert!(batch.is_empty());
        assert_eq!(batch.strongest().map(Category::reaction), None);
    }

    #[test]
    fn test_watch_roots_dedup_nested() {
        let root = PathBuf::from("/site");
        let config = test_config_at(
            &root,
            "[watch]\nstyles = [\"styles/**/*.scss\", \"styles/vendor/*.css\"]\nimages = [\"images/**/*\"]\ncontent = [\"public/**/*.html\"]",
        );
        assert_eq!(
            Classifier::watch_roots(&config),
            [root.join("images"), root.join("public"), root.join("styles")]
        );
    }
}
