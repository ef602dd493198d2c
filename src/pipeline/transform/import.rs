//! Inline local plain-CSS `@import` rules.
//!
//! grass leaves `@import "x.css"` and `@import url(...)` untouched. This stage
//! replaces each local one with the imported file's content, recursively.
//!
//! - Paths resolve against the importing file's directory, then the styles
//!   load paths. A missing `.css` extension is tried as well.
//! - Media-qualified imports are wrapped in `@media <query> { ... }`.
//! - Remote imports (`http:`, `https:`, `//`) stay, hoisted to the top.
//! - A file is inlined at most once per entry.
//! - Imports inside comments and strings are left alone.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::{Captures, Regex};
use rustc_hash::FxHashSet;

use super::{Inert, line_at};
use crate::config::StylesConfig;
use crate::pipeline::{BuildError, Stage, Unit};

const STAGE: &str = "import";

fn import_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"@import\s+(?:url\(\s*(?:"([^"]*)"|'([^']*)'|([^)\s]*))\s*\)|"([^"]*)"|'([^']*)')\s*([^;{}*]*);[ \t]*\n?"#,
        )
        .expect("valid import regex")
    })
}

pub struct Import {
    load_paths: Vec<PathBuf>,
}

impl Import {
    pub fn new(styles: &StylesConfig) -> Self {
        Self {
            load_paths: styles.load_paths.clone(),
        }
    }

    fn resolve(&self, spec: &str, from_dir: &Path) -> Option<PathBuf> {
        let spec = spec.split(['?', '#']).next().unwrap_or(spec);
        let candidates = |dir: &Path| {
            let path = dir.join(spec);
            let with_ext = (path.extension().is_none()).then(|| path.with_extension("css"));
            [Some(path), with_ext]
        };
        std::iter::once(from_dir)
            .chain(self.load_paths.iter().map(PathBuf::as_path))
            .flat_map(candidates)
            .flatten()
            .find(|p| p.is_file())
            .map(|p| crate::utils::path::normalize_path(&p))
    }

    /// Inline imports in `css`, which was read from `file`.
    fn inline(
        &self,
        css: &str,
        file: &Path,
        state: &mut InlineState,
    ) -> Result<String, BuildError> {
        let dir = file.parent().unwrap_or(Path::new("."));
        let mut out = String::with_capacity(css.len());
        let mut last = 0;
        let inert = Inert::scan(css);

        for caps in import_regex().captures_iter(css) {
            let whole = caps.get(0).expect("group 0 always matches");
            if inert.contains(whole.start()) {
                continue;
            }
            out.push_str(&css[last..whole.start()]);
            last = whole.end();

            let spec = import_target(&caps);
            if is_remote(spec) {
                state.remote.push(whole.as_str().trim_end().to_string());
                continue;
            }

            let line = Some(line_at(css, whole.start()));
            let Some(path) = self.resolve(spec, dir) else {
                return Err(BuildError::tool(
                    STAGE,
                    file,
                    line,
                    format!("cannot find imported file `{spec}`"),
                ));
            };
            if !state.seen.insert(path.clone()) {
                continue;
            }

            let content = std::fs::read_to_string(&path).map_err(|e| {
                BuildError::tool(STAGE, file, line, format!("{}: {e}", path.display()))
            })?;
            state.sources.push(path.clone());
            let inlined = self.inline(&content, &path, state)?;

            let media = caps.get(6).map_or("", |m| m.as_str().trim());
            if media.is_empty() {
                out.push_str(inlined.trim_end());
                out.push('\n');
            } else {
                let _ = writeln!(out, "@media {media} {{\n{}\n}}", inlined.trim_end());
            }
        }
        out.push_str(&css[last..]);
        Ok(out)
    }
}

#[derive(Default)]
struct InlineState {
    seen: FxHashSet<PathBuf>,
    sources: Vec<PathBuf>,
    remote: Vec<String>,
}

fn import_target<'a>(caps: &Captures<'a>) -> &'a str {
    (1..=5)
        .find_map(|i| caps.get(i))
        .map_or("", |m| m.as_str().trim())
}

fn is_remote(spec: &str) -> bool {
    spec.starts_with("http:") || spec.starts_with("https:") || spec.starts_with("//")
}

impl Stage for Import {
    fn name(&self) -> &'static str {
        STAGE
    }

    fn run(&self, unit: &mut Unit) -> Result<(), BuildError> {
        if !unit.css.contains("@import") {
            return Ok(());
        }

        let mut state = InlineState::default();
        state
            .seen
            .insert(crate::utils::path::normalize_path(&unit.entry));
        let body = self.inline(&unit.css, &unit.entry, &mut state)?;

        let mut css = String::with_capacity(body.len());
        for rule in &state.remote {
            css.push_str(rule);
            css.push('\n');
        }
        css.push_str(&body);

        for source in state.sources {
            if !unit.sources.contains(&source) {
                unit.sources.push(source);
            }
        }
        unit.css = css;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn run(dir: &Path, css: &str) -> Result<Unit, BuildError> {
        let mut unit = Unit::new(dir.join("main.scss"), dir.join("out/main.css"));
        unit.css = css.to_string();
        Import::new(&StylesConfig::default()).run(&mut unit)?;
        Ok(unit)
    }

    #[test]
    fn test_inlines_relative_import() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("reset.css"), "html { margin: 0; }").unwrap();

        let unit = run(dir.path(), "@import \"reset.css\";\n.a { color: red; }\n").unwrap();
        assert_eq!(unit.css, "html { margin: 0; }\n.a { color: red; }\n");
        assert!(unit.sources.iter().any(|p| p.ends_with("reset.css")));
    }

    #[test]
    fn test_nested_import_and_media() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("base")).unwrap();
        fs::write(dir.path().join("base/print.css"), "@import 'type';\n").unwrap();
        fs::write(dir.path().join("base/type.css"), "p { font-size: 12pt; }").unwrap();

        let unit = run(dir.path(), "@import url(base/print.css) print;\n").unwrap();
        assert!(unit.css.contains("@media print {\np { font-size: 12pt; }\n}"), "{}", unit.css);
    }

    #[test]
    fn test_remote_import_hoisted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.css"), ".a { color: red; }").unwrap();

        let unit = run(
            dir.path(),
            "@import \"a.css\";\n@import url(\"https://fonts.example.com/x.css\");\n",
        )
        .unwrap();
        assert!(unit.css.starts_with("@import url(\"https://fonts.example.com/x.css\");\n"));
        assert!(unit.css.contains(".a { color: red; }"));
    }

    #[test]
    fn test_duplicate_import_inlined_once() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.css"), ".a { color: red; }").unwrap();

        let unit = run(dir.path(), "@import 'a.css';\n@import 'a.css';\n").unwrap();
        assert_eq!(unit.css.matches(".a {").count(), 1);
    }

    #[test]
    fn test_missing_import_is_error_with_line() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(dir.path(), ".a { color: red; }\n@import 'nope.css';\n").unwrap_err();
        assert_eq!(err.kind(), "import");
        assert_eq!(err.line(), Some(2));
        assert!(err.message().contains("nope.css"));
    }

    #[test]
    fn test_commented_import_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("legacy.css"), ".legacy { color: red; }").unwrap();

        let css = "/* @import \"legacy.css\"; */\n/* @import 'gone.css'; */\n.a { color: red; }\n";
        let unit = run(dir.path(), css).unwrap();
        assert_eq!(unit.css, css);
        assert!(!unit.sources.iter().any(|p| p.ends_with("legacy.css")));
    }

    #[test]
    fn test_import_after_comment_still_inlined() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.css"), ".a { color: red; }").unwrap();

        let unit = run(dir.path(), "/* base */\n@import 'a.css';\n").unwrap();
        assert_eq!(unit.css, "/* base */\n.a { color: red; }\n");
    }

    #[test]
    fn test_unterminated_commented_import_does_not_swallow_next() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.css"), ".a { color: red; }").unwrap();

        let unit = run(dir.path(), "/* @import 'gone.css' */\n@import 'a.css';\n").unwrap();
        assert_eq!(unit.css, "/* @import 'gone.css' */\n.a { color: red; }\n");
    }
}
