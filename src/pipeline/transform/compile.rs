//! SCSS/Sass compilation with grass.
//!
//! Files are read through a tracking `grass::Fs` so the unit knows every
//! partial that went into the entry.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use grass::{Options, OutputStyle};
use parking_lot::Mutex;
use regex::Regex;

use crate::config::StylesConfig;
use crate::pipeline::{BuildError, Stage, Unit};

/// Filesystem adapter that records every file grass reads.
#[derive(Debug, Default)]
struct TrackingFs {
    reads: Mutex<Vec<PathBuf>>,
}

impl TrackingFs {
    fn into_reads(self) -> Vec<PathBuf> {
        self.reads.into_inner()
    }
}

impl grass::Fs for TrackingFs {
    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let bytes = std::fs::read(path)?;
        let mut reads = self.reads.lock();
        if !reads.iter().any(|p| p == path) {
            reads.push(path.to_path_buf());
        }
        Ok(bytes)
    }
}

pub struct Compile {
    load_paths: Vec<PathBuf>,
}

impl Compile {
    pub fn new(styles: &StylesConfig) -> Self {
        Self {
            load_paths: styles.load_paths.clone(),
        }
    }
}

impl Stage for Compile {
    fn name(&self) -> &'static str {
        "compile"
    }

    fn run(&self, unit: &mut Unit) -> Result<(), BuildError> {
        let fs = TrackingFs::default();
        let options = Options::default()
            .fs(&fs)
            .load_paths(&self.load_paths)
            .style(OutputStyle::Expanded);

        let compiled = grass::from_path(&unit.entry, &options);
        drop(options);

        let mut sources = fs.into_reads();
        if !sources.contains(&unit.entry) {
            sources.insert(0, unit.entry.clone());
        }
        unit.sources = sources;
        unit.css = compiled.map_err(|e| compile_error(&unit.entry, &e.to_string()))?;
        Ok(())
    }
}

/// Build a compile error from grass's rendered diagnostic.
///
/// The diagnostic reads:
///
/// ```text
/// Error: expected ";".
///   ╷
/// 3 │   width: 1px;
///   │        ^
///   ╵
/// .//site/styles/main.scss:3:8
/// ```
///
/// The last line is `path:line:column`, with grass's `./` prefix.
fn compile_error(entry: &Path, rendered: &str) -> BuildError {
    static LOCATION: OnceLock<Regex> = OnceLock::new();
    let location = LOCATION.get_or_init(|| {
        Regex::new(r"(?m)^(\S.*):(\d+):\d+\s*$").expect("valid location regex")
    });

    let message = rendered
        .lines()
        .next()
        .unwrap_or_default()
        .trim_start_matches("Error: ")
        .trim()
        .to_string();

    match location.captures_iter(rendered).last() {
        Some(caps) => {
            let raw = &caps[1];
            let file = PathBuf::from(raw.strip_prefix("./").unwrap_or(raw));
            BuildError::compile(file, caps[2].parse().ok(), message)
        }
        None => BuildError::compile(entry, None, message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn compile(dir: &Path, entry: &str) -> Result<Unit, BuildError> {
        let entry = dir.join(entry);
        let mut unit = Unit::new(&entry, dir.join("out/main.css"));
        Compile::new(&StylesConfig::default()).run(&mut unit)?;
        Ok(unit)
    }

    #[test]
    fn test_compiles_partials_and_tracks_them() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("_vars.scss"), "$brand: #336699;").unwrap();
        fs::write(
            dir.path().join("main.scss"),
            "@import 'vars';\n.a { .b { color: $brand; } }",
        )
        .unwrap();

        let unit = compile(dir.path(), "main.scss").unwrap();
        assert!(unit.css.contains(".a .b"), "{}", unit.css);
        assert!(unit.css.contains("#336699"));
        assert_eq!(unit.sources[0], dir.path().join("main.scss"));
        assert!(unit.sources.iter().any(|p| p.ends_with("_vars.scss")));
    }

    #[test]
    fn test_syntax_error_has_file_and_line() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("main.scss"), ".a {\n  color: red\n  width: 1px;\n}\n").unwrap();

        let err = compile(dir.path(), "main.scss").unwrap_err();
        assert_eq!(err.kind(), "compile");
        assert!(err.file().ends_with("main.scss"));
        assert_eq!(err.line(), Some(3));
        assert!(!err.message().starts_with("Error:"));
    }

    #[test]
    fn test_syntax_error_in_partial_points_at_partial() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("_card.scss"), ".card {\n  color: red\n  width: 1px;\n}\n").unwrap();
        fs::write(dir.path().join("main.scss"), "@import 'card';\n").unwrap();

        let err = compile(dir.path(), "main.scss").unwrap_err();
        assert!(err.file().ends_with("_card.scss"), "{:?}", err.file());
        assert!(err.file().is_absolute());
        assert_eq!(err.line(), Some(3));
    }

    #[test]
    fn test_parse_rendered_diagnostic() {
        let rendered = "Error: expected \";\".\n  ╷\n3 │   width: 1px;\n  │        ^\n  ╵\n.//site/styles/_card.scss:3:8";
        let err = compile_error(Path::new("/site/styles/main.scss"), rendered);
        assert_eq!(err.file(), Path::new("/site/styles/_card.scss"));
        assert_eq!(err.line(), Some(3));
        assert_eq!(err.message(), "expected \";\".");
    }

    #[test]
    fn test_parse_relative_location() {
        let rendered = "Error: undefined variable.\n  ╷\n1 │ a { b: $c }\n  │        ^^\n  ╵\n./styles/main.scss:1:8";
        let err = compile_error(Path::new("styles/main.scss"), rendered);
        assert_eq!(err.file(), Path::new("styles/main.scss"));
        assert_eq!(err.line(), Some(1));
    }

    #[test]
    fn test_unparsed_diagnostic_points_at_entry() {
        let err = compile_error(Path::new("/site/main.scss"), "Error: boom");
        assert_eq!(err.file(), Path::new("/site/main.scss"));
        assert_eq!(err.line(), None);
        assert_eq!(err.message(), "boom");
    }
}
