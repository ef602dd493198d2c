//! Path normalization and URL path helpers.
//!
//! - `normalize_path` - file system paths (canonicalize + fallback)
//! - `relative_url` - URL from a stylesheet directory to an asset file
//! - `to_url_path` - platform path to `/`-separated, percent-encoded URL path

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use std::path::{Component, Path, PathBuf};

/// Characters escaped inside a URL path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'(')
    .add(b')')
    .add(b'\'');

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to joining with the current directory for paths that do not
/// exist yet (output directories before the first build).
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        };
        lexical_clean(&absolute)
    })
}

/// Remove `.` and resolve `..` components without touching the filesystem.
pub fn lexical_clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Convert a relative platform path into a `/`-separated URL path.
pub fn to_url_path(path: &Path) -> String {
    path.components()
        .map(|c| match c {
            Component::ParentDir => "..".to_string(),
            Component::CurDir => ".".to_string(),
            other => utf8_percent_encode(&other.as_os_str().to_string_lossy(), SEGMENT).to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Relative URL that reaches `target` from inside directory `from_dir`.
///
/// Both paths must be absolute and normalized.
///
/// ```text
/// from_dir: /site/public/css
/// target:   /site/images/logo.png
/// result:   ../../images/logo.png
/// ```
pub fn relative_url(target: &Path, from_dir: &Path) -> String {
    let target: Vec<_> = target.components().collect();
    let base: Vec<_> = from_dir.components().collect();

    let common = target
        .iter()
        .zip(base.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut rel = PathBuf::new();
    for _ in common..base.len() {
        rel.push("..");
    }
    for component in &target[common..] {
        rel.push(component.as_os_str());
    }
    to_url_path(&rel)
}
