//! Configuration utility functions.

use crate::utils::path::normalize_path;
use std::path::{Path, PathBuf};

/// Find config file by searching upward from current directory
///
/// Starts from cwd and walks up parent directories until finding `config_name`
/// Returns the absolute path to the config file if found
///
/// # Example
/// ```text
/// /home/user/site/styles/partials/  ← cwd
/// /home/user/site/sheen.toml        ← found!
/// ```
pub fn find_config_file(config_name: &Path) -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_from(&cwd, config_name)
}

fn find_config_from(start: &Path, config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    let mut current = start;
    loop {
        let candidate = current.join(config_name);
        if candidate.exists() {
            return Some(candidate);
        }
        current = current.parent()?;
    }
}

/// Resolve a path from the config file: expand `~`, anchor relative paths at
/// the project root and normalize.
pub fn resolve_config_path(path: &Path, root: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    let expanded = PathBuf::from(shellexpand::tilde(&raw).into_owned());
    let full = if expanded.is_relative() {
        root.join(expanded)
    } else {
        expanded
    };
    normalize_path(&full)
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_config_walks_upward() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::write(root.join("sheen.toml"), "").unwrap();
        let nested = root.join("styles/partials");
        std::fs::create_dir_all(&nested).unwrap();

        let found = find_config_from(&nested, Path::new("sheen.toml")).unwrap();
        assert_eq!(found, root.join("sheen.toml"));
    }

    #[test]
    fn test_find_config_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_config_from(dir.path(), Path::new("no-such-config-file.toml")).is_none());
    }

    #[test]
    fn test_resolve_relative_to_root() {
        let resolved = resolve_config_path(Path::new("styles/../images"), Path::new("/site"));
        assert_eq!(resolved, PathBuf::from("/site/images"));
    }

    #[test]
    fn test_resolve_absolute_kept() {
        let resolved = resolve_config_path(Path::new("/opt/shared"), Path::new("/site"));
        assert_eq!(resolved, PathBuf::from("/opt/shared"));
    }
}
