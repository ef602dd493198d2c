use std::path::PathBuf;

use rustc_hash::FxHashMap;

use super::types::ChangeKind;
use crate::reload::category::{ChangeBatch, Classifier};

/// Turn raw debounced events into a classified batch.
///
/// Pipeline: correct_by_existence → drop directories → categorize
pub(super) fn classify(
    raw: FxHashMap<PathBuf, ChangeKind>,
    classifier: &Classifier,
) -> Option<ChangeBatch> {
    let mut changes = raw;
    correct_by_existence(&mut changes);

    let mut paths: Vec<PathBuf> = changes
        .into_iter()
        .filter(|(path, kind)| *kind == ChangeKind::Removed || !path.is_dir())
        .map(|(path, _)| path)
        .collect();
    // Stable order for logs and reload reasons.
    paths.sort();

    let batch = ChangeBatch::classify(classifier, paths);
    (!batch.is_empty()).then_some(batch)
}

/// Reconcile event kinds with actual filesystem state.
///
/// The watcher may report stale events (e.g., Created for a file that's already
/// been deleted, or Removed for a file that still exists after an atomic save).
pub(super) fn correct_by_existence(changes: &mut FxHashMap<PathBuf, ChangeKind>) {
    changes.retain(|path, kind| {
        let exists = path.exists();
        match *kind {
            ChangeKind::Created if !exists => {
                crate::debug!("watch"; "discard created (gone): {}", path.display());
                false
            }
            ChangeKind::Modified if !exists => {
                crate::debug!("watch"; "upgrade modified->removed: {}", path.display());
                *kind = ChangeKind::Removed;
                true
            }
            ChangeKind::Removed if exists => {
                crate::debug!("watch"; "downgrade removed->modified: {}", path.display());
                *kind = ChangeKind::Modified;
                true
            }
            _ => true,
        }
    });
}
