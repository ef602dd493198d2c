use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

use super::types::ChangeKind;
use crate::utils::path::normalize_path;

pub(super) const DEBOUNCE_MS: u64 = 300;
pub(super) const REBUILD_COOLDOWN_MS: u64 = 500;

/// Collects notify events until the tree has been quiet for `DEBOUNCE_MS`.
///
/// Only timing and deduplication live here; what a path means is decided by
/// the classifier.
pub(super) struct Debouncer {
    pub(super) changes: FxHashMap<PathBuf, ChangeKind>,
    pub(super) last_event: Option<Instant>,
    pub(super) last_batch: Option<Instant>,
}

impl Debouncer {
    pub(super) fn new() -> Self {
        Self {
            changes: FxHashMap::default(),
            last_event: None,
            last_batch: None,
        }
    }

    /// Add a notify event, applying dedup rules:
    /// - Removed then Created/Modified → the restore event
    /// - Modified then Removed → Removed
    /// - Created then Removed → dropped
    /// - otherwise the first event wins
    pub(super) fn add_event(&mut self, event: &notify::Event) {
        use notify::EventKind;

        let kind = match event.kind {
            EventKind::Create(_) => ChangeKind::Created,
            EventKind::Remove(_) => ChangeKind::Removed,
            // mtime/chmod noise, e.g. from our own writes being indexed
            EventKind::Modify(notify::event::ModifyKind::Metadata(_)) => return,
            EventKind::Modify(_) => ChangeKind::Modified,
            _ => return,
        };

        crate::debug!("watch"; "raw notify: {:?} {:?}", event.kind, event.paths);

        for path in &event.paths {
            if is_temp_file(path) {
                continue;
            }
            let path = normalize_path(path);

            match self.changes.get(&path).copied() {
                None => {
                    crate::debug!("watch"; "event {}: {}", kind.label(), path.display());
                    self.changes.insert(path, kind);
                }
                Some(ChangeKind::Removed)
                    if matches!(kind, ChangeKind::Created | ChangeKind::Modified) =>
                {
                    crate::debug!("watch"; "restored: {}", path.display());
                    self.changes.insert(path, kind);
                }
                Some(ChangeKind::Modified) if kind == ChangeKind::Removed => {
                    self.changes.insert(path, ChangeKind::Removed);
                }
                Some(ChangeKind::Created) if kind == ChangeKind::Removed => {
                    crate::debug!("watch"; "discard created+removed: {}", path.display());
                    self.changes.remove(&path);
                }
                Some(_) => continue,
            }
            self.last_event = Some(Instant::now());
        }
        // Everything pending cancelled out, nothing to wait for.
        if self.changes.is_empty() {
            self.last_event = None;
        }
    }

    /// Take the collected events once debounce and cooldown have elapsed.
    pub(super) fn take_if_ready(&mut self) -> Option<FxHashMap<PathBuf, ChangeKind>> {
        if !self.is_ready() {
            return None;
        }
        let changes = std::mem::take(&mut self.changes);
        self.last_event = None;
        self.last_batch = Some(Instant::now());
        Some(changes)
    }

    pub(super) fn is_ready(&self) -> bool {
        let Some(last_event) = self.last_event else {
            return false;
        };
        if last_event.elapsed() < Duration::from_millis(DEBOUNCE_MS) {
            return false;
        }
        if let Some(last_batch) = self.last_batch
            && last_batch.elapsed() < Duration::from_millis(REBUILD_COOLDOWN_MS)
        {
            return false;
        }
        !self.changes.is_empty()
    }

    /// Sleep until the earliest moment `is_ready` can turn true.
    pub(super) fn sleep_duration(&self) -> Duration {
        let Some(last_event) = self.last_event.filter(|_| !self.changes.is_empty()) else {
            return Duration::from_secs(86400);
        };

        let debounce_remaining =
            Duration::from_millis(DEBOUNCE_MS).saturating_sub(last_event.elapsed());
        let cooldown_remaining = self
            .last_batch
            .map(|t| Duration::from_millis(REBUILD_COOLDOWN_MS).saturating_sub(t.elapsed()))
            .unwrap_or(Duration::ZERO);

        debounce_remaining
            .max(cooldown_remaining)
            .max(Duration::from_millis(1))
    }
}

/// Editor swap and backup files.
pub(super) fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bak" | "swp" | "swo" | "swx" | "tmp")
        || name.ends_with('~')
        || name.starts_with(".#")
        || name == "4913"
}
