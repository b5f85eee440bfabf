//! Bounded undo/redo history over scene snapshots.
//!
//! The ledger is a single stack of snapshots plus a current index.
//! Recording truncates any "future" entries beyond the index before
//! appending, and the stack is capped at [`MAX_HISTORY`] entries (oldest
//! dropped on overflow).
//!
//! Programmatic loads (undo, redo, import, initial document load) re-emit
//! the same scene events as user edits; without suppression every undo
//! would record itself as a new edit. Suppression is scoped with
//! [`RestoreGuard`]s: each restore operation holds its own RAII guard over
//! a shared counter, so overlapping restores cannot clear each other's
//! suppression and a failed restore cannot leave it stuck.

use crate::scene::SceneSnapshot;
use std::cell::Cell;
use std::rc::Rc;

/// Maximum number of snapshots kept in the ledger.
pub const MAX_HISTORY: usize = 50;

/// Undo/redo ledger of scene snapshots.
#[derive(Debug, Default)]
pub struct HistoryLedger {
    /// Snapshots, oldest first.
    stack: Vec<SceneSnapshot>,
    /// Current position; None before the first recorded snapshot.
    index: Option<usize>,
    /// Count of live restore guards.
    restores: Rc<Cell<usize>>,
}

/// RAII token suppressing history recording for one restore operation.
#[derive(Debug)]
pub struct RestoreGuard {
    restores: Rc<Cell<usize>>,
}

impl Drop for RestoreGuard {
    fn drop(&mut self) {
        self.restores.set(self.restores.get() - 1);
    }
}

impl HistoryLedger {
    /// Create an empty ledger (index -1).
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a restore operation; recording is suppressed while the
    /// returned guard is alive.
    pub fn begin_restore(&self) -> RestoreGuard {
        self.restores.set(self.restores.get() + 1);
        RestoreGuard {
            restores: Rc::clone(&self.restores),
        }
    }

    /// Check whether any restore operation is in flight.
    pub fn is_restoring(&self) -> bool {
        self.restores.get() > 0
    }

    /// Record a snapshot as a new edit.
    ///
    /// No-op while restoring. Otherwise truncates redo entries beyond the
    /// current index, appends, evicts the oldest entry past capacity, and
    /// moves the index to the new top. Structurally equal snapshots are
    /// recorded as distinct entries.
    pub fn record(&mut self, snapshot: SceneSnapshot) {
        if self.is_restoring() {
            return;
        }
        let keep = self.index.map_or(0, |i| i + 1);
        self.stack.truncate(keep);
        self.stack.push(snapshot);
        if self.stack.len() > MAX_HISTORY {
            self.stack.remove(0);
        }
        self.index = Some(self.stack.len() - 1);
    }

    /// The snapshot undo would restore, or None if undo is a no-op
    /// (index at 0 or ledger empty).
    pub fn undo_target(&self) -> Option<&SceneSnapshot> {
        let index = self.index?;
        if index == 0 {
            return None;
        }
        self.stack.get(index - 1)
    }

    /// Move the index down after a successful undo restore.
    pub fn commit_undo(&mut self) {
        if let Some(index) = self.index {
            if index > 0 {
                self.index = Some(index - 1);
            }
        }
    }

    /// The snapshot redo would restore, or None if redo is a no-op
    /// (index at the top).
    pub fn redo_target(&self) -> Option<&SceneSnapshot> {
        let index = self.index?;
        self.stack.get(index + 1)
    }

    /// Move the index up after a successful redo restore.
    pub fn commit_redo(&mut self) {
        if let Some(index) = self.index {
            if index + 1 < self.stack.len() {
                self.index = Some(index + 1);
            }
        }
    }

    /// Reset to a single-entry stack at index 0 (initial load, import).
    pub fn reset(&mut self, snapshot: SceneSnapshot) {
        self.stack = vec![snapshot];
        self.index = Some(0);
    }

    /// Empty the ledger (document with no prior scene).
    pub fn clear(&mut self) {
        self.stack.clear();
        self.index = None;
    }

    /// Number of snapshots in the ledger.
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Check if the ledger holds no snapshots.
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Current index, or None for the empty position (-1).
    pub fn current_index(&self) -> Option<usize> {
        self.index
    }

    pub fn can_undo(&self) -> bool {
        self.undo_target().is_some()
    }

    pub fn can_redo(&self) -> bool {
        self.redo_target().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(n: u64) -> SceneSnapshot {
        SceneSnapshot::from_json_str(&format!("{{\"edit\": {n}}}")).unwrap()
    }

    #[test]
    fn test_empty_ledger_noops() {
        let ledger = HistoryLedger::new();
        assert!(ledger.undo_target().is_none());
        assert!(ledger.redo_target().is_none());
        assert_eq!(ledger.current_index(), None);
    }

    #[test]
    fn test_record_advances_index() {
        let mut ledger = HistoryLedger::new();
        ledger.record(snap(0));
        ledger.record(snap(1));
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.current_index(), Some(1));
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut ledger = HistoryLedger::new();
        let n = 50;
        for i in 0..n {
            ledger.record(snap(i));
        }

        // Undo all the way down to the initial snapshot.
        let mut undos = 0;
        while let Some(target) = ledger.undo_target().cloned() {
            undos += 1;
            if undos == n - 1 {
                assert_eq!(target, snap(0));
            }
            ledger.commit_undo();
        }
        assert_eq!(undos, n - 1);
        assert_eq!(ledger.current_index(), Some(0));

        // Redo all the way back to the final snapshot.
        let mut redos = 0;
        let mut last = None;
        while let Some(target) = ledger.redo_target().cloned() {
            redos += 1;
            last = Some(target);
            ledger.commit_redo();
        }
        assert_eq!(redos, n - 1);
        assert_eq!(last, Some(snap(n - 1)));
    }

    #[test]
    fn test_undo_at_bottom_is_noop() {
        let mut ledger = HistoryLedger::new();
        ledger.record(snap(0));
        assert!(ledger.undo_target().is_none());
        ledger.commit_undo();
        assert_eq!(ledger.current_index(), Some(0));
    }

    #[test]
    fn test_redo_at_top_is_noop() {
        let mut ledger = HistoryLedger::new();
        ledger.record(snap(0));
        ledger.record(snap(1));
        assert!(ledger.redo_target().is_none());
        ledger.commit_redo();
        assert_eq!(ledger.current_index(), Some(1));
    }

    #[test]
    fn test_record_truncates_future() {
        let mut ledger = HistoryLedger::new();
        ledger.record(snap(0));
        ledger.record(snap(1));
        ledger.record(snap(2));

        ledger.commit_undo();
        ledger.commit_undo();
        assert_eq!(ledger.current_index(), Some(0));

        ledger.record(snap(9));
        assert_eq!(ledger.len(), 2);
        assert!(ledger.redo_target().is_none());
        assert_eq!(ledger.undo_target(), Some(&snap(0)));
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut ledger = HistoryLedger::new();
        for i in 0..(MAX_HISTORY as u64 + 1) {
            ledger.record(snap(i));
        }
        assert_eq!(ledger.len(), MAX_HISTORY);
        // Walk to the bottom: the oldest surviving snapshot is edit 1.
        while ledger.can_undo() {
            ledger.commit_undo();
        }
        assert_eq!(ledger.current_index(), Some(0));
        assert_eq!(ledger.redo_target(), Some(&snap(2)));
    }

    #[test]
    fn test_restore_guard_suppresses_record() {
        let mut ledger = HistoryLedger::new();
        ledger.record(snap(0));
        {
            let _guard = ledger.begin_restore();
            assert!(ledger.is_restoring());
            ledger.record(snap(1));
        }
        assert!(!ledger.is_restoring());
        assert_eq!(ledger.len(), 1);

        ledger.record(snap(2));
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_overlapping_guards() {
        let mut ledger = HistoryLedger::new();
        let outer = ledger.begin_restore();
        {
            let _inner = ledger.begin_restore();
        }
        // The outer operation is still in flight.
        assert!(ledger.is_restoring());
        ledger.record(snap(0));
        assert!(ledger.is_empty());
        drop(outer);
        assert!(!ledger.is_restoring());
    }

    #[test]
    fn test_reset_single_entry() {
        let mut ledger = HistoryLedger::new();
        ledger.record(snap(0));
        ledger.record(snap(1));
        ledger.reset(snap(7));
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.current_index(), Some(0));
        assert!(!ledger.can_undo());
        assert!(!ledger.can_redo());
    }
}
