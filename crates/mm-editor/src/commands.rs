//! Undo/Redo history.
//!
//! Snapshots are immutable `Arc<MindMap>`s, so an undo entry is simply the
//! snapshot that was current before the change. No inverse actions are
//! computed and structurally shared nodes cost nothing extra.
//!
//! Gestures use **batching**: the snapshot at `begin_batch` is remembered
//! and one entry is pushed at `end_batch`, so a drag of a hundred move
//! events undoes in a single step.

use mm_core::model::MindMap;
use std::collections::VecDeque;
use std::sync::Arc;

/// One undoable step: the snapshot to return to.
#[derive(Debug, Clone)]
pub struct Entry {
    pub snapshot: Arc<MindMap>,
    pub description: &'static str,
}

pub struct History {
    undo_stack: VecDeque<Entry>,
    redo_stack: Vec<Entry>,
    max_depth: usize,
    /// Batch nesting depth (0 = not batching).
    batch_depth: usize,
    /// Snapshot captured when the outermost batch opened.
    batch_start: Option<Arc<MindMap>>,
    batch_description: &'static str,
}

impl History {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::with_capacity(max_depth.min(64)),
            redo_stack: Vec::new(),
            max_depth,
            batch_depth: 0,
            batch_start: None,
            batch_description: "",
        }
    }

    /// Note that the map changed away from `before`.
    ///
    /// Inside a batch this is a no-op: the batch already holds its starting
    /// snapshot.
    pub fn record(&mut self, before: &Arc<MindMap>, description: &'static str) {
        if self.batch_depth > 0 {
            return;
        }
        self.push(Entry {
            snapshot: Arc::clone(before),
            description,
        });
    }

    /// Open a batch. Nested calls are counted; only the outermost one
    /// captures `current`.
    pub fn begin_batch(&mut self, current: &Arc<MindMap>, description: &'static str) {
        if self.batch_depth == 0 {
            self.batch_start = Some(Arc::clone(current));
            self.batch_description = description;
        }
        self.batch_depth += 1;
    }

    /// Close a batch. When the outermost batch closes and the map actually
    /// changed, one entry covering the whole batch is pushed.
    pub fn end_batch(&mut self, current: Option<&Arc<MindMap>>) {
        if self.batch_depth == 0 {
            return;
        }
        self.batch_depth -= 1;
        if self.batch_depth > 0 {
            return;
        }
        let Some(start) = self.batch_start.take() else {
            return;
        };
        let changed = current.is_some_and(|now| !Arc::ptr_eq(now, &start));
        if changed {
            self.push(Entry {
                snapshot: start,
                description: self.batch_description,
            });
        }
    }

    pub fn is_batching(&self) -> bool {
        self.batch_depth > 0
    }

    /// Step back. `current` moves onto the redo stack and the snapshot to
    /// restore is returned.
    pub fn undo(&mut self, current: &Arc<MindMap>) -> Option<Entry> {
        let entry = self.undo_stack.pop_back()?;
        self.redo_stack.push(Entry {
            snapshot: Arc::clone(current),
            description: entry.description,
        });
        Some(entry)
    }

    /// Step forward again after an undo.
    pub fn redo(&mut self, current: &Arc<MindMap>) -> Option<Entry> {
        let entry = self.redo_stack.pop()?;
        self.undo_stack.push_back(Entry {
            snapshot: Arc::clone(current),
            description: entry.description,
        });
        Some(entry)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Forget everything, including an open batch.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.batch_depth = 0;
        self.batch_start = None;
    }

    fn push(&mut self, entry: Entry) {
        self.undo_stack.push_back(entry);
        while self.undo_stack.len() > self.max_depth {
            self.undo_stack.pop_front();
        }
        // New action clears redo
        self.redo_stack.clear();
    }
}
