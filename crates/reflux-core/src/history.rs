//! Snapshot history for undo/redo and time travel
//!
//! Every committed dispatch appends a [`Snapshot`] holding the resulting
//! state. The history keeps a cursor on the snapshot the store currently
//! shows; moving the cursor never re-runs reducers. Recording while the
//! cursor is behind the newest snapshot drops the redo branch first.
//!
//! Sequence numbers equal the position of a snapshot in the current
//! timeline: the construction-time state is `0`, the first dispatch `1`.

use crate::{ActionRef, Error, Result};
use std::sync::Arc;

/// A recorded `(sequence, state, action)` triple
#[derive(Debug)]
pub struct Snapshot<S> {
    /// Position in the timeline
    pub seq: u64,
    /// State after `action` was reduced
    pub state: Arc<S>,
    /// The action that produced this state (`None` for the initial state)
    pub action: Option<ActionRef>,
}

impl<S> Clone for Snapshot<S> {
    fn clone(&self) -> Self {
        Self {
            seq: self.seq,
            state: Arc::clone(&self.state),
            action: self.action.clone(),
        }
    }
}

impl<S> Snapshot<S> {
    /// Tag of the action, if any
    pub fn action_tag(&self) -> Option<&'static str> {
        self.action.as_ref().map(|action| action.tag())
    }
}

/// Statistics about a history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryStats {
    pub snapshot_count: usize,
    /// Sequence number of the oldest retained snapshot
    pub first_seq: u64,
    /// Sequence number of the newest snapshot
    pub last_seq: u64,
    /// Sequence number the store currently shows
    pub current_seq: u64,
}

/// Ordered snapshot log with a time-travel cursor
#[derive(Debug)]
pub struct History<S> {
    snapshots: Vec<Snapshot<S>>,
    cursor: usize,
    /// Maximum retained snapshots (0 = unlimited)
    limit: usize,
}

impl<S> Clone for History<S> {
    fn clone(&self) -> Self {
        Self {
            snapshots: self.snapshots.clone(),
            cursor: self.cursor,
            limit: self.limit,
        }
    }
}

impl<S> History<S> {
    /// Start a history at `initial`
    pub fn new(initial: Arc<S>, limit: usize) -> Self {
        Self {
            snapshots: vec![Snapshot {
                seq: 0,
                state: initial,
                action: None,
            }],
            cursor: 0,
            limit,
        }
    }

    /// Append the result of a dispatch and move the cursor onto it
    pub fn record(&mut self, state: Arc<S>, action: ActionRef) -> u64 {
        self.snapshots.truncate(self.cursor + 1);
        let seq = self.current().seq + 1;
        self.snapshots.push(Snapshot {
            seq,
            state,
            action: Some(action),
        });
        self.cursor = self.snapshots.len() - 1;
        self.enforce_limit();
        seq
    }

    /// Snapshot under the cursor
    pub fn current(&self) -> &Snapshot<S> {
        &self.snapshots[self.cursor]
    }

    /// Snapshot with sequence number `seq`
    pub fn get(&self, seq: u64) -> Option<&Snapshot<S>> {
        self.position(seq).map(|index| &self.snapshots[index])
    }

    /// All retained snapshots, oldest first (including any redo branch)
    pub fn snapshots(&self) -> &[Snapshot<S>] {
        &self.snapshots
    }

    /// Actions applied up to the cursor, in dispatch order
    pub fn actions(&self) -> Vec<ActionRef> {
        self.snapshots[..=self.cursor]
            .iter()
            .filter_map(|snapshot| snapshot.action.clone())
            .collect()
    }

    /// Move the cursor onto snapshot `seq`
    pub fn jump_to(&mut self, seq: u64) -> Result<&Snapshot<S>> {
        let index = self.position(seq).ok_or(Error::SnapshotNotFound(seq))?;
        self.cursor = index;
        Ok(&self.snapshots[index])
    }

    /// Step the cursor back one snapshot
    pub fn undo(&mut self) -> Result<&Snapshot<S>> {
        if !self.can_undo() {
            return Err(Error::NothingToUndo);
        }
        self.cursor -= 1;
        Ok(&self.snapshots[self.cursor])
    }

    /// Step the cursor forward one snapshot
    pub fn redo(&mut self) -> Result<&Snapshot<S>> {
        if !self.can_redo() {
            return Err(Error::NothingToRedo);
        }
        self.cursor += 1;
        Ok(&self.snapshots[self.cursor])
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// Drop everything and start again from `initial`
    pub fn reset(&mut self, initial: Arc<S>) {
        *self = Self::new(initial, self.limit);
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Always false: the history holds at least the snapshot under the cursor
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn stats(&self) -> HistoryStats {
        HistoryStats {
            snapshot_count: self.snapshots.len(),
            first_seq: self.snapshots[0].seq,
            last_seq: self.snapshots[self.snapshots.len() - 1].seq,
            current_seq: self.current().seq,
        }
    }

    fn position(&self, seq: u64) -> Option<usize> {
        // Sequence numbers are contiguous within the retained window
        let first = self.snapshots[0].seq;
        let index = usize::try_from(seq.checked_sub(first)?).ok()?;
        (index < self.snapshots.len()).then_some(index)
    }

    fn enforce_limit(&mut self) {
        if self.limit > 0 && self.snapshots.len() > self.limit {
            let excess = self.snapshots.len() - self.limit;
            self.snapshots.drain(0..excess);
            self.cursor = self.cursor.saturating_sub(excess);
        }
    }
}
