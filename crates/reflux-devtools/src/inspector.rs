//! Read-only inspection and time-travel navigation over a store's history

use crate::Result;
use reflux_core::{Action, Error as StoreError, History, Store, StoreState};
use std::sync::Arc;

/// One row of the action log as shown by a devtools panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub seq: u64,
    /// Tag of the action that produced the snapshot (`None` for the initial state)
    pub tag: Option<&'static str>,
    /// Debug rendering of the action
    pub detail: Option<String>,
    /// Whether the store currently shows this snapshot
    pub current: bool,
}

/// Inspector attached to a store
///
/// Navigation goes through the store's own time-travel operations, so
/// subscribers and selectors follow along. Nothing here re-runs reducers.
pub struct Inspector<S> {
    store: Store<S>,
}

impl<S: StoreState> Inspector<S> {
    /// Attach to a store; fails when the store keeps no history
    pub fn new(store: Store<S>) -> Result<Self> {
        if store.history().is_none() {
            return Err(StoreError::HistoryDisabled.into());
        }
        Ok(Self { store })
    }

    pub fn store(&self) -> &Store<S> {
        &self.store
    }

    /// Copy of the snapshot log
    pub fn history(&self) -> History<S> {
        // Checked in `new`; the store cannot turn history off afterwards
        self.store
            .history()
            .unwrap_or_else(|| History::new(self.store.state(), 0))
    }

    /// Every retained snapshot, oldest first, including any redo branch
    pub fn entries(&self) -> Vec<Entry> {
        let history = self.history();
        let current = history.current().seq;
        history
            .snapshots()
            .iter()
            .map(|snapshot| Entry {
                seq: snapshot.seq,
                tag: snapshot.action_tag(),
                detail: snapshot.action.as_ref().map(|action| format!("{action:?}")),
                current: snapshot.seq == current,
            })
            .collect()
    }

    /// Sequence number the store currently shows
    pub fn current_seq(&self) -> u64 {
        self.history().current().seq
    }

    pub fn first_seq(&self) -> u64 {
        self.history().stats().first_seq
    }

    pub fn last_seq(&self) -> u64 {
        self.history().stats().last_seq
    }

    /// State recorded at `seq`, without moving the store
    pub fn state_at(&self, seq: u64) -> Option<Arc<S>> {
        self.history()
            .get(seq)
            .map(|snapshot| Arc::clone(&snapshot.state))
    }

    /// Sequence numbers of snapshots produced by actions of type `A`
    pub fn seqs_of<A: Action>(&self) -> Vec<u64> {
        self.history()
            .snapshots()
            .iter()
            .filter(|snapshot| snapshot.action.as_ref().is_some_and(|action| action.is::<A>()))
            .map(|snapshot| snapshot.seq)
            .collect()
    }

    /// Show snapshot `seq`
    pub fn goto(&mut self, seq: u64) -> Result<()> {
        tracing::debug!(seq, "inspector goto");
        self.store.jump_to(seq)?;
        Ok(())
    }

    /// Step back one snapshot; `false` when already at the oldest
    pub fn step_backward(&mut self) -> Result<bool> {
        if !self.store.can_undo() {
            return Ok(false);
        }
        self.store.undo()?;
        Ok(true)
    }

    /// Step forward one snapshot; `false` when already at the newest
    pub fn step_forward(&mut self) -> Result<bool> {
        if !self.store.can_redo() {
            return Ok(false);
        }
        self.store.redo()?;
        Ok(true)
    }

    /// Show the oldest retained snapshot
    pub fn rewind(&mut self) -> Result<()> {
        let first = self.first_seq();
        self.goto(first)
    }

    /// Show the newest snapshot
    pub fn fast_forward(&mut self) -> Result<()> {
        let last = self.last_seq();
        self.goto(last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use reflux_core::{Reducers, StoreConfig};

    #[derive(Debug)]
    struct Add(i64);
    impl Action for Add {}

    #[derive(Debug)]
    struct Clear;
    impl Action for Clear {}

    fn recorded_store() -> Store<i64> {
        let store = Store::new(
            Reducers::new()
                .on(|n: &i64, a: &Add| n + a.0)
                .on(|_: &i64, _: &Clear| 0),
            0,
        );
        store.dispatch(Add(5)).unwrap();
        store.dispatch(Add(10)).unwrap();
        store.dispatch(Clear).unwrap();
        store.dispatch(Add(1)).unwrap();
        store
    }

    #[test]
    fn test_requires_history() {
        let store = Store::with_config(Reducers::<i64>::new(), 0, StoreConfig::without_history());
        assert!(matches!(
            Inspector::new(store),
            Err(Error::Store(StoreError::HistoryDisabled))
        ));
    }

    #[test]
    fn test_entries() {
        let inspector = Inspector::new(recorded_store()).unwrap();
        let entries = inspector.entries();

        assert_eq!(entries.len(), 5);
        assert_eq!(entries[0].tag, None);
        assert_eq!(entries[1].detail.as_deref(), Some("Add(5)"));
        assert!(entries[4].current);
        assert!(entries[..4].iter().all(|entry| !entry.current));
    }

    #[test]
    fn test_step_and_goto() {
        let store = recorded_store();
        let mut inspector = Inspector::new(store.clone()).unwrap();

        assert!(inspector.step_backward().unwrap());
        assert_eq!(*store.state(), 0);

        inspector.goto(2).unwrap();
        assert_eq!(*store.state(), 15);
        assert_eq!(inspector.current_seq(), 2);

        inspector.rewind().unwrap();
        assert!(!inspector.step_backward().unwrap());

        inspector.fast_forward().unwrap();
        assert!(!inspector.step_forward().unwrap());
        assert_eq!(*store.state(), 1);
    }

    #[test]
    fn test_state_at_does_not_move_store() {
        let store = recorded_store();
        let inspector = Inspector::new(store.clone()).unwrap();

        assert_eq!(inspector.state_at(1).as_deref(), Some(&5));
        assert_eq!(inspector.state_at(9), None);
        assert_eq!(*store.state(), 1);
    }

    #[test]
    fn test_seqs_of() {
        let inspector = Inspector::new(recorded_store()).unwrap();
        assert_eq!(inspector.seqs_of::<Add>(), vec![1, 2, 4]);
        assert_eq!(inspector.seqs_of::<Clear>(), vec![3]);
    }

    #[test]
    fn test_goto_unknown_seq() {
        let mut inspector = Inspector::new(recorded_store()).unwrap();
        assert!(matches!(
            inspector.goto(99),
            Err(Error::Store(StoreError::SnapshotNotFound(99)))
        ));
    }
}
