//! Undo/redo history over the stroke store.
//!
//! Entries are never popped. An applied boundary splits the list into the
//! applied prefix and the redo tail; pushing a new entry truncates the tail.
//!
//! ```text
//! entries:  [ e0 | e1 | e2 | e3 | e4 ]
//!                          ^
//!                       applied = 3   (e3, e4 can be redone)
//! ```
//!
//! Forward-replaying `entries[..applied]` from an empty store always
//! reproduces the live store.

use serde::{Deserialize, Serialize};

use crate::{CalcError, CalcResult, Stroke, StrokeStore};

/// A reversible drawing operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HistoryEntry {
    /// A stroke was committed.
    StrokeAdded(Stroke),
    /// The canvas was cleared; holds the strokes present before the clear.
    Cleared(Vec<Stroke>),
}

impl HistoryEntry {
    fn apply(&self, store: &mut StrokeStore) {
        match self {
            Self::StrokeAdded(stroke) => store.insert(stroke.clone()),
            Self::Cleared(_) => {
                store.take_all();
            }
        }
    }

    fn revert(&self, store: &mut StrokeStore) {
        match self {
            Self::StrokeAdded(stroke) => {
                if store.remove(stroke.id()).is_none() {
                    tracing::error!(
                        "Undo of stroke {} found it missing from the store",
                        stroke.id()
                    );
                }
            }
            Self::Cleared(prior) => store.restore(prior.clone()),
        }
    }
}

/// Undo/redo stack with an applied boundary.
///
/// Deserialization rejects an applied boundary past the end of the entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "HistoryParts")]
pub struct HistoryStack {
    entries: Vec<HistoryEntry>,
    applied: usize,
}

#[derive(Deserialize)]
struct HistoryParts {
    entries: Vec<HistoryEntry>,
    applied: usize,
}

impl TryFrom<HistoryParts> for HistoryStack {
    type Error = String;

    fn try_from(parts: HistoryParts) -> Result<Self, Self::Error> {
        if parts.applied > parts.entries.len() {
            return Err(format!(
                "applied boundary {} exceeds {} entries",
                parts.applied,
                parts.entries.len()
            ));
        }
        Ok(Self {
            entries: parts.entries,
            applied: parts.applied,
        })
    }
}

impl HistoryStack {
    /// Create an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an entry whose effect has already been applied to the store.
    ///
    /// Any redo tail is discarded.
    pub fn push(&mut self, entry: HistoryEntry) {
        if self.applied < self.entries.len() {
            tracing::debug!(
                "Discarding {} redo entries",
                self.entries.len() - self.applied
            );
            self.entries.truncate(self.applied);
        }
        self.entries.push(entry);
        self.applied = self.entries.len();
    }

    /// Reverse the most recent applied entry.
    ///
    /// # Errors
    ///
    /// Returns [`CalcError::EmptyHistory`] if nothing has been applied.
    pub fn undo(&mut self, store: &mut StrokeStore) -> CalcResult<()> {
        if self.applied == 0 {
            return Err(CalcError::EmptyHistory);
        }
        self.applied -= 1;
        self.entries[self.applied].revert(store);
        Ok(())
    }

    /// Reapply the next entry of the redo tail.
    ///
    /// # Errors
    ///
    /// Returns [`CalcError::EmptyRedo`] if the redo tail is empty.
    pub fn redo(&mut self, store: &mut StrokeStore) -> CalcResult<()> {
        let entry = self.entries.get(self.applied).ok_or(CalcError::EmptyRedo)?;
        entry.apply(store);
        self.applied += 1;
        Ok(())
    }

    /// Check if undo is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.applied > 0
    }

    /// Check if redo is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.applied < self.entries.len()
    }

    /// Number of applied entries.
    #[must_use]
    pub fn applied_len(&self) -> usize {
        self.applied
    }

    /// Total entries, applied and redoable.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no entries at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forward-replay the applied prefix from an empty store.
    #[must_use]
    pub fn replay(&self) -> StrokeStore {
        let mut store = StrokeStore::new();
        for entry in &self.entries[..self.applied] {
            entry.apply(&mut store);
        }
        store
    }

    /// Drop every entry.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.applied = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Point, Rgba, ToolMode};

    fn stroke(x: f32) -> Stroke {
        Stroke::new(
            vec![Point::new(x, 0.0), Point::new(x, 10.0)],
            Rgba::WHITE,
            3.0,
            ToolMode::Draw,
        )
    }

    fn add(history: &mut HistoryStack, store: &mut StrokeStore, s: Stroke) {
        store.insert(s.clone());
        history.push(HistoryEntry::StrokeAdded(s));
    }

    fn clear(history: &mut HistoryStack, store: &mut StrokeStore) {
        let prior = store.take_all();
        history.push(HistoryEntry::Cleared(prior));
    }

    #[test]
    fn test_undo_on_empty_history() {
        let mut history = HistoryStack::new();
        let mut store = StrokeStore::new();
        assert!(matches!(history.undo(&mut store), Err(CalcError::EmptyHistory)));
        assert!(!history.can_undo());
    }

    #[test]
    fn test_redo_after_fresh_push() {
        let mut history = HistoryStack::new();
        let mut store = StrokeStore::new();
        add(&mut history, &mut store, stroke(1.0));
        assert!(matches!(history.redo(&mut store), Err(CalcError::EmptyRedo)));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_redo_stroke() {
        let mut history = HistoryStack::new();
        let mut store = StrokeStore::new();
        add(&mut history, &mut store, stroke(1.0));
        add(&mut history, &mut store, stroke(2.0));
        let full = store.clone();

        history.undo(&mut store).expect("undo");
        assert_eq!(store.len(), 1);
        assert!(history.can_redo());

        history.redo(&mut store).expect("redo");
        assert_eq!(store, full);
    }

    #[test]
    fn test_undo_clear_restores_snapshot() {
        let mut history = HistoryStack::new();
        let mut store = StrokeStore::new();
        add(&mut history, &mut store, stroke(1.0));
        add(&mut history, &mut store, stroke(2.0));
        let before = store.clone();

        clear(&mut history, &mut store);
        assert!(store.is_empty());

        history.undo(&mut store).expect("undo clear");
        assert_eq!(store, before);

        history.redo(&mut store).expect("redo clear");
        assert!(store.is_empty());
    }

    #[test]
    fn test_push_truncates_redo_tail() {
        let mut history = HistoryStack::new();
        let mut store = StrokeStore::new();
        add(&mut history, &mut store, stroke(1.0));
        add(&mut history, &mut store, stroke(2.0));
        history.undo(&mut store).expect("undo");
        history.undo(&mut store).expect("undo");
        assert_eq!(history.len(), 2);

        add(&mut history, &mut store, stroke(3.0));
        assert_eq!(history.len(), 1);
        assert!(!history.can_redo());
        assert!(matches!(history.redo(&mut store), Err(CalcError::EmptyRedo)));
    }

    #[test]
    fn test_reset() {
        let mut history = HistoryStack::new();
        let mut store = StrokeStore::new();
        add(&mut history, &mut store, stroke(1.0));
        history.reset();
        assert!(history.is_empty());
        assert!(!history.can_undo());
    }

    #[test]
    fn test_deserialize_checks_applied_boundary() {
        let mut history = HistoryStack::new();
        let mut store = StrokeStore::new();
        add(&mut history, &mut store, stroke(1.0));
        history.undo(&mut store).expect("undo");

        let json = serde_json::to_value(&history).expect("serialize");
        let restored: HistoryStack = serde_json::from_value(json).expect("deserialize");
        assert_eq!(restored.applied_len(), 0);
        assert!(restored.can_redo());

        let bad = serde_json::json!({ "entries": [], "applied": 3 });
        let err = serde_json::from_value::<HistoryStack>(bad).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("applied boundary 3 exceeds 0 entries"));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Commit(f32),
            Clear,
            Undo,
            Redo,
        }

        fn arb_op() -> impl Strategy<Value = Op> {
            prop_oneof![
                3 => (0.0f32..500.0f32).prop_map(Op::Commit),
                1 => Just(Op::Clear),
                3 => Just(Op::Undo),
                2 => Just(Op::Redo),
            ]
        }

        proptest! {
            #[test]
            fn prop_store_matches_replay_of_applied_prefix(
                ops in prop::collection::vec(arb_op(), 0..60)
            ) {
                let mut history = HistoryStack::new();
                let mut store = StrokeStore::new();

                for op in ops {
                    match op {
                        Op::Commit(x) => add(&mut history, &mut store, stroke(x)),
                        Op::Clear => clear(&mut history, &mut store),
                        Op::Undo => {
                            let could = history.can_undo();
                            prop_assert_eq!(history.undo(&mut store).is_ok(), could);
                        }
                        Op::Redo => {
                            let could = history.can_redo();
                            prop_assert_eq!(history.redo(&mut store).is_ok(), could);
                        }
                    }
                    prop_assert_eq!(&store, &history.replay());
                    prop_assert!(history.applied_len() <= history.len());
                }
            }
        }
    }
}
