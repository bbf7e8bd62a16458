//! Replay engine.
//!
//! Recomputes the ordered sequence of computed entries from a committed
//! baseline and the staged actions. Every function here is pure: the only
//! caching is the incremental append the state machine performs itself.

use crate::core::{Action, ActionId, ActionRecord, ComputedEntry, Reducer, State};
use std::backtrace::Backtrace;
use std::collections::BTreeMap;
use tracing::{debug, error, warn};

/// Error carried by every entry after the first failing one in a replay run.
pub const INTERRUPTED_MESSAGE: &str = "Interrupted by an error up the chain";

/// Compute the entry that follows `previous` when `record` is applied.
///
/// If `previous` carries an error the reducer is not invoked: the state is
/// kept and the error becomes [`INTERRUPTED_MESSAGE`].
pub fn compute_next_entry<S: State, A: Action>(
    reducer: &Reducer<S, A>,
    record: &ActionRecord<A>,
    previous_state: Option<&S>,
    previous_error: Option<&str>,
) -> ComputedEntry<S> {
    if previous_error.is_some() {
        return ComputedEntry::failed(previous_state.cloned(), INTERRUPTED_MESSAGE);
    }

    match reducer.reduce(previous_state, &record.action) {
        Ok(state) => ComputedEntry::ok(state),
        Err(err) => {
            error!(
                target: "rewind::replay",
                action = record.action.name(),
                error = %err,
                backtrace = %Backtrace::capture(),
                "reducer failed"
            );
            ComputedEntry::failed(previous_state.cloned(), err.to_string())
        }
    }
}

/// Replay every staged action from `committed_state`.
///
/// Returns exactly one entry per staged id. A skipped id repeats the previous
/// entry unchanged; for index 0 the previous entry is the committed state
/// with no error.
pub fn recompute<S: State, A: Action>(
    reducer: &Reducer<S, A>,
    committed_state: Option<&S>,
    actions_by_id: &BTreeMap<ActionId, ActionRecord<A>>,
    staged_action_ids: &[ActionId],
    skipped_action_ids: &[ActionId],
) -> Vec<ComputedEntry<S>> {
    let mut computed: Vec<ComputedEntry<S>> = Vec::with_capacity(staged_action_ids.len());

    for &id in staged_action_ids {
        let (previous_state, previous_error) = match computed.last() {
            Some(entry) => (entry.state.as_ref(), entry.error.as_deref()),
            None => (committed_state, None),
        };

        let entry = if skipped_action_ids.contains(&id) {
            match computed.last() {
                Some(previous) => previous.clone(),
                None => ComputedEntry {
                    state: committed_state.cloned(),
                    error: None,
                },
            }
        } else if let Some(record) = actions_by_id.get(&id) {
            compute_next_entry(reducer, record, previous_state, previous_error)
        } else {
            warn!(
                target: "rewind::replay",
                action_id = id,
                "staged action is missing from the record store"
            );
            match previous_error {
                Some(_) => ComputedEntry::failed(previous_state.cloned(), INTERRUPTED_MESSAGE),
                None => ComputedEntry::failed(
                    previous_state.cloned(),
                    format!("Action {id} is missing from the record store"),
                ),
            }
        };

        computed.push(entry);
    }

    debug!(
        target: "rewind::replay",
        entries = computed.len(),
        skipped = skipped_action_ids.len(),
        "recomputed history"
    );
    computed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{RecordedAction, ReducerError};
    use chrono::Utc;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum TestAction {
        Add(i64),
        Boom,
    }

    impl Action for TestAction {
        fn name(&self) -> &str {
            match self {
                Self::Add(_) => "Add",
                Self::Boom => "Boom",
            }
        }
    }

    fn reducer() -> Reducer<i64, TestAction> {
        Reducer::new(|state, action| {
            let current = state.copied().unwrap_or(0);
            match action {
                RecordedAction::Init => Ok(current),
                RecordedAction::App(TestAction::Add(n)) => Ok(current + n),
                RecordedAction::App(TestAction::Boom) => Err(ReducerError::rejected("boom")),
            }
        })
    }

    fn records(actions: &[TestAction]) -> (BTreeMap<ActionId, ActionRecord<TestAction>>, Vec<ActionId>) {
        let mut by_id = crate::core::initial_record_store();
        let mut staged = vec![0];
        for (i, action) in actions.iter().enumerate() {
            let id = i as ActionId + 1;
            by_id.insert(id, ActionRecord::new(action.clone(), Utc::now()));
            staged.push(id);
        }
        (by_id, staged)
    }

    fn states(entries: &[ComputedEntry<i64>]) -> Vec<Option<i64>> {
        entries.iter().map(|e| e.state).collect()
    }

    #[test]
    fn recompute_folds_actions_in_order() {
        let (by_id, staged) = records(&[TestAction::Add(1), TestAction::Add(2)]);
        let entries = recompute(&reducer(), Some(&10), &by_id, &staged, &[]);

        assert_eq!(states(&entries), vec![Some(10), Some(11), Some(13)]);
        assert!(entries.iter().all(|e| e.error.is_none()));
    }

    #[test]
    fn recompute_without_committed_state_starts_from_none() {
        let (by_id, staged) = records(&[TestAction::Add(4)]);
        let entries = recompute(&reducer(), None, &by_id, &staged, &[]);
        assert_eq!(states(&entries), vec![Some(0), Some(4)]);
    }

    #[test]
    fn skipped_action_repeats_previous_entry() {
        let (by_id, staged) = records(&[TestAction::Add(1), TestAction::Add(2), TestAction::Add(3)]);
        let entries = recompute(&reducer(), Some(&0), &by_id, &staged, &[2]);

        assert_eq!(states(&entries), vec![Some(0), Some(1), Some(1), Some(4)]);
        assert_eq!(entries[2], entries[1]);
    }

    #[test]
    fn error_propagates_without_calling_reducer() {
        let (by_id, staged) = records(&[TestAction::Add(1), TestAction::Boom, TestAction::Add(5)]);
        let entries = recompute(&reducer(), Some(&0), &by_id, &staged, &[]);

        assert_eq!(entries[2].error.as_deref(), Some("boom"));
        assert_eq!(entries[2].state, Some(1));
        assert_eq!(entries[3].error.as_deref(), Some(INTERRUPTED_MESSAGE));
        assert_eq!(entries[3].state, Some(1));
    }

    #[test]
    fn skipping_the_failing_action_clears_the_error() {
        let (by_id, staged) = records(&[TestAction::Add(1), TestAction::Boom, TestAction::Add(5)]);
        let entries = recompute(&reducer(), Some(&0), &by_id, &staged, &[2]);

        assert!(entries.iter().all(|e| e.error.is_none()));
        assert_eq!(entries[3].state, Some(6));
    }

    #[test]
    fn missing_record_becomes_error_entry() {
        let (mut by_id, staged) = records(&[TestAction::Add(1), TestAction::Add(2)]);
        by_id.remove(&1);
        let entries = recompute(&reducer(), Some(&0), &by_id, &staged, &[]);

        assert_eq!(
            entries[1].error.as_deref(),
            Some("Action 1 is missing from the record store")
        );
        assert_eq!(entries[1].state, Some(0));
        assert_eq!(entries[2].error.as_deref(), Some(INTERRUPTED_MESSAGE));
    }

    #[test]
    fn compute_next_entry_keeps_state_on_failure() {
        let record = ActionRecord::new(TestAction::Boom, Utc::now());
        let entry = compute_next_entry(&reducer(), &record, Some(&7), None);
        assert_eq!(entry, ComputedEntry::failed(Some(7), "boom"));
    }
}
