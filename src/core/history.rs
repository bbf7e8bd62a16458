//! The lifted state: an application's state wrapped in its replayable history.
//!
//! The lifted state is a plain value. It is only ever mutated by the history
//! state machine in response to meta-actions; everything here is read-only
//! inspection.

use super::action::{ActionId, ActionRecord, INIT_ACTION_ID};
use super::state::{Action, State};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Result of replaying one staged action.
///
/// `state` is `None` only when no state has been produced yet (no preloaded
/// state and the reducer failed on the very first entry, or an imported
/// history carried no state).
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct ComputedEntry<S: State> {
    pub state: Option<S>,
    pub error: Option<String>,
}

impl<S: State> ComputedEntry<S> {
    pub fn ok(state: S) -> Self {
        Self {
            state: Some(state),
            error: None,
        }
    }

    pub fn failed(state: Option<S>, error: impl Into<String>) -> Self {
        Self {
            state,
            error: Some(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Full history record wrapping an application's state.
///
/// # Invariants
///
/// - `staged_action_ids[0] == 0`, and id 0 always maps to the init record
/// - `actions_by_id` holds every staged id (and may hold swept ones)
/// - `next_action_id` is greater than every id ever assigned
/// - `current_state_index < staged_action_ids.len()`
/// - `computed_states.len() == staged_action_ids.len()`
///
/// Field names serialize in camelCase, matching the meta-action wire format.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(bound = "", rename_all = "camelCase")]
pub struct LiftedState<S: State, A: Action, M: State> {
    pub monitor_state: M,
    pub actions_by_id: BTreeMap<ActionId, ActionRecord<A>>,
    pub next_action_id: ActionId,
    pub staged_action_ids: Vec<ActionId>,
    pub skipped_action_ids: Vec<ActionId>,
    pub committed_state: Option<S>,
    pub current_state_index: usize,
    pub computed_states: Vec<ComputedEntry<S>>,
}

impl<S: State, A: Action, M: State> LiftedState<S, A, M> {
    /// A fresh log holding only the init record, with nothing computed yet.
    pub fn fresh(committed_state: Option<S>, monitor_state: M) -> Self {
        Self {
            monitor_state,
            actions_by_id: initial_record_store(),
            next_action_id: INIT_ACTION_ID + 1,
            staged_action_ids: vec![INIT_ACTION_ID],
            skipped_action_ids: Vec::new(),
            committed_state,
            current_state_index: 0,
            computed_states: Vec::new(),
        }
    }

    /// Entry designated by the cursor, if it has been computed.
    pub fn current_entry(&self) -> Option<&ComputedEntry<S>> {
        self.computed_states.get(self.current_state_index)
    }

    /// State designated by the cursor.
    pub fn current_state(&self) -> Option<&S> {
        self.current_entry().and_then(|entry| entry.state.as_ref())
    }

    /// Whether the cursor follows the newest entry.
    pub fn is_live(&self) -> bool {
        self.current_state_index + 1 >= self.staged_action_ids.len()
    }

    pub fn is_skipped(&self, id: ActionId) -> bool {
        self.skipped_action_ids.contains(&id)
    }

    pub fn is_staged(&self, id: ActionId) -> bool {
        self.staged_action_ids.contains(&id)
    }

    /// Record for the action staged at `index`.
    pub fn staged_record(&self, index: usize) -> Option<&ActionRecord<A>> {
        self.staged_action_ids
            .get(index)
            .and_then(|id| self.actions_by_id.get(id))
    }

    /// Number of staged actions, including init.
    pub fn len(&self) -> usize {
        self.staged_action_ids.len()
    }

    /// True when nothing but the init action is staged.
    pub fn is_empty(&self) -> bool {
        self.staged_action_ids.len() <= 1
    }
}

/// A record store containing only the init record at id 0.
pub(crate) fn initial_record_store<A: Action>() -> BTreeMap<ActionId, ActionRecord<A>> {
    let mut actions_by_id = BTreeMap::new();
    actions_by_id.insert(INIT_ACTION_ID, ActionRecord::init());
    actions_by_id
}
