//! History state machine: the lifted reducer.
//!
//! Consumes meta-actions and produces the next lifted state, deciding whether
//! a full replay is needed or an incremental append suffices.

use super::config::HistoryConfig;
use super::meta::MetaAction;
use super::monitor::MonitorReducer;
use crate::core::{
    initial_record_store, Action, ActionRecord, ComputedEntry, LiftedState, Reducer, State,
    INIT_ACTION_ID,
};
use crate::replay;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// The lifted reducer.
///
/// Wraps an application reducer, the state it starts from and a monitor
/// reducer. All three are fixed for the lifetime of a machine; replacing the
/// application reducer produces a new machine via [`HistoryMachine::with_reducer`].
pub struct HistoryMachine<S: State, A: Action, M: State> {
    reducer: Reducer<S, A>,
    initial_committed_state: Option<S>,
    monitor: Arc<dyn MonitorReducer<S, A, M>>,
    config: HistoryConfig,
}

impl<S: State, A: Action, M: State> HistoryMachine<S, A, M> {
    pub fn new(
        reducer: Reducer<S, A>,
        initial_committed_state: Option<S>,
        monitor: Arc<dyn MonitorReducer<S, A, M>>,
        config: HistoryConfig,
    ) -> Self {
        Self {
            reducer,
            initial_committed_state,
            monitor,
            config,
        }
    }

    pub fn reducer(&self) -> &Reducer<S, A> {
        &self.reducer
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Same machine driving a different application reducer.
    pub fn with_reducer(&self, reducer: Reducer<S, A>) -> Self {
        Self {
            reducer,
            initial_committed_state: self.initial_committed_state.clone(),
            monitor: Arc::clone(&self.monitor),
            config: self.config.clone(),
        }
    }

    /// Lifted state holding only the init action, fully computed.
    pub fn initial_state(&self) -> LiftedState<S, A, M> {
        let mut lifted = self.fresh_state();
        lifted.computed_states = self.recompute(&lifted);
        lifted
    }

    /// Lifted state holding only the init action, not yet computed.
    pub(crate) fn fresh_state(&self) -> LiftedState<S, A, M> {
        LiftedState::fresh(
            self.initial_committed_state.clone(),
            self.monitor.initial_state(),
        )
    }

    /// Pure form of [`HistoryMachine::apply`].
    pub fn reduce(
        &self,
        mut lifted: LiftedState<S, A, M>,
        action: &MetaAction<S, A, M>,
    ) -> LiftedState<S, A, M> {
        self.apply(&mut lifted, action);
        lifted
    }

    /// Handle one meta-action in place, then run the monitor reducer.
    pub fn apply(&self, lifted: &mut LiftedState<S, A, M>, action: &MetaAction<S, A, M>) {
        debug!(
            target: "rewind::history",
            action = action.name(),
            staged = lifted.staged_action_ids.len(),
            cursor = lifted.current_state_index,
            "handling meta-action"
        );

        let should_recompute = match action {
            MetaAction::Reset { .. } => {
                reset_log(lifted, self.initial_committed_state.clone());
                true
            }
            MetaAction::Commit { .. } => {
                let selected = match lifted.current_entry() {
                    Some(entry) => entry.state.clone(),
                    None => lifted.committed_state.clone(),
                };
                reset_log(lifted, selected);
                true
            }
            MetaAction::Rollback { .. } => {
                let committed = lifted.committed_state.take();
                reset_log(lifted, committed);
                true
            }
            MetaAction::ToggleAction { id } => {
                match lifted.skipped_action_ids.iter().position(|skipped| skipped == id) {
                    Some(position) => {
                        lifted.skipped_action_ids.remove(position);
                    }
                    None => lifted.skipped_action_ids.insert(0, *id),
                }
                true
            }
            MetaAction::JumpToState { index } => {
                if *index < lifted.staged_action_ids.len() {
                    lifted.current_state_index = *index;
                } else {
                    warn!(
                        target: "rewind::history",
                        index,
                        len = lifted.staged_action_ids.len(),
                        "ignoring jump past the end of history"
                    );
                }
                false
            }
            MetaAction::Sweep => {
                let skipped = std::mem::take(&mut lifted.skipped_action_ids);
                lifted
                    .staged_action_ids
                    .retain(|id| *id == INIT_ACTION_ID || !skipped.contains(id));
                let last = lifted.staged_action_ids.len().saturating_sub(1);
                lifted.current_state_index = lifted.current_state_index.min(last);
                true
            }
            MetaAction::PerformAction { action, timestamp } => {
                self.perform(lifted, action.clone(), *timestamp);
                false
            }
            MetaAction::ImportState { next_lifted_state } => {
                *lifted = next_lifted_state.as_ref().clone();
                false
            }
            MetaAction::Init => true,
            MetaAction::Monitor { .. } => false,
        };

        if should_recompute {
            lifted.computed_states = self.recompute(lifted);
        }

        lifted.monitor_state = self.monitor.reduce(lifted.monitor_state.clone(), action);
    }

    fn recompute(&self, lifted: &LiftedState<S, A, M>) -> Vec<ComputedEntry<S>> {
        replay::recompute(
            &self.reducer,
            lifted.committed_state.as_ref(),
            &lifted.actions_by_id,
            &lifted.staged_action_ids,
            &lifted.skipped_action_ids,
        )
    }

    /// Append one action, computing only its entry.
    fn perform(&self, lifted: &mut LiftedState<S, A, M>, action: A, timestamp: DateTime<Utc>) {
        if lifted.current_state_index + 1 == lifted.staged_action_ids.len() {
            lifted.current_state_index += 1;
        }

        let id = lifted.next_action_id;
        lifted.next_action_id += 1;

        let record = ActionRecord::new(action, timestamp);
        let entry = match lifted.computed_states.last() {
            Some(previous) => replay::compute_next_entry(
                &self.reducer,
                &record,
                previous.state.as_ref(),
                previous.error.as_deref(),
            ),
            None => replay::compute_next_entry(
                &self.reducer,
                &record,
                lifted.committed_state.as_ref(),
                None,
            ),
        };

        lifted.actions_by_id.insert(id, record);
        lifted.staged_action_ids.push(id);
        lifted.computed_states.push(entry);

        if let Some(max_age) = self.config.max_age {
            let staged = lifted.staged_action_ids.len();
            if staged > max_age {
                commit_excess(lifted, staged - max_age);
            }
        }
    }
}

impl<S: State, A: Action, M: State> Clone for HistoryMachine<S, A, M> {
    fn clone(&self) -> Self {
        self.with_reducer(self.reducer.clone())
    }
}

impl<S: State, A: Action, M: State> fmt::Debug for HistoryMachine<S, A, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryMachine")
            .field("initial_committed_state", &self.initial_committed_state)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Replace the log with one holding only the init action.
fn reset_log<S: State, A: Action, M: State>(
    lifted: &mut LiftedState<S, A, M>,
    committed_state: Option<S>,
) {
    lifted.actions_by_id = initial_record_store();
    lifted.next_action_id = INIT_ACTION_ID + 1;
    lifted.staged_action_ids = vec![INIT_ACTION_ID];
    lifted.skipped_action_ids = Vec::new();
    lifted.committed_state = committed_state;
    lifted.current_state_index = 0;
}

/// Fold up to `excess` of the oldest staged actions into the committed state.
///
/// Stops before the first entry carrying an error.
fn commit_excess<S: State, A: Action, M: State>(lifted: &mut LiftedState<S, A, M>, excess: usize) {
    let mut excess = excess;
    if let Some(index) = (1..=excess).find(|&index| {
        lifted
            .computed_states
            .get(index)
            .map_or(true, ComputedEntry::is_error)
    }) {
        warn!(
            target: "rewind::history",
            index,
            "max age reached but an errored entry stops the commit"
        );
        excess = index - 1;
    }
    if excess == 0 {
        return;
    }

    let folded: Vec<_> = lifted.staged_action_ids.drain(1..=excess).collect();
    for id in &folded {
        lifted.actions_by_id.remove(id);
    }
    lifted.skipped_action_ids.retain(|id| !folded.contains(id));

    lifted.committed_state = lifted
        .computed_states
        .get(excess)
        .and_then(|entry| entry.state.clone());
    lifted.computed_states.drain(..excess);
    lifted.current_state_index = lifted.current_state_index.saturating_sub(excess);

    debug!(
        target: "rewind::history",
        folded = folded.len(),
        staged = lifted.staged_action_ids.len(),
        "committed actions past max age"
    );
}
