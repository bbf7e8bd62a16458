//! Projection layer: a store-shaped facade over the lifted store.
//!
//! Application code dispatches plain actions and reads plain state; the
//! facade lifts every action into PERFORM_ACTION and projects the state the
//! history cursor selects.

use super::store::{Listener, MemoryStore, PlainStore, SubscriptionId};
use crate::checkpoint::{Checkpoint, CheckpointError};
use crate::core::{Action, ActionId, ComputedEntry, LiftedState, Reducer, State, INIT_ACTION_ID};
use crate::lifted::{HistoryError, HistoryMachine, MetaAction};
use std::fmt;
use std::marker::PhantomData;
use tracing::debug;

/// Time-travel instrumented store.
///
/// # Example
///
/// ```rust
/// use rewind::builder::InstrumentBuilder;
/// use rewind::core::{Action, RecordedAction};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum Counter { Increment, Decrement }
///
/// impl Action for Counter {
///     fn name(&self) -> &str {
///         match self {
///             Self::Increment => "Increment",
///             Self::Decrement => "Decrement",
///         }
///     }
/// }
///
/// let mut store = InstrumentBuilder::new()
///     .infallible_reducer(|state: Option<&i64>, action: &RecordedAction<Counter>| {
///         let count = state.copied().unwrap_or(0);
///         match action.as_app() {
///             Some(Counter::Increment) => count + 1,
///             Some(Counter::Decrement) => count - 1,
///             None => count,
///         }
///     })
///     .build()
///     .unwrap();
///
/// store.dispatch(Counter::Increment);
/// store.dispatch(Counter::Increment);
/// assert_eq!(store.get_state(), Some(&2));
///
/// store.jump_to_state(1).unwrap();
/// assert_eq!(store.get_state(), Some(&1));
/// ```
pub struct Instrument<S, A, M = (), P = MemoryStore<S, A, M>>
where
    S: State,
    A: Action,
    M: State,
    P: PlainStore<S, A, M>,
{
    store: P,
    last_defined_state: Option<S>,
    _marker: PhantomData<fn() -> (A, M)>,
}

impl<S: State, A: Action, M: State> Instrument<S, A, M> {
    /// Instrument backed by a [`MemoryStore`] running `machine`.
    pub fn from_machine(machine: HistoryMachine<S, A, M>) -> Self {
        Self::new(MemoryStore::new(machine))
    }
}

impl<S, A, M, P> Instrument<S, A, M, P>
where
    S: State,
    A: Action,
    M: State,
    P: PlainStore<S, A, M>,
{
    /// Wrap an existing lifted store.
    pub fn new(store: P) -> Self {
        let last_defined_state = store.get_state().current_state().cloned();
        Self {
            store,
            last_defined_state,
            _marker: PhantomData,
        }
    }

    /// Record and apply an application action; returns it unchanged.
    pub fn dispatch(&mut self, action: A) -> A {
        self.dispatch_meta(MetaAction::perform(action.clone()));
        action
    }

    /// State selected by the history cursor.
    ///
    /// Never regresses to `None` once a state has been observed: if the
    /// selected entry holds no state, the last defined one is returned.
    pub fn get_state(&self) -> Option<&S> {
        self.store
            .get_state()
            .current_state()
            .or(self.last_defined_state.as_ref())
    }

    /// Entry selected by the history cursor, including any reducer error.
    pub fn current_entry(&self) -> Option<&ComputedEntry<S>> {
        self.store.get_state().current_entry()
    }

    /// Install a new application reducer and replay history through it.
    pub fn replace_reducer(&mut self, reducer: Reducer<S, A>) {
        let machine = self.store.machine().with_reducer(reducer);
        self.store.replace_reducer(machine);
        self.observe();
    }

    pub fn subscribe(&mut self, listener: Listener<S, A, M>) -> SubscriptionId {
        self.store.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    /// Dispatch a meta-action to the lifted store.
    pub fn dispatch_meta(&mut self, action: MetaAction<S, A, M>) -> MetaAction<S, A, M> {
        let action = self.store.dispatch(action);
        self.observe();
        action
    }

    pub fn lifted_state(&self) -> &LiftedState<S, A, M> {
        self.store.get_state()
    }

    pub fn lifted_store(&self) -> &P {
        &self.store
    }

    /// Run `f` with direct access to the lifted store.
    ///
    /// The selected state is observed once `f` returns, so it becomes the
    /// fallback for [`Instrument::get_state`] like any other dispatch.
    pub fn with_lifted_store<R>(&mut self, f: impl FnOnce(&mut P) -> R) -> R {
        let result = f(&mut self.store);
        self.observe();
        result
    }

    pub fn reset(&mut self) {
        self.dispatch_meta(MetaAction::reset());
    }

    pub fn commit(&mut self) {
        self.dispatch_meta(MetaAction::commit());
    }

    pub fn rollback(&mut self) {
        self.dispatch_meta(MetaAction::rollback());
    }

    pub fn sweep(&mut self) {
        self.dispatch_meta(MetaAction::Sweep);
    }

    /// Skip or restore a staged action.
    pub fn toggle_action(&mut self, id: ActionId) -> Result<(), HistoryError> {
        if id == INIT_ACTION_ID {
            return Err(HistoryError::InitActionPinned);
        }
        if !self.lifted_state().is_staged(id) {
            return Err(HistoryError::UnknownActionId(id));
        }
        self.dispatch_meta(MetaAction::ToggleAction { id });
        Ok(())
    }

    /// Move the cursor to the state at `index`.
    pub fn jump_to_state(&mut self, index: usize) -> Result<(), HistoryError> {
        let len = self.lifted_state().staged_action_ids.len();
        if index >= len {
            return Err(HistoryError::IndexOutOfRange { index, len });
        }
        self.dispatch_meta(MetaAction::JumpToState { index });
        Ok(())
    }

    /// Replace the lifted state wholesale, trusting it as already computed.
    pub fn import_state(&mut self, next_lifted_state: LiftedState<S, A, M>) {
        self.dispatch_meta(MetaAction::import(next_lifted_state));
    }

    pub fn export_checkpoint(&self) -> Checkpoint<S, A, M> {
        Checkpoint::capture(self.lifted_state())
    }

    /// Validate a checkpoint, then import its history.
    pub fn import_checkpoint(
        &mut self,
        checkpoint: Checkpoint<S, A, M>,
    ) -> Result<(), CheckpointError> {
        checkpoint.validate()?;
        debug!(
            target: "rewind::instrument",
            checkpoint = %checkpoint.id,
            staged = checkpoint.lifted_state.staged_action_ids.len(),
            "importing checkpoint"
        );
        self.import_state(checkpoint.into_lifted_state());
        Ok(())
    }

    fn observe(&mut self) {
        if let Some(state) = self.store.get_state().current_state() {
            self.last_defined_state = Some(state.clone());
        }
    }
}

impl<S, A, M, P> fmt::Debug for Instrument<S, A, M, P>
where
    S: State,
    A: Action,
    M: State,
    P: PlainStore<S, A, M> + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instrument")
            .field("store", &self.store)
            .field("last_defined_state", &self.last_defined_state)
            .finish()
    }
}
