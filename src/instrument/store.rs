//! The plain store that holds and dispatches the lifted state.
//!
//! The history engine only supplies the reducer such a store runs. Any store
//! honouring [`PlainStore`] can host it; [`MemoryStore`] is a minimal
//! single-threaded implementation.

use crate::core::{Action, LiftedState, State};
use crate::lifted::{HistoryMachine, MetaAction};
use std::fmt;

/// Callback invoked after every dispatch with the new lifted state.
pub type Listener<S, A, M> = Box<dyn Fn(&LiftedState<S, A, M>) + Send + Sync>;

/// Handle returned by [`PlainStore::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Store contract consumed by the projection layer.
pub trait PlainStore<S: State, A: Action, M: State> {
    /// Run the store's reducer on `action` and notify listeners.
    fn dispatch(&mut self, action: MetaAction<S, A, M>) -> MetaAction<S, A, M>;

    fn get_state(&self) -> &LiftedState<S, A, M>;

    /// The lifted reducer currently installed.
    fn machine(&self) -> &HistoryMachine<S, A, M>;

    fn subscribe(&mut self, listener: Listener<S, A, M>) -> SubscriptionId;

    /// Returns whether the listener was registered.
    fn unsubscribe(&mut self, id: SubscriptionId) -> bool;

    /// Swap the reducer and dispatch the initialization signal.
    fn replace_reducer(&mut self, machine: HistoryMachine<S, A, M>);
}

/// In-memory store driving a [`HistoryMachine`].
pub struct MemoryStore<S: State, A: Action, M: State> {
    machine: HistoryMachine<S, A, M>,
    state: LiftedState<S, A, M>,
    listeners: Vec<(SubscriptionId, Listener<S, A, M>)>,
    next_subscription: u64,
}

impl<S: State, A: Action, M: State> MemoryStore<S, A, M> {
    /// Create a store starting from the machine's initial lifted state.
    ///
    /// The log is computed once, by the initialization signal.
    pub fn new(machine: HistoryMachine<S, A, M>) -> Self {
        let initial = machine.fresh_state();
        Self::with_state(machine, initial)
    }

    /// Create a store from a preloaded lifted state.
    ///
    /// The initialization signal is dispatched immediately, so the preloaded
    /// log is replayed with the machine's reducer.
    pub fn with_state(machine: HistoryMachine<S, A, M>, state: LiftedState<S, A, M>) -> Self {
        let mut store = Self {
            machine,
            state,
            listeners: Vec::new(),
            next_subscription: 0,
        };
        store.machine.apply(&mut store.state, &MetaAction::Init);
        store
    }

    fn notify(&self) {
        for (_, listener) in &self.listeners {
            listener(&self.state);
        }
    }
}

impl<S: State, A: Action, M: State> PlainStore<S, A, M> for MemoryStore<S, A, M> {
    fn dispatch(&mut self, action: MetaAction<S, A, M>) -> MetaAction<S, A, M> {
        self.machine.apply(&mut self.state, &action);
        self.notify();
        action
    }

    fn get_state(&self) -> &LiftedState<S, A, M> {
        &self.state
    }

    fn machine(&self) -> &HistoryMachine<S, A, M> {
        &self.machine
    }

    fn subscribe(&mut self, listener: Listener<S, A, M>) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, listener));
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(registered, _)| *registered != id);
        self.listeners.len() != before
    }

    fn replace_reducer(&mut self, machine: HistoryMachine<S, A, M>) {
        self.machine = machine;
        self.dispatch(MetaAction::Init);
    }
}

impl<S: State, A: Action, M: State> fmt::Debug for MemoryStore<S, A, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore")
            .field("machine", &self.machine)
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{RecordedAction, Reducer};
    use crate::lifted::{HistoryConfig, NoopMonitor};
    use serde::{Deserialize, Serialize};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    struct Add(i64);

    impl Action for Add {
        fn name(&self) -> &str {
            "Add"
        }
    }

    fn adder() -> Reducer<i64, Add> {
        Reducer::infallible(|state: Option<&i64>, action: &RecordedAction<Add>| {
            let current = state.copied().unwrap_or(0);
            match action.as_app() {
                Some(Add(n)) => current + n,
                None => current,
            }
        })
    }

    fn counted_store(calls: Arc<AtomicUsize>) -> MemoryStore<i64, Add, ()> {
        let reducer = Reducer::infallible(move |state: Option<&i64>, _: &RecordedAction<Add>| {
            calls.fetch_add(1, Ordering::SeqCst);
            state.copied().unwrap_or(0)
        });
        MemoryStore::new(HistoryMachine::new(
            reducer,
            None,
            Arc::new(NoopMonitor),
            HistoryConfig::default(),
        ))
    }

    fn store() -> MemoryStore<i64, Add, ()> {
        MemoryStore::new(HistoryMachine::new(
            adder(),
            None,
            Arc::new(NoopMonitor),
            HistoryConfig::default(),
        ))
    }

    #[test]
    fn dispatch_runs_machine_and_returns_action() {
        let mut store = store();
        let returned = store.dispatch(MetaAction::perform(Add(3)));
        assert!(matches!(returned, MetaAction::PerformAction { action: Add(3), .. }));
        assert_eq!(store.get_state().current_state(), Some(&3));
    }

    #[test]
    fn listeners_are_notified_until_unsubscribed() {
        let mut store = store();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let id = store.subscribe(Box::new(move |_: &LiftedState<i64, Add, ()>| {
            seen.fetch_add(1, Ordering::SeqCst);
        }));

        store.dispatch(MetaAction::perform(Add(1)));
        store.dispatch(MetaAction::Sweep);
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.dispatch(MetaAction::perform(Add(1)));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn replace_reducer_replays_history() {
        let mut store = store();
        store.dispatch(MetaAction::perform(Add(2)));
        store.dispatch(MetaAction::perform(Add(3)));

        let tripled = Reducer::infallible(|state: Option<&i64>, action: &RecordedAction<Add>| {
            let current = state.copied().unwrap_or(0);
            match action.as_app() {
                Some(Add(n)) => current + 3 * n,
                None => current,
            }
        });
        let machine = store.machine().with_reducer(tripled);
        store.replace_reducer(machine);

        assert_eq!(store.get_state().current_state(), Some(&15));
    }

    #[test]
    fn new_store_replays_init_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let store = counted_store(Arc::clone(&calls));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.get_state().computed_states.len(), 1);
        assert_eq!(store.get_state().current_state(), Some(&0));
    }

    #[test]
    fn with_state_replays_preloaded_log() {
        let mut preloaded = store().get_state().clone();
        preloaded.committed_state = Some(10);

        let store = MemoryStore::with_state(store().machine().clone(), preloaded);
        assert_eq!(store.get_state().current_state(), Some(&10));
    }
}
