//! Builder for constructing instruments.

use crate::builder::error::BuildError;
use crate::core::{Action, RecordedAction, Reducer, ReducerError, State};
use crate::instrument::Instrument;
use crate::lifted::{HistoryConfig, HistoryMachine, MonitorReducer, NoopMonitor, MIN_MAX_AGE};
use std::sync::Arc;

/// Builder for constructing instruments with a fluent API.
pub struct InstrumentBuilder<S: State, A: Action, M: State = ()> {
    reducer: Option<Reducer<S, A>>,
    preloaded_state: Option<S>,
    monitor: Arc<dyn MonitorReducer<S, A, M>>,
    config: HistoryConfig,
}

impl<S: State, A: Action> InstrumentBuilder<S, A, ()> {
    /// Create a new builder with no monitor.
    pub fn new() -> Self {
        Self {
            reducer: None,
            preloaded_state: None,
            monitor: Arc::new(NoopMonitor),
            config: HistoryConfig::default(),
        }
    }
}

impl<S: State, A: Action> Default for InstrumentBuilder<S, A, ()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State, A: Action, M: State> InstrumentBuilder<S, A, M> {
    /// Set the application reducer (required).
    pub fn reducer<F>(mut self, reducer: F) -> Self
    where
        F: Fn(Option<&S>, &RecordedAction<A>) -> Result<S, ReducerError> + Send + Sync + 'static,
    {
        self.reducer = Some(Reducer::new(reducer));
        self
    }

    /// Set a reducer that cannot fail (required unless `reducer` is used).
    pub fn infallible_reducer<F>(mut self, reducer: F) -> Self
    where
        F: Fn(Option<&S>, &RecordedAction<A>) -> S + Send + Sync + 'static,
    {
        self.reducer = Some(Reducer::infallible(reducer));
        self
    }

    /// Use an existing reducer handle.
    pub fn with_reducer(mut self, reducer: Reducer<S, A>) -> Self {
        self.reducer = Some(reducer);
        self
    }

    /// State the history starts from; RESET returns here.
    pub fn preloaded_state(mut self, state: S) -> Self {
        self.preloaded_state = Some(state);
        self
    }

    /// Attach a monitor reducer, changing the monitor state type.
    pub fn monitor<N, R>(self, monitor: R) -> InstrumentBuilder<S, A, N>
    where
        N: State,
        R: MonitorReducer<S, A, N> + 'static,
    {
        InstrumentBuilder {
            reducer: self.reducer,
            preloaded_state: self.preloaded_state,
            monitor: Arc::new(monitor),
            config: self.config,
        }
    }

    /// Fold actions into the committed state once more than `max_age` are staged.
    pub fn max_age(mut self, max_age: usize) -> Self {
        self.config.max_age = Some(max_age);
        self
    }

    pub fn config(mut self, config: HistoryConfig) -> Self {
        self.config = config;
        self
    }

    /// Build just the lifted reducer, for hosting in another store.
    pub fn build_machine(self) -> Result<HistoryMachine<S, A, M>, BuildError> {
        let reducer = self.reducer.ok_or(BuildError::MissingReducer)?;

        if let Some(max_age) = self.config.max_age {
            if max_age < MIN_MAX_AGE {
                return Err(BuildError::InvalidMaxAge {
                    max_age,
                    min: MIN_MAX_AGE,
                });
            }
        }

        Ok(HistoryMachine::new(
            reducer,
            self.preloaded_state,
            self.monitor,
            self.config,
        ))
    }

    /// Build an instrument backed by an in-memory store.
    pub fn build(self) -> Result<Instrument<S, A, M>, BuildError> {
        Ok(Instrument::from_machine(self.build_machine()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifted::{FnMonitor, MetaAction};
    use serde::{Deserialize, Serialize};

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum Op {
        Push(String),
    }

    impl Action for Op {
        fn name(&self) -> &str {
            "Push"
        }
    }

    fn push(state: Option<&Vec<String>>, action: &RecordedAction<Op>) -> Vec<String> {
        let mut items = state.cloned().unwrap_or_default();
        if let Some(Op::Push(item)) = action.as_app() {
            items.push(item.clone());
        }
        items
    }

    #[test]
    fn builder_validates_required_fields() {
        let result = InstrumentBuilder::<Vec<String>, Op>::new().build();
        assert!(matches!(result, Err(BuildError::MissingReducer)));
    }

    #[test]
    fn builder_rejects_tiny_max_age() {
        let result = InstrumentBuilder::new()
            .infallible_reducer(push)
            .max_age(1)
            .build_machine();
        assert!(matches!(
            result,
            Err(BuildError::InvalidMaxAge { max_age: 1, min: 2 })
        ));
    }

    #[test]
    fn preloaded_state_seeds_history() {
        let store = InstrumentBuilder::new()
            .infallible_reducer(push)
            .preloaded_state(vec!["seed".to_string()])
            .build()
            .unwrap();

        assert_eq!(store.get_state(), Some(&vec!["seed".to_string()]));
        assert_eq!(
            store.lifted_state().committed_state,
            Some(vec!["seed".to_string()])
        );
    }

    #[test]
    fn monitor_changes_monitor_state_type() {
        let monitor = FnMonitor::new(0_usize, |count: usize, _: &MetaAction<Vec<String>, Op, usize>| {
            count + 1
        });
        let mut store = InstrumentBuilder::new()
            .infallible_reducer(push)
            .monitor(monitor)
            .build()
            .unwrap();

        store.dispatch(Op::Push("a".to_string()));
        // The store's own init signal plus the dispatch.
        assert_eq!(store.lifted_state().monitor_state, 2);
    }

    #[test]
    fn config_sets_max_age() {
        let machine = InstrumentBuilder::new()
            .infallible_reducer(push)
            .config(HistoryConfig::with_max_age(5))
            .build_machine()
            .unwrap();
        assert_eq!(machine.config().max_age, Some(5));
    }
}
