//! Monitor reducers.
//!
//! A monitor derives auxiliary state (typically for an inspector UI) from the
//! same meta-action stream the history machine consumes. Its state is opaque
//! to the engine.

use super::meta::MetaAction;
use crate::core::{Action, State};
use std::fmt;

/// Reducer over monitor state, invoked once for every meta-action.
pub trait MonitorReducer<S: State, A: Action, M: State>: Send + Sync {
    /// Monitor state before any meta-action has been seen.
    fn initial_state(&self) -> M;

    fn reduce(&self, state: M, action: &MetaAction<S, A, M>) -> M;
}

/// Monitor that always holds `()`.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopMonitor;

impl<S: State, A: Action> MonitorReducer<S, A, ()> for NoopMonitor {
    fn initial_state(&self) {}

    fn reduce(&self, _state: (), _action: &MetaAction<S, A, ()>) {}
}

/// Monitor built from an initial value and a closure.
///
/// # Example
///
/// ```rust
/// use rewind::lifted::{FnMonitor, MetaAction, MonitorReducer};
/// use rewind::core::Action;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// struct Tick;
/// impl Action for Tick {
///     fn name(&self) -> &str { "Tick" }
/// }
///
/// // Count every meta-action the history machine handles.
/// let monitor = FnMonitor::new(0_u64, |count: u64, _action: &MetaAction<i64, Tick, u64>| count + 1);
/// let sweep: MetaAction<i64, Tick, u64> = MetaAction::Sweep;
/// assert_eq!(monitor.reduce(0, &sweep), 1);
/// ```
pub struct FnMonitor<M, F> {
    initial: M,
    reducer: F,
}

impl<M, F> FnMonitor<M, F> {
    pub fn new(initial: M, reducer: F) -> Self {
        Self { initial, reducer }
    }
}

impl<S, A, M, F> MonitorReducer<S, A, M> for FnMonitor<M, F>
where
    S: State,
    A: Action,
    M: State,
    F: Fn(M, &MetaAction<S, A, M>) -> M + Send + Sync,
{
    fn initial_state(&self) -> M {
        self.initial.clone()
    }

    fn reduce(&self, state: M, action: &MetaAction<S, A, M>) -> M {
        (self.reducer)(state, action)
    }
}

impl<M: fmt::Debug, F> fmt::Debug for FnMonitor<M, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnMonitor")
            .field("initial", &self.initial)
            .finish_non_exhaustive()
    }
}
