//! Application reducers.
//!
//! A reducer is a pure function `(state, action) -> state`. The engine calls it
//! during replay and never lets a failure escape: returned errors and panics
//! are both converted into [`ReducerError`] values.

use super::action::RecordedAction;
use super::state::{Action, State};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use thiserror::Error;

/// Failure produced while reducing a single action.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ReducerError {
    /// The reducer returned an error.
    #[error("{0}")]
    Rejected(String),

    /// The reducer panicked.
    #[error("Reducer panicked: {0}")]
    Panicked(String),
}

impl ReducerError {
    /// Convenience constructor for reducers rejecting an action.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }
}

type ReducerFn<S, A> =
    dyn Fn(Option<&S>, &RecordedAction<A>) -> Result<S, ReducerError> + Send + Sync;

/// Shared handle to an application reducer.
///
/// The reducer receives `None` when there is no prior state, which is the
/// case for the synthetic init action unless a preloaded state was given.
///
/// # Example
///
/// ```rust
/// use rewind::core::{Action, RecordedAction, Reducer, ReducerError};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum Op { Add(i64), Fail }
///
/// impl Action for Op {
///     fn name(&self) -> &str {
///         match self {
///             Self::Add(_) => "Add",
///             Self::Fail => "Fail",
///         }
///     }
/// }
///
/// let reducer = Reducer::new(|state: Option<&i64>, action: &RecordedAction<Op>| {
///     let current = state.copied().unwrap_or(0);
///     match action.as_app() {
///         Some(Op::Add(n)) => Ok(current + n),
///         Some(Op::Fail) => Err(ReducerError::rejected("cannot apply Fail")),
///         None => Ok(current),
///     }
/// });
///
/// assert_eq!(reducer.reduce(Some(&1), &RecordedAction::App(Op::Add(2))), Ok(3));
/// assert!(reducer.reduce(None, &RecordedAction::App(Op::Fail)).is_err());
/// ```
pub struct Reducer<S: State, A: Action> {
    inner: Arc<ReducerFn<S, A>>,
}

impl<S: State, A: Action> Reducer<S, A> {
    /// Wrap a reducer function.
    pub fn new<F>(reducer: F) -> Self
    where
        F: Fn(Option<&S>, &RecordedAction<A>) -> Result<S, ReducerError> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(reducer),
        }
    }

    /// Wrap an infallible reducer function.
    pub fn infallible<F>(reducer: F) -> Self
    where
        F: Fn(Option<&S>, &RecordedAction<A>) -> S + Send + Sync + 'static,
    {
        Self::new(move |state, action| Ok(reducer(state, action)))
    }

    /// Apply the reducer, converting a panic into [`ReducerError::Panicked`].
    pub fn reduce(&self, state: Option<&S>, action: &RecordedAction<A>) -> Result<S, ReducerError> {
        panic::catch_unwind(AssertUnwindSafe(|| (self.inner)(state, action)))
            .unwrap_or_else(|payload| Err(ReducerError::Panicked(panic_message(payload.as_ref()))))
    }

    /// Whether two handles wrap the same reducer function.
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<S: State, A: Action> Clone for Reducer<S, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: State, A: Action> fmt::Debug for Reducer<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reducer").finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum TestAction {
        Add(i64),
        Reject,
        Panic,
    }

    impl Action for TestAction {
        fn name(&self) -> &str {
            match self {
                Self::Add(_) => "Add",
                Self::Reject => "Reject",
                Self::Panic => "Panic",
            }
        }
    }

    fn counter() -> Reducer<i64, TestAction> {
        Reducer::new(|state, action| {
            let current = state.copied().unwrap_or_default();
            match action.as_app() {
                Some(TestAction::Add(n)) => Ok(current + n),
                Some(TestAction::Reject) => Err(ReducerError::rejected("rejected")),
                Some(TestAction::Panic) => panic!("reducer exploded"),
                None => Ok(current),
            }
        })
    }

    #[test]
    fn reduce_applies_function() {
        let reducer = counter();
        let next = reducer.reduce(Some(&2), &RecordedAction::App(TestAction::Add(3)));
        assert_eq!(next, Ok(5));
    }

    #[test]
    fn reduce_receives_none_without_prior_state() {
        let reducer = counter();
        assert_eq!(reducer.reduce(None, &RecordedAction::Init), Ok(0));
    }

    #[test]
    fn rejection_is_returned() {
        let reducer = counter();
        let result = reducer.reduce(Some(&0), &RecordedAction::App(TestAction::Reject));
        assert_eq!(result, Err(ReducerError::Rejected("rejected".to_string())));
    }

    #[test]
    fn panic_is_caught() {
        let reducer = counter();
        let result = reducer.reduce(Some(&0), &RecordedAction::App(TestAction::Panic));
        assert_eq!(
            result,
            Err(ReducerError::Panicked("reducer exploded".to_string()))
        );
    }

    #[test]
    fn infallible_wraps_in_ok() {
        let reducer: Reducer<i64, TestAction> = Reducer::infallible(|state, _| state.copied().unwrap_or(41) + 1);
        assert_eq!(reducer.reduce(None, &RecordedAction::Init), Ok(42));
    }

    #[test]
    fn clones_share_the_function() {
        let reducer = counter();
        let cloned = reducer.clone();
        assert!(reducer.same_as(&cloned));
        assert!(!reducer.same_as(&counter()));
    }

    #[test]
    fn error_display_is_message() {
        assert_eq!(ReducerError::rejected("nope").to_string(), "nope");
        assert_eq!(
            ReducerError::Panicked("bad".to_string()).to_string(),
            "Reducer panicked: bad"
        );
    }
}
