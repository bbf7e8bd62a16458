//! Traits for application state and application actions.
//!
//! The history engine is generic over the state a reducer produces and the
//! actions it consumes. Both must be plain values: cloneable for replay,
//! comparable for tests, and serializable so a lifted state can be exported
//! and imported.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Marker trait for values held in history: application state and monitor state.
///
/// Implemented automatically for every type with the required bounds, so
/// `i64`, `Vec<String>`, `()` or a user struct deriving serde all qualify.
///
/// # Example
///
/// ```rust
/// use rewind::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// struct Counter {
///     value: i64,
/// }
///
/// fn assert_state<S: State>() {}
/// assert_state::<Counter>();
/// assert_state::<()>();
/// ```
pub trait State:
    Clone + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync
{
}

impl<T> State for T where
    T: Clone + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync
{
}

/// Trait for application actions dispatched through the engine.
///
/// # Required Traits
///
/// - `Clone`: dispatch returns the original action to the caller
/// - `PartialEq`: actions are compared when inspecting the record store
/// - `Debug`: actions are debuggable for diagnostics
/// - `Serialize` + `Deserialize`: actions travel inside exported history
///
/// # Example
///
/// ```rust
/// use rewind::core::Action;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum CounterAction {
///     Increment,
///     Add(i64),
/// }
///
/// impl Action for CounterAction {
///     fn name(&self) -> &str {
///         match self {
///             Self::Increment => "Increment",
///             Self::Add(_) => "Add",
///         }
///     }
/// }
///
/// assert_eq!(CounterAction::Add(3).name(), "Add");
/// ```
pub trait Action:
    Clone + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync
{
    /// Get the action's type name for display/logging.
    fn name(&self) -> &str;
}
