//! Rewind: a time-travel history engine for pure reducers
//!
//! Rewind lifts an application reducer `(state, action) -> state` into a
//! reducer over its whole history. Every dispatched action is recorded, the
//! state after each one is kept, and the log itself can be rewound, skipped,
//! replayed, committed or imported while a single "current" state is exposed.
//!
//! # Core Concepts
//!
//! - **Lifted state**: the action log, computed states and history cursor
//! - **Replay**: deterministic recomputation of states, with reducer failures
//!   contained and propagated forward instead of crashing the host
//! - **Meta-actions**: RESET, COMMIT, ROLLBACK, TOGGLE_ACTION, JUMP_TO_STATE,
//!   SWEEP, PERFORM_ACTION and IMPORT_STATE
//! - **Instrument**: store facade that dispatches plain actions and projects
//!   the selected state
//!
//! # Example
//!
//! ```rust
//! use rewind::action_enum;
//! use rewind::builder::InstrumentBuilder;
//! use rewind::core::RecordedAction;
//!
//! action_enum! {
//!     enum Counter {
//!         Increment,
//!         Add(i64),
//!     }
//! }
//!
//! let mut store = InstrumentBuilder::new()
//!     .infallible_reducer(|state: Option<&i64>, action: &RecordedAction<Counter>| {
//!         let count = state.copied().unwrap_or(0);
//!         match action.as_app() {
//!             Some(Counter::Increment) => count + 1,
//!             Some(Counter::Add(n)) => count + n,
//!             None => count,
//!         }
//!     })
//!     .build()
//!     .unwrap();
//!
//! store.dispatch(Counter::Increment);
//! store.dispatch(Counter::Add(10));
//! assert_eq!(store.get_state(), Some(&11));
//!
//! // Skip the first action: history is replayed without it.
//! store.toggle_action(1).unwrap();
//! assert_eq!(store.get_state(), Some(&10));
//!
//! // Fold the current state into the baseline.
//! store.commit();
//! assert_eq!(store.lifted_state().staged_action_ids, vec![0]);
//! assert_eq!(store.get_state(), Some(&10));
//! ```

pub mod builder;
pub mod checkpoint;
pub mod core;
pub mod instrument;
pub mod lifted;
pub mod replay;

// Re-export commonly used types
pub use builder::{BuildError, InstrumentBuilder};
pub use checkpoint::{Checkpoint, CheckpointError};
pub use core::{
    Action, ActionId, ComputedEntry, LiftedState, RecordedAction, Reducer, ReducerError, State,
};
pub use instrument::{Instrument, MemoryStore, PlainStore};
pub use lifted::{HistoryConfig, HistoryError, HistoryMachine, MetaAction, MonitorReducer};
