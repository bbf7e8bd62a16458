//! Core data model of the history engine.
//!
//! This module contains the pure values everything else operates on:
//! - State and action traits
//! - Action records and the reserved init action
//! - Reducer handles with failure containment
//! - The lifted state and its computed entries

mod action;
mod history;
mod reducer;
mod state;

pub(crate) use history::initial_record_store;

pub use action::{ActionId, ActionRecord, RecordedAction, INIT_ACTION_ID, INIT_ACTION_TYPE};
pub use history::{ComputedEntry, LiftedState};
pub use reducer::{Reducer, ReducerError};
pub use state::{Action, State};
