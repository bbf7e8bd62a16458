//! The history state machine and the meta-actions it consumes.
//!
//! This module lifts an application reducer into a reducer over
//! [`LiftedState`](crate::core::LiftedState):
//! - `MetaAction`: the closed set of log operations
//! - `HistoryMachine`: handles each meta-action, replaying only when history changed
//! - `MonitorReducer`: auxiliary state observing every meta-action
//! - `HistoryConfig`: tunables such as the max age of the log

mod config;
mod error;
mod machine;
mod meta;
mod monitor;

pub use config::{HistoryConfig, MIN_MAX_AGE};
pub use error::HistoryError;
pub use machine::HistoryMachine;
pub use meta::MetaAction;
pub use monitor::{FnMonitor, MonitorReducer, NoopMonitor};
