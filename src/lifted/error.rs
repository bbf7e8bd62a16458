//! Caller-contract errors for history navigation.

use crate::core::ActionId;
use thiserror::Error;

/// Errors returned when a navigation request does not fit the current log.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HistoryError {
    #[error("State index {index} is out of range (history holds {len} states)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Action {0} is not staged")]
    UnknownActionId(ActionId),

    #[error("The init action cannot be toggled")]
    InitActionPinned,
}
