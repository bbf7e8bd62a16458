//! Build errors for instrument construction.

use thiserror::Error;

/// Errors that can occur when building an instrument.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("Reducer not specified. Call .reducer(f) before .build()")]
    MissingReducer,

    #[error("Max age {max_age} is too small, it must be at least {min}")]
    InvalidMaxAge { max_age: usize, min: usize },
}
