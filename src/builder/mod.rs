//! Builder API for ergonomic instrument construction.
//!
//! This module provides a fluent builder and a macro for declaring
//! application actions with minimal boilerplate.

pub mod error;
pub mod instrument;
pub mod macros;

pub use error::BuildError;
pub use instrument::InstrumentBuilder;
