//! Checkpoint export and import of lifted states.
//!
//! A checkpoint captures the whole lifted state so that a history can be
//! handed to another instrument (or an inspector) and imported there through
//! the IMPORT_STATE meta-action. Checkpoints live in memory; writing them
//! anywhere is left to the caller.

use crate::core::{Action, LiftedState, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stillwater::validation::Validation;
use uuid::Uuid;

pub mod error;
pub mod validation;

pub use error::CheckpointError;
pub use validation::{validate_lifted_state, violations, ImportViolation};

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Serializable snapshot of a lifted state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Checkpoint<S: State, A: Action, M: State> {
    /// Checkpoint format version
    pub version: u32,

    /// Unique checkpoint identifier
    pub id: String,

    /// When checkpoint was created
    pub timestamp: DateTime<Utc>,

    /// The captured history
    pub lifted_state: LiftedState<S, A, M>,
}

impl<S: State, A: Action, M: State> Checkpoint<S, A, M> {
    /// Capture a lifted state.
    pub fn capture(lifted_state: &LiftedState<S, A, M>) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            lifted_state: lifted_state.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        let checkpoint: Self = serde_json::from_str(json)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.check_version()?;
        Ok(checkpoint)
    }

    /// Compact binary encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let checkpoint: Self = bincode::deserialize(bytes)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.check_version()?;
        Ok(checkpoint)
    }

    /// Check the captured history against every lifted-state invariant.
    pub fn validate(&self) -> Result<(), CheckpointError> {
        match validate_lifted_state(&self.lifted_state) {
            Validation::Success(_) => Ok(()),
            Validation::Failure(errors) => Err(CheckpointError::ValidationFailed(
                errors.iter().cloned().collect(),
            )),
        }
    }

    pub fn into_lifted_state(self) -> LiftedState<S, A, M> {
        self.lifted_state
    }

    fn check_version(&self) -> Result<(), CheckpointError> {
        if self.version == CHECKPOINT_VERSION {
            Ok(())
        } else {
            Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            })
        }
    }
}
