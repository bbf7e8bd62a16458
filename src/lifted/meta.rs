//! Meta-actions: the closed set of operations on the lifted state.

use crate::core::{Action, ActionId, LiftedState, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Operation dispatched to the history state machine.
///
/// Serializes with a `type` discriminant and the documented fields, e.g.
/// `{"type":"PERFORM_ACTION","action":...,"timestamp":...}` or
/// `{"type":"JUMP_TO_STATE","index":2}`.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(bound = "", tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetaAction<S: State, A: Action, M: State> {
    /// Record and apply an application action.
    PerformAction {
        action: A,
        timestamp: DateTime<Utc>,
    },
    /// Discard the log and return to the reducer's initial state.
    Reset { timestamp: DateTime<Utc> },
    /// Discard the log without keeping its effect.
    Rollback { timestamp: DateTime<Utc> },
    /// Fold the selected state into the baseline and discard the log.
    Commit { timestamp: DateTime<Utc> },
    /// Drop every skipped action from the log.
    Sweep,
    /// Flip whether an action is skipped during replay.
    ToggleAction { id: ActionId },
    /// Move the cursor without touching history.
    JumpToState { index: usize },
    /// Replace the lifted state wholesale.
    ImportState {
        #[serde(rename = "nextLiftedState")]
        next_lifted_state: Box<LiftedState<S, A, M>>,
    },
    /// Initialization signal; forces a full recompute (sent after reducer replacement).
    #[serde(rename = "@@INIT")]
    Init,
    /// Monitor-only action; the log is left untouched.
    Monitor { payload: serde_json::Value },
}

impl<S: State, A: Action, M: State> MetaAction<S, A, M> {
    pub fn perform(action: A) -> Self {
        Self::PerformAction {
            action,
            timestamp: Utc::now(),
        }
    }

    pub fn reset() -> Self {
        Self::Reset {
            timestamp: Utc::now(),
        }
    }

    pub fn rollback() -> Self {
        Self::Rollback {
            timestamp: Utc::now(),
        }
    }

    pub fn commit() -> Self {
        Self::Commit {
            timestamp: Utc::now(),
        }
    }

    pub fn import(next_lifted_state: LiftedState<S, A, M>) -> Self {
        Self::ImportState {
            next_lifted_state: Box::new(next_lifted_state),
        }
    }

    /// Wire name of the meta-action.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PerformAction { .. } => "PERFORM_ACTION",
            Self::Reset { .. } => "RESET",
            Self::Rollback { .. } => "ROLLBACK",
            Self::Commit { .. } => "COMMIT",
            Self::Sweep => "SWEEP",
            Self::ToggleAction { .. } => "TOGGLE_ACTION",
            Self::JumpToState { .. } => "JUMP_TO_STATE",
            Self::ImportState { .. } => "IMPORT_STATE",
            Self::Init => "@@INIT",
            Self::Monitor { .. } => "MONITOR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    struct Add {
        amount: i64,
    }

    impl Action for Add {
        fn name(&self) -> &str {
            "Add"
        }
    }

    type Meta = MetaAction<i64, Add, ()>;

    #[test]
    fn wire_shapes_use_type_discriminant() {
        let jump: Meta = MetaAction::JumpToState { index: 2 };
        assert_eq!(
            serde_json::to_value(&jump).unwrap(),
            json!({"type": "JUMP_TO_STATE", "index": 2})
        );

        let toggle: Meta = MetaAction::ToggleAction { id: 3 };
        assert_eq!(
            serde_json::to_value(&toggle).unwrap(),
            json!({"type": "TOGGLE_ACTION", "id": 3})
        );

        let sweep: Meta = MetaAction::Sweep;
        assert_eq!(serde_json::to_value(&sweep).unwrap(), json!({"type": "SWEEP"}));
    }

    #[test]
    fn perform_action_carries_action_and_timestamp() {
        let perform: Meta = MetaAction::perform(Add { amount: 4 });
        let value = serde_json::to_value(&perform).unwrap();
        assert_eq!(value["type"], "PERFORM_ACTION");
        assert_eq!(value["action"], json!({"amount": 4}));
        assert!(value["timestamp"].is_string());

        let back: Meta = serde_json::from_value(value).unwrap();
        assert_eq!(back, perform);
    }

    #[test]
    fn import_state_uses_next_lifted_state_field() {
        let import: Meta = MetaAction::import(LiftedState::fresh(Some(1), ()));
        let value = serde_json::to_value(&import).unwrap();
        assert_eq!(value["type"], "IMPORT_STATE");
        assert_eq!(value["nextLiftedState"]["stagedActionIds"], json!([0]));
    }

    #[test]
    fn parses_timestamped_resets() {
        let value = json!({"type": "COMMIT", "timestamp": "2024-01-01T00:00:00Z"});
        let commit: Meta = serde_json::from_value(value).unwrap();
        assert_eq!(commit.name(), "COMMIT");
    }
}
