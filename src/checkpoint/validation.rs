//! Structural validation of imported lifted states using Validation.
//!
//! Every invariant is checked and ALL violations are reported together, so a
//! broken export can be diagnosed in a single pass.

use crate::core::{Action, ActionId, LiftedState, State, INIT_ACTION_ID};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// A history invariant broken by an imported lifted state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ImportViolation {
    #[error("History has no staged actions")]
    EmptyHistory,

    #[error("First staged action is {0}, expected the init action")]
    MissingInitAction(ActionId),

    #[error("Record 0 is not the init action")]
    InitRecordMismatch,

    #[error("Staged action {0} has no record")]
    MissingRecord(ActionId),

    #[error("Staged action {0} is out of dispatch order")]
    UnorderedStagedId(ActionId),

    #[error("Next action id {next} does not exceed recorded id {max}")]
    StaleNextActionId { next: ActionId, max: ActionId },

    #[error("Cursor {index} is out of range for {len} staged actions")]
    CursorOutOfRange { index: usize, len: usize },

    #[error("{computed} computed states for {staged} staged actions")]
    ComputedLengthMismatch { computed: usize, staged: usize },
}

type Check = Validation<(), NonEmptyVec<ImportViolation>>;

fn check(holds: bool, violation: impl FnOnce() -> ImportViolation) -> Check {
    if holds {
        Validation::success(())
    } else {
        Validation::fail(violation())
    }
}

/// Check every invariant of a lifted state, accumulating ALL violations.
pub fn validate_lifted_state<S: State, A: Action, M: State>(
    lifted: &LiftedState<S, A, M>,
) -> Validation<(), NonEmptyVec<ImportViolation>> {
    let staged = &lifted.staged_action_ids;
    let mut checks: Vec<Check> = Vec::new();

    match staged.first() {
        None => checks.push(Validation::fail(ImportViolation::EmptyHistory)),
        Some(&first) => checks.push(check(first == INIT_ACTION_ID, || {
            ImportViolation::MissingInitAction(first)
        })),
    }

    let init_ok = lifted
        .actions_by_id
        .get(&INIT_ACTION_ID)
        .is_some_and(|record| record.action.is_init());
    checks.push(check(init_ok, || ImportViolation::InitRecordMismatch));

    for &id in staged {
        checks.push(check(lifted.actions_by_id.contains_key(&id), || {
            ImportViolation::MissingRecord(id)
        }));
    }

    for pair in staged.windows(2) {
        checks.push(check(pair[0] < pair[1], || {
            ImportViolation::UnorderedStagedId(pair[1])
        }));
    }

    if let Some(&max) = lifted.actions_by_id.keys().next_back() {
        checks.push(check(lifted.next_action_id > max, || {
            ImportViolation::StaleNextActionId {
                next: lifted.next_action_id,
                max,
            }
        }));
    }

    checks.push(check(lifted.current_state_index < staged.len(), || {
        ImportViolation::CursorOutOfRange {
            index: lifted.current_state_index,
            len: staged.len(),
        }
    }));

    checks.push(check(lifted.computed_states.len() == staged.len(), || {
        ImportViolation::ComputedLengthMismatch {
            computed: lifted.computed_states.len(),
            staged: staged.len(),
        }
    }));

    Validation::all_vec(checks).map(|_| ())
}

/// Collect the violations of a lifted state into a plain list.
pub fn violations<S: State, A: Action, M: State>(
    lifted: &LiftedState<S, A, M>,
) -> Vec<ImportViolation> {
    match validate_lifted_state(lifted) {
        Validation::Success(_) => Vec::new(),
        Validation::Failure(errors) => errors.iter().cloned().collect(),
    }
}
