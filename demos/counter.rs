//! Counter with Time Travel
//!
//! This example demonstrates the history engine on a small counter.
//!
//! Key concepts:
//! - Every dispatched action is recorded and its state kept
//! - Jumping, skipping and sweeping rewrite what the store exposes
//! - A failing action is contained and shown as an error entry
//! - Checkpoints move a whole history to another store
//!
//! Run with: cargo run --example counter

use rewind::action_enum;
use rewind::builder::InstrumentBuilder;
use rewind::core::{RecordedAction, ReducerError};
use rewind::instrument::Instrument;

action_enum! {
    enum CounterAction {
        Increment,
        Decrement,
        Add(i64),
        Divide(i64),
    }
}

fn counter(state: Option<&i64>, action: &RecordedAction<CounterAction>) -> Result<i64, ReducerError> {
    let count = state.copied().unwrap_or(0);
    match action.as_app() {
        None => Ok(count),
        Some(CounterAction::Increment) => Ok(count + 1),
        Some(CounterAction::Decrement) => Ok(count - 1),
        Some(CounterAction::Add(n)) => Ok(count + n),
        Some(CounterAction::Divide(0)) => Err(ReducerError::rejected("division by zero")),
        Some(CounterAction::Divide(n)) => Ok(count / n),
    }
}

fn print_history(label: &str, store: &Instrument<i64, CounterAction>) {
    let lifted = store.lifted_state();
    println!("\n{label}");
    for (index, entry) in lifted.computed_states.iter().enumerate() {
        let id = lifted.staged_action_ids[index];
        let name = lifted
            .actions_by_id
            .get(&id)
            .map(|record| record.action.name())
            .unwrap_or("?");
        let marker = if index == lifted.current_state_index { ">" } else { " " };
        let skipped = if lifted.is_skipped(id) { " (skipped)" } else { "" };
        match &entry.error {
            Some(error) => println!("{marker} #{id} {name}{skipped}: {:?} [error: {error}]", entry.state),
            None => println!("{marker} #{id} {name}{skipped}: {:?}", entry.state),
        }
    }
    println!("  current state: {:?}", store.get_state());
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("=== Counter with Time Travel ===");

    let mut store = InstrumentBuilder::new().reducer(counter).build()?;

    store.dispatch(CounterAction::Increment);
    store.dispatch(CounterAction::Add(10));
    store.dispatch(CounterAction::Divide(0));
    store.dispatch(CounterAction::Decrement);
    print_history("After four actions (one fails):", &store);

    store.toggle_action(3)?;
    print_history("Skipping the failing divide:", &store);

    store.jump_to_state(1)?;
    print_history("Jumped back to the first increment:", &store);

    store.jump_to_state(4)?;
    store.sweep();
    print_history("Swept skipped actions:", &store);

    let checkpoint = store.export_checkpoint();
    println!("\nExported checkpoint {} ({} bytes as JSON)", checkpoint.id, checkpoint.to_json()?.len());

    store.commit();
    print_history("Committed:", &store);

    let mut replica = InstrumentBuilder::new().reducer(counter).build()?;
    replica.import_checkpoint(checkpoint)?;
    print_history("Replica restored from checkpoint:", &replica);

    Ok(())
}
