//! Projection layer and the store it wraps.
//!
//! - `PlainStore`: contract of the store that runs the lifted reducer
//! - `MemoryStore`: in-memory store with subscriptions
//! - `Instrument`: facade exposing plain `dispatch`/`get_state` plus time travel

mod projection;
mod store;

pub use projection::Instrument;
pub use store::{Listener, MemoryStore, PlainStore, SubscriptionId};
