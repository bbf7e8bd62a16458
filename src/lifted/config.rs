//! Configuration for the history state machine.

use serde::{Deserialize, Serialize};

/// Smallest accepted `max_age`: the init action plus one live action.
pub const MIN_MAX_AGE: usize = 2;

/// Tunables for the history state machine.
///
/// # Example
///
/// ```rust
/// use rewind::lifted::HistoryConfig;
///
/// let config: HistoryConfig = serde_json::from_str(r#"{"max_age": 50}"#).unwrap();
/// assert_eq!(config.max_age, Some(50));
/// assert_eq!(HistoryConfig::default().max_age, None);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of staged actions (init included). When exceeded, the
    /// oldest actions are folded into the committed state. `None` keeps
    /// everything.
    pub max_age: Option<usize>,
}

impl HistoryConfig {
    pub fn with_max_age(max_age: usize) -> Self {
        Self {
            max_age: Some(max_age),
        }
    }
}
