//! Action records kept in the lifted state's record store.

use super::state::Action;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Identifier assigned to every recorded action.
///
/// Ids are strictly increasing and never reused, even after the action they
/// name has been swept out of the staged list.
pub type ActionId = u64;

/// Id permanently reserved for the synthetic [`RecordedAction::Init`] action.
pub const INIT_ACTION_ID: ActionId = 0;

/// Type name reported for the synthetic initialization action.
pub const INIT_ACTION_TYPE: &str = "@@INIT";

/// An action as seen by the application reducer.
///
/// Every history starts with `Init` at id 0; everything after it is an
/// application action that was dispatched through the engine.
///
/// In human-readable formats an application action serializes as itself and
/// `Init` as `{"type":"@@INIT"}`, so an application action with that exact
/// shape reads back as `Init`.
#[derive(Clone, PartialEq, Debug)]
pub enum RecordedAction<A: Action> {
    /// Synthetic action that seeds every history.
    Init,
    /// An externally dispatched application action.
    App(A),
}

impl<A: Action> RecordedAction<A> {
    /// Type name of the action, `@@INIT` for the synthetic one.
    pub fn name(&self) -> &str {
        match self {
            Self::Init => INIT_ACTION_TYPE,
            Self::App(action) => action.name(),
        }
    }

    /// The application action, if this is not the synthetic init.
    pub fn as_app(&self) -> Option<&A> {
        match self {
            Self::Init => None,
            Self::App(action) => Some(action),
        }
    }

    pub fn is_init(&self) -> bool {
        matches!(self, Self::Init)
    }
}

/// A dispatched action stored verbatim with its capture time.
///
/// Serializes in the PERFORM_ACTION meta-action shape,
/// `{"type":"PERFORM_ACTION","action":...,"timestamp":...}`.
#[derive(Clone, PartialEq, Debug)]
pub struct ActionRecord<A: Action> {
    pub action: RecordedAction<A>,
    pub timestamp: DateTime<Utc>,
}

impl<A: Action> ActionRecord<A> {
    /// Record for the synthetic init action, stamped now.
    pub fn init() -> Self {
        Self {
            action: RecordedAction::Init,
            timestamp: Utc::now(),
        }
    }

    pub fn new(action: A, timestamp: DateTime<Utc>) -> Self {
        Self {
            action: RecordedAction::App(action),
            timestamp,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type")]
enum InitMarker {
    #[serde(rename = "@@INIT")]
    Init,
}

#[derive(Serialize)]
#[serde(untagged)]
enum ReadableActionRef<'a, A> {
    Init(InitMarker),
    App(&'a A),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ReadableAction<A> {
    Init(InitMarker),
    App(A),
}

#[derive(Serialize)]
#[serde(rename = "RecordedAction")]
enum CompactActionRef<'a, A> {
    Init,
    App(&'a A),
}

#[derive(Deserialize)]
#[serde(rename = "RecordedAction")]
enum CompactAction<A> {
    Init,
    App(A),
}

impl<A: Action> Serialize for RecordedAction<A> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        // Untagged shapes need a self-describing format to read back.
        if serializer.is_human_readable() {
            match self {
                Self::Init => ReadableActionRef::<A>::Init(InitMarker::Init).serialize(serializer),
                Self::App(action) => ReadableActionRef::App(action).serialize(serializer),
            }
        } else {
            match self {
                Self::Init => CompactActionRef::<A>::Init.serialize(serializer),
                Self::App(action) => CompactActionRef::App(action).serialize(serializer),
            }
        }
    }
}

impl<'de, A: Action> Deserialize<'de> for RecordedAction<A> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            Ok(match ReadableAction::<A>::deserialize(deserializer)? {
                ReadableAction::Init(InitMarker::Init) => Self::Init,
                ReadableAction::App(action) => Self::App(action),
            })
        } else {
            Ok(match CompactAction::<A>::deserialize(deserializer)? {
                CompactAction::Init => Self::Init,
                CompactAction::App(action) => Self::App(action),
            })
        }
    }
}

#[derive(Serialize, Deserialize)]
enum RecordKind {
    #[serde(rename = "PERFORM_ACTION")]
    PerformAction,
}

#[derive(Serialize)]
struct RecordWireRef<'a, A: Action> {
    #[serde(rename = "type")]
    kind: RecordKind,
    action: &'a RecordedAction<A>,
    timestamp: &'a DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(bound = "")]
struct RecordWire<A: Action> {
    #[serde(rename = "type")]
    kind: RecordKind,
    action: RecordedAction<A>,
    timestamp: DateTime<Utc>,
}

impl<A: Action> Serialize for ActionRecord<A> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        RecordWireRef {
            kind: RecordKind::PerformAction,
            action: &self.action,
            timestamp: &self.timestamp,
        }
        .serialize(serializer)
    }
}

impl<'de, A: Action> Deserialize<'de> for ActionRecord<A> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let RecordWire {
            kind: RecordKind::PerformAction,
            action,
            timestamp,
        } = RecordWire::<A>::deserialize(deserializer)?;
        Ok(Self { action, timestamp })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum TestAction {
        Ping,
    }

    impl Action for TestAction {
        fn name(&self) -> &str {
            "Ping"
        }
    }

    #[test]
    fn init_reports_reserved_type_name() {
        let record: ActionRecord<TestAction> = ActionRecord::init();
        assert!(record.action.is_init());
        assert_eq!(record.action.name(), INIT_ACTION_TYPE);
        assert!(record.action.as_app().is_none());
    }

    #[test]
    fn app_action_delegates_name() {
        let record = ActionRecord::new(TestAction::Ping, Utc::now());
        assert_eq!(record.action.name(), "Ping");
        assert_eq!(record.action.as_app(), Some(&TestAction::Ping));
    }

    #[test]
    fn init_serializes_with_reserved_type() {
        let action: RecordedAction<TestAction> = RecordedAction::Init;
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json, serde_json::json!({"type": "@@INIT"}));

        let back: RecordedAction<TestAction> = serde_json::from_value(json).unwrap();
        assert!(back.is_init());
    }

    #[test]
    fn app_action_serializes_unwrapped() {
        let action = RecordedAction::App(TestAction::Ping);
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json, serde_json::json!("Ping"));
    }

    #[test]
    fn record_reads_as_perform_action() {
        let record = ActionRecord::new(TestAction::Ping, Utc::now());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "PERFORM_ACTION");
        assert_eq!(json["action"], "Ping");

        let back: ActionRecord<TestAction> = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn init_record_carries_init_action() {
        let record: ActionRecord<TestAction> = ActionRecord::init();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "PERFORM_ACTION");
        assert_eq!(json["action"], serde_json::json!({"type": "@@INIT"}));
    }

    #[test]
    fn record_rejects_other_meta_actions() {
        let json = serde_json::json!({
            "type": "RESET",
            "action": "Ping",
            "timestamp": Utc::now(),
        });
        assert!(serde_json::from_value::<ActionRecord<TestAction>>(json).is_err());
    }

    #[test]
    fn binary_encoding_keeps_init_and_app_apart() {
        let records = vec![
            ActionRecord::<TestAction>::init(),
            ActionRecord::new(TestAction::Ping, Utc::now()),
        ];
        let bytes = bincode::serialize(&records).unwrap();
        let back: Vec<ActionRecord<TestAction>> = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, records);
    }
}
