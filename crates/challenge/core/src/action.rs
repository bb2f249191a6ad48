//! Action wire format and the typed codec built on top of it.
//!
//! Challenges describe their actions as a Rust enum, one variant per action
//! kind with the payload attached to the variant. The enum derives serde
//! (adjacently tagged as `type`/`payload`) plus strum's `VariantNames` and
//! `IntoStaticStr`; that is enough to make it an [`ActionSet`]:
//!
//! ```
//! use challenge_core::{ActionMetadata, ActionSet};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Clone, Debug, PartialEq, Serialize, Deserialize, strum::VariantNames, strum::IntoStaticStr)]
//! #[serde(tag = "type", content = "payload")]
//! enum FormAction {
//!     #[serde(rename = "t")]
//!     #[strum(serialize = "t")]
//!     SetText(String),
//! }
//!
//! let action = FormAction::SetText("hi".into())
//!     .encode(ActionMetadata::at(12))
//!     .unwrap();
//! assert_eq!(action.kind, "t");
//! assert_eq!(action.timestamp, 12);
//! assert_eq!(FormAction::decode(&action).unwrap(), FormAction::SetText("hi".into()));
//! ```
//!
//! The string-keyed [`Action`] only exists at the boundary: it is what gets
//! logged, streamed to the collector and replayed.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::VariantNames;

use crate::error::ChallengeError;

/// Per-action data handed to handlers alongside the payload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ActionMetadata {
    /// Milliseconds elapsed since the attempt started.
    pub timestamp: u64,
}

impl ActionMetadata {
    pub const fn at(timestamp: u64) -> Self {
        Self { timestamp }
    }
}

/// Wire representation of an action: `{type, timestamp, payload}`.
///
/// This shape is transmitted to the collector and may be replayed there, so
/// it must stay stable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: String,

    /// Elapsed milliseconds since the attempt started (not wall-clock).
    pub timestamp: u64,

    pub payload: Value,
}

impl Action {
    pub fn new(kind: impl Into<String>, timestamp: u64, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            timestamp,
            payload,
        }
    }

    pub fn metadata(&self) -> ActionMetadata {
        ActionMetadata::at(self.timestamp)
    }
}

/// One entry of the append-only action log.
///
/// Serialized as the compact JSON array `[type, timestamp, payload]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionLogEntry(pub String, pub u64, pub Value);

impl ActionLogEntry {
    pub fn kind(&self) -> &str {
        &self.0
    }

    pub fn timestamp(&self) -> u64 {
        self.1
    }

    pub fn payload(&self) -> &Value {
        &self.2
    }

    /// Number of bytes in this entry's JSON encoding.
    pub fn encoded_len(&self) -> Result<usize, serde_json::Error> {
        serde_json::to_vec(self).map(|bytes| bytes.len())
    }

    /// Rebuilds the wire action this entry was recorded from.
    pub fn to_action(&self) -> Action {
        Action::new(self.0.clone(), self.1, self.2.clone())
    }
}

impl From<&Action> for ActionLogEntry {
    fn from(action: &Action) -> Self {
        Self(action.kind.clone(), action.timestamp, action.payload.clone())
    }
}

impl From<Action> for ActionLogEntry {
    fn from(action: Action) -> Self {
        Self(action.kind, action.timestamp, action.payload)
    }
}

/// Typed set of actions a challenge accepts.
///
/// Implemented automatically for any enum that derives `Serialize`,
/// `Deserialize` (with `#[serde(tag = "type", content = "payload")]`),
/// `strum::VariantNames` and `strum::IntoStaticStr`, provided the serde and
/// strum names of every variant agree.
pub trait ActionSet: Serialize + DeserializeOwned + Sized {
    /// Every wire name this set understands.
    fn kinds() -> &'static [&'static str];

    /// Wire name of this action.
    fn kind(&self) -> &'static str;

    /// Stamps the action and produces its wire form.
    fn encode(&self, metadata: ActionMetadata) -> Result<Action, ChallengeError> {
        let kind = self.kind();
        let tagged = serde_json::to_value(self).map_err(|source| ChallengeError::InvalidPayload {
            kind: kind.to_owned(),
            source,
        })?;
        let payload = match tagged {
            Value::Object(mut fields) => fields.remove("payload").unwrap_or(Value::Null),
            _ => Value::Null,
        };
        Ok(Action::new(kind, metadata.timestamp, payload))
    }

    /// Resolves a wire action into a typed one.
    ///
    /// Fails with [`ChallengeError::UnknownActionKind`] when the kind is not part
    /// of this set, and with [`ChallengeError::InvalidPayload`] when the payload
    /// does not match the variant's shape.
    fn decode(action: &Action) -> Result<Self, ChallengeError> {
        if !Self::kinds().contains(&action.kind.as_str()) {
            return Err(ChallengeError::UnknownActionKind {
                kind: action.kind.clone(),
            });
        }

        let mut tagged = serde_json::Map::with_capacity(2);
        tagged.insert("type".to_owned(), Value::String(action.kind.clone()));
        tagged.insert("payload".to_owned(), action.payload.clone());

        serde_json::from_value(Value::Object(tagged)).map_err(|source| {
            ChallengeError::InvalidPayload {
                kind: action.kind.clone(),
                source,
            }
        })
    }
}

impl<T> ActionSet for T
where
    T: Serialize + DeserializeOwned + VariantNames,
    for<'a> &'a T: Into<&'static str>,
{
    fn kinds() -> &'static [&'static str] {
        T::VARIANTS
    }

    fn kind(&self) -> &'static str {
        self.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize, strum::VariantNames, strum::IntoStaticStr)]
    #[serde(tag = "type", content = "payload")]
    enum Sample {
        #[serde(rename = "a")]
        #[strum(serialize = "a")]
        Text(String),
        #[serde(rename = "b")]
        #[strum(serialize = "b")]
        Toggle(bool),
        #[serde(rename = "c")]
        #[strum(serialize = "c")]
        Bump(Value),
    }

    #[test]
    fn encodes_wire_shape() {
        let action = Sample::Text("hello".into())
            .encode(ActionMetadata::at(0))
            .unwrap();

        assert_eq!(
            serde_json::to_value(&action).unwrap(),
            json!({ "type": "a", "timestamp": 0, "payload": "hello" })
        );
    }

    #[test]
    fn decodes_known_kinds() {
        let toggle = Action::new("b", 5, json!(true));
        assert_eq!(Sample::decode(&toggle).unwrap(), Sample::Toggle(true));

        // Opaque payloads accept anything, including null and arrays.
        let bump = Action::new("c", 5, json!([]));
        assert_eq!(Sample::decode(&bump).unwrap(), Sample::Bump(json!([])));
        let bump = Action::new("c", 5, Value::Null);
        assert_eq!(Sample::decode(&bump).unwrap(), Sample::Bump(Value::Null));
    }

    #[test]
    fn rejects_unknown_kind() {
        let action = Action::new("__nonexistent__", 0, Value::Null);
        let error = Sample::decode(&action).unwrap_err();
        assert!(matches!(error, ChallengeError::UnknownActionKind { ref kind } if kind == "__nonexistent__"));
    }

    #[test]
    fn rejects_mismatched_payload() {
        let action = Action::new("b", 0, json!("not a bool"));
        let error = Sample::decode(&action).unwrap_err();
        assert!(matches!(error, ChallengeError::InvalidPayload { ref kind, .. } if kind == "b"));
    }

    #[test]
    fn log_entry_is_a_json_array() {
        let entry = ActionLogEntry::from(Action::new("a", 42, json!("x")));
        assert_eq!(serde_json::to_string(&entry).unwrap(), r#"["a",42,"x"]"#);
        assert_eq!(entry.encoded_len().unwrap(), 12);
        assert_eq!(entry.to_action(), Action::new("a", 42, json!("x")));
    }

    #[test]
    fn kinds_follow_strum_names() {
        assert_eq!(Sample::kinds(), &["a", "b", "c"]);
        assert_eq!(Sample::Toggle(false).kind(), "b");
    }
}
