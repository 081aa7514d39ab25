use std::fmt;

use serde::{Deserialize, Serialize};

use crate::RecordId;

/// A single field value as it moves through the row pipeline.
///
/// Values start as raw text, may be coerced to booleans by the normalizer,
/// and end up as internal record references once cross-references resolve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Ref(RecordId),
    Text(String),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_ref_id(&self) -> Option<RecordId> {
        match self {
            Self::Ref(id) => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Ref(id) => write!(f, "{id}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untagged_serialization_keeps_native_types() {
        assert_eq!(
            serde_json::to_string(&FieldValue::Bool(true)).unwrap(),
            "true"
        );
        assert_eq!(
            serde_json::to_string(&FieldValue::Ref(RecordId(7))).unwrap(),
            "7"
        );
        assert_eq!(
            serde_json::to_string(&FieldValue::text("SE")).unwrap(),
            "\"SE\""
        );
    }

    #[test]
    fn untagged_deserialization_round_trips() {
        let value: FieldValue = serde_json::from_str("false").unwrap();
        assert_eq!(value, FieldValue::Bool(false));
        let value: FieldValue = serde_json::from_str("12").unwrap();
        assert_eq!(value, FieldValue::Ref(RecordId(12)));
        let value: FieldValue = serde_json::from_str("\"Main St 1\"").unwrap();
        assert_eq!(value.as_text(), Some("Main St 1"));
    }
}
