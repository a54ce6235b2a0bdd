use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic type of an entity field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Integer,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Text => f.write_str("text"),
            FieldType::Integer => f.write_str("integer"),
        }
    }
}

/// A single field value of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Text(String),
}

impl FieldValue {
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValue::Int(_) => FieldType::Integer,
            FieldValue::Text(_) => FieldType::Text,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(value) => Some(*value),
            FieldValue::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(value) => Some(value.as_str()),
            FieldValue::Int(_) => None,
        }
    }

    /// Parse a raw cell into a value of the given type.
    pub fn parse(raw: &str, field_type: FieldType) -> Option<FieldValue> {
        match field_type {
            FieldType::Text => Some(FieldValue::Text(raw.to_string())),
            FieldType::Integer => raw.trim().parse::<i64>().ok().map(FieldValue::Int),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(value) => write!(f, "{value}"),
            FieldValue::Text(value) => f.write_str(value),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_respects_field_type() {
        assert_eq!(
            FieldValue::parse("42", FieldType::Integer),
            Some(FieldValue::Int(42))
        );
        assert_eq!(
            FieldValue::parse("42", FieldType::Text),
            Some(FieldValue::Text("42".to_string()))
        );
        assert_eq!(FieldValue::parse("hull_1", FieldType::Integer), None);
    }

    #[test]
    fn untagged_serialization_keeps_plain_values() {
        let values = vec![FieldValue::from("ship_7"), FieldValue::from(30_i64)];
        let json = serde_json::to_string(&values).expect("serialize");
        assert_eq!(json, r#"["ship_7",30]"#);
    }
}
