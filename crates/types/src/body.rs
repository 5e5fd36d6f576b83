//! Typed key-value payload carried by events and requests.
//!
//! A closed value enum instead of a map of `Any`: handlers read fields
//! through typed accessors that return `Option` rather than downcasting.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single payload value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BodyValue {
    Str(String),
    Int(i64),
    Bool(bool),
}

impl From<&str> for BodyValue {
    fn from(v: &str) -> Self {
        BodyValue::Str(v.to_owned())
    }
}

impl From<String> for BodyValue {
    fn from(v: String) -> Self {
        BodyValue::Str(v)
    }
}

impl From<i64> for BodyValue {
    fn from(v: i64) -> Self {
        BodyValue::Int(v)
    }
}

impl From<bool> for BodyValue {
    fn from(v: bool) -> Self {
        BodyValue::Bool(v)
    }
}

/// String-keyed open payload for handler-specific data.
///
/// Insertion order is preserved so logs and serialized scenarios stay
/// stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Body {
    fields: IndexMap<String, BodyValue>,
}

impl Body {
    /// Create an empty payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a field.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<BodyValue>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Get a field.
    pub fn get(&self, key: &str) -> Option<&BodyValue> {
        self.fields.get(key)
    }

    /// Get a string field.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.fields.get(key) {
            Some(BodyValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// Get an integer field.
    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.fields.get(key) {
            Some(BodyValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    /// Get a boolean field.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.fields.get(key) {
            Some(BodyValue::Bool(v)) => Some(*v),
            _ => None,
        }
    }

    /// Remove a field.
    pub fn delete(&mut self, key: &str) -> Option<BodyValue> {
        self.fields.shift_remove(key)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_accessors() {
        let mut body = Body::new();
        body.set("order_id", "order-1");
        body.set("amount", 250i64);
        body.set("express", true);

        assert_eq!(body.get_str("order_id"), Some("order-1"));
        assert_eq!(body.get_int("amount"), Some(250));
        assert_eq!(body.get_bool("express"), Some(true));

        // wrong type reads as absent
        assert_eq!(body.get_int("order_id"), None);
        assert_eq!(body.get_str("missing"), None);
    }

    #[test]
    fn test_delete() {
        let mut body = Body::new();
        body.set("k", 1i64);
        assert_eq!(body.delete("k"), Some(BodyValue::Int(1)));
        assert!(body.is_empty());
    }

    #[test]
    fn test_body_json_roundtrip() {
        let mut body = Body::new();
        body.set("customer_id", "customer-123");
        body.set("points", 40i64);

        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"customer_id":"customer-123","points":40}"#);
        let back: Body = serde_json::from_str(&json).unwrap();
        assert_eq!(back, body);
    }
}
