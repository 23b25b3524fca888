//! Request parameter mapping.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{Result, SealError};

/// Ordered mapping of parameter name to JSON value.
///
/// Insertion order is kept: it is the member order of the encrypted
/// payload. Null values stay in the payload but never reach the signed
/// string.
///
/// # Example
///
/// ```
/// use sealkit_lib::RequestParameters;
///
/// let mut params = RequestParameters::new();
/// params.insert("answerResult", &1)?;
/// params.insert("channelId", "APP")?;
/// assert_eq!(params.len(), 2);
/// # Ok::<(), sealkit_lib::SealError>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RequestParameters(Map<String, Value>);

impl RequestParameters {
    /// Create an empty parameter map.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build parameters from any value that serializes to a JSON object.
    ///
    /// # Errors
    ///
    /// Returns `SealError::Serialization` when the value cannot be encoded
    /// or does not encode to an object.
    pub fn from_serializable<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        match serde_json::to_value(value)? {
            Value::Object(map) => Ok(Self(map)),
            other => Err(SealError::Serialization(format!(
                "request parameters must be a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Insert a value, replacing any previous value in place.
    ///
    /// # Errors
    ///
    /// Returns `SealError::Serialization` when the value cannot be encoded.
    pub fn insert<T: Serialize + ?Sized>(&mut self, key: impl Into<String>, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.0.insert(key.into(), value);
        Ok(())
    }

    /// Insert an already-encoded JSON value.
    pub fn insert_value(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    /// Look up a value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Number of entries, nulls included.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for RequestParameters {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for RequestParameters {
    type Error = SealError;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_serializable(&value)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_insertion_order_is_kept() {
        let mut params = RequestParameters::new();
        params.insert("zeta", "1").unwrap();
        params.insert("alpha", "2").unwrap();
        params.insert("mid", &3).unwrap();

        let keys: Vec<&str> = params.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_overwrite_keeps_position() {
        let mut params = RequestParameters::new();
        params.insert("a", "1").unwrap();
        params.insert("b", "2").unwrap();
        params.insert("a", "3").unwrap();

        let entries: Vec<(&str, &Value)> = params.iter().map(|(k, v)| (k.as_str(), v)).collect();
        assert_eq!(entries, vec![("a", &json!("3")), ("b", &json!("2"))]);
    }

    #[test]
    fn test_from_serializable_struct() {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Payload {
            answer_result: u8,
            channel_id: &'static str,
        }

        let params = RequestParameters::from_serializable(&Payload {
            answer_result: 1,
            channel_id: "APP",
        })
        .unwrap();
        assert_eq!(params.get("answerResult"), Some(&json!(1)));
        assert_eq!(params.get("channelId"), Some(&json!("APP")));
    }

    #[test]
    fn test_non_object_rejected() {
        let err = RequestParameters::from_serializable(&vec![1, 2]).unwrap_err();
        assert!(matches!(err, SealError::Serialization(_)));
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_unserializable_value_rejected() {
        // JSON object keys must be strings.
        let mut bad = HashMap::new();
        bad.insert((1u8, 2u8), "pair");

        let mut params = RequestParameters::new();
        let err = params.insert("bad", &bad).unwrap_err();
        assert!(matches!(err, SealError::Serialization(_)));
        assert!(params.is_empty());
    }
}
