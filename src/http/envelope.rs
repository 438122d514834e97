use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ClientError;

/// How a list endpoint wraps its rows. Callers know this per endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListShape {
    /// `[ {...}, {...} ]`
    Bare,
    /// `{ "items": [ {...} ], ... }`
    Items,
}

impl std::fmt::Display for ListShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListShape::Bare => write!(f, "bare array"),
            ListShape::Items => write!(f, "items envelope"),
        }
    }
}

pub fn decode_list<T: DeserializeOwned>(value: Value, shape: ListShape) -> Result<Vec<T>, ClientError> {
    let rows = match (shape, value) {
        (ListShape::Bare, Value::Array(rows)) => rows,
        (ListShape::Items, Value::Object(mut map)) => match map.remove("items") {
            Some(Value::Array(rows)) => rows,
            Some(other) => {
                return Err(ClientError::Decode(format!(
                    "`items` must be an array, got {}",
                    json_kind(&other)
                )))
            }
            None => return Err(ClientError::Decode("list envelope has no `items` field".to_string())),
        },
        (shape, other) => {
            return Err(ClientError::Decode(format!(
                "expected {}, got {}",
                shape,
                json_kind(&other)
            )))
        }
    };

    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(ClientError::from))
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_and_enveloped_lists_decode() {
        let bare: Vec<Value> = decode_list(json!([{ "id": 1 }, { "id": 2 }]), ListShape::Bare).unwrap();
        assert_eq!(bare.len(), 2);

        let wrapped: Vec<Value> =
            decode_list(json!({ "items": [{ "id": 1 }], "totalCount": 1 }), ListShape::Items).unwrap();
        assert_eq!(wrapped, vec![json!({ "id": 1 })]);
    }

    #[test]
    fn shape_mismatch_is_a_decode_error() {
        let err = decode_list::<Value>(json!({ "items": [] }), ListShape::Bare).unwrap_err();
        assert_eq!(err.to_string(), "Decode error: expected bare array, got object");

        let err = decode_list::<Value>(json!([]), ListShape::Items).unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));

        let err = decode_list::<Value>(json!({ "data": [] }), ListShape::Items).unwrap_err();
        assert!(err.to_string().contains("no `items` field"));
    }
}
