//! Normalizing adapter for the backend's inconsistent list envelopes.
//!
//! List endpoints wrap their items in one of three observed shapes:
//! `data.items`, `data.data`, or `data.data.data` (plus a bare `data`
//! array). Shape-sniffing happens only here; call sites always receive a
//! plain `Vec<T>` or a typed error.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Literal substring the quiz endpoint embeds in an otherwise successful
/// response when a level has no questions. Matched here and nowhere else,
/// so a future structured empty-result only touches this seam.
pub const NO_QUESTIONS_SENTINEL: &str = "لا توجد أسئلة";

#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("Response envelope has no recognized item list")]
    UnrecognizedShape,
    #[error("Decoding items failed: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Pull the item array out of a list envelope, whatever nesting the
/// backend chose for this response.
fn item_array(body: &Value) -> Option<&Value> {
    let data = body.get("data")?;
    if data.is_array() {
        return Some(data);
    }
    if let Some(items) = data.get("items").filter(|v| v.is_array()) {
        return Some(items);
    }
    if let Some(inner) = data.get("data") {
        if inner.is_array() {
            return Some(inner);
        }
        if let Some(deepest) = inner.get("data").filter(|v| v.is_array()) {
            return Some(deepest);
        }
    }
    None
}

/// Decode a list response into typed items.
pub fn decode_list<T: DeserializeOwned>(body: Value) -> Result<Vec<T>, EnvelopeError> {
    let items = item_array(&body).ok_or(EnvelopeError::UnrecognizedShape)?;
    Ok(serde_json::from_value(items.clone())?)
}

/// Decode a single-record response. Same tolerance as [`decode_list`]:
/// the record sits at `data` or `data.data`.
pub fn decode_item<T: DeserializeOwned>(body: Value) -> Result<T, EnvelopeError> {
    let data = body.get("data").ok_or(EnvelopeError::UnrecognizedShape)?;
    let record = if data.is_object() && data.get("data").is_some_and(Value::is_object) {
        data.get("data").unwrap()
    } else {
        data
    };
    if !record.is_object() {
        return Err(EnvelopeError::UnrecognizedShape);
    }
    Ok(serde_json::from_value(record.clone())?)
}

/// The server-provided human message, wherever it was placed.
pub fn message_of(body: &Value) -> Option<String> {
    body.get("message")
        .or_else(|| body.get("data").and_then(|d| d.get("message")))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// True when a success-shaped quiz response actually means "no questions".
pub fn is_empty_quiz(body: &Value) -> bool {
    message_of(body).is_some_and(|m| m.contains(NO_QUESTIONS_SENTINEL))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(serde::Deserialize, Debug, PartialEq)]
    struct Item {
        id: u64,
    }

    #[test]
    fn unwraps_all_observed_shapes() {
        let shapes = [
            json!({"data": [{"id": 1}, {"id": 2}]}),
            json!({"data": {"items": [{"id": 1}, {"id": 2}]}}),
            json!({"data": {"data": [{"id": 1}, {"id": 2}]}}),
            json!({"data": {"data": {"data": [{"id": 1}, {"id": 2}]}}}),
        ];
        for shape in shapes {
            let items: Vec<Item> = decode_list(shape).unwrap();
            assert_eq!(items, vec![Item { id: 1 }, Item { id: 2 }]);
        }
    }

    #[test]
    fn unknown_shape_is_an_error_not_a_panic() {
        let body = json!({"result": [{"id": 1}]});
        let err = decode_list::<Item>(body).unwrap_err();
        assert!(matches!(err, EnvelopeError::UnrecognizedShape));
    }

    #[test]
    fn bad_items_surface_a_decode_error() {
        let body = json!({"data": {"items": [{"id": "not-a-number"}]}});
        let err = decode_list::<Item>(body).unwrap_err();
        assert!(matches!(err, EnvelopeError::Decode(_)));
    }

    #[test]
    fn single_records_unwrap_at_either_depth() {
        let flat = json!({"data": {"id": 7}});
        let nested = json!({"data": {"data": {"id": 7}}});
        assert_eq!(decode_item::<Item>(flat).unwrap(), Item { id: 7 });
        assert_eq!(decode_item::<Item>(nested).unwrap(), Item { id: 7 });
    }

    #[test]
    fn quiz_sentinel_detected_in_both_placements() {
        let top = json!({"success": true, "message": format!("{NO_QUESTIONS_SENTINEL} لهذا المستوى")});
        let nested = json!({"data": {"message": NO_QUESTIONS_SENTINEL}});
        assert!(is_empty_quiz(&top));
        assert!(is_empty_quiz(&nested));
        assert!(!is_empty_quiz(&json!({"message": "ok"})));
    }
}
