//! Tagged value format used for document bodies
//!
//! Values that plain JSON cannot describe are wrapped in single-key objects:
//!
//! | Tag       | Payload                                   |
//! |-----------|-------------------------------------------|
//! | `@time`   | RFC 3339 timestamp string                 |
//! | `@ref`    | `{"id": "<id>", "coll": {"@mod": "<C>"}}` |
//! | `@int`    | decimal string, 32-bit range              |
//! | `@long`   | decimal string, 64-bit range              |
//! | `@double` | decimal string                            |
//! | `@mod`    | collection name                           |
//! | `@object` | object whose own keys start with `@`      |

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Number, Value, json};

use super::errors::FormatError;
use super::types::Collection;

pub const TIME_TAG: &str = "@time";
pub const REF_TAG: &str = "@ref";
pub const INT_TAG: &str = "@int";
pub const LONG_TAG: &str = "@long";
pub const DOUBLE_TAG: &str = "@double";
pub const MOD_TAG: &str = "@mod";
pub const OBJECT_TAG: &str = "@object";

pub fn encode_time(time: &DateTime<Utc>) -> Value {
    json!({ TIME_TAG: time.to_rfc3339_opts(SecondsFormat::AutoSi, true) })
}

pub fn encode_ref(id: &str, coll: Collection) -> Value {
    json!({ REF_TAG: { "id": id, "coll": { MOD_TAG: coll.name() } } })
}

/// Id of a `@ref` value, if `value` is one
pub fn ref_id(value: &Value) -> Option<&str> {
    value.get(REF_TAG)?.get("id")?.as_str()
}

pub(crate) fn parse_time(field: &str, raw: &str) -> Result<DateTime<Utc>, FormatError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| FormatError::InvalidTime {
            field: field.to_string(),
            reason: e.to_string(),
        })
}

/// Encode a plain JSON value: numbers are tagged, objects with `@` keys escaped
pub fn encode_value(value: Value) -> Value {
    match value {
        Value::Number(n) => encode_number(&n),
        Value::Array(items) => Value::Array(items.into_iter().map(encode_value).collect()),
        Value::Object(map) => {
            let escape = map.keys().any(|k| k.starts_with('@'));
            let encoded: Map<String, Value> = map
                .into_iter()
                .map(|(k, v)| (k, encode_value(v)))
                .collect();
            if escape {
                json!({ OBJECT_TAG: encoded })
            } else {
                Value::Object(encoded)
            }
        }
        other => other,
    }
}

fn encode_number(n: &Number) -> Value {
    if let Some(i) = n.as_i64() {
        if i32::try_from(i).is_ok() {
            json!({ INT_TAG: i.to_string() })
        } else {
            json!({ LONG_TAG: i.to_string() })
        }
    } else if let Some(u) = n.as_u64() {
        // Beyond i64::MAX, only representable as a double
        json!({ DOUBLE_TAG: (u as f64).to_string() })
    } else {
        json!({ DOUBLE_TAG: n.to_string() })
    }
}

/// Decode a tagged value back to plain JSON
///
/// Times decode to RFC 3339 strings and references decode to their id.
pub fn decode_value(value: Value) -> Result<Value, FormatError> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(decode_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::Object(map) => decode_object(map),
        other => Ok(other),
    }
}

fn decode_object(mut map: Map<String, Value>) -> Result<Value, FormatError> {
    let tag = match map.keys().next() {
        Some(key) if map.len() == 1 && key.starts_with('@') => key.clone(),
        _ => return decode_fields(map).map(Value::Object),
    };
    let payload = map.remove(&tag).unwrap_or(Value::Null);

    match tag.as_str() {
        TIME_TAG => {
            let raw = payload_str(&tag, &payload)?;
            let time = parse_time(TIME_TAG, raw)?;
            Ok(Value::String(
                time.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            ))
        }
        REF_TAG => payload
            .get("id")
            .and_then(Value::as_str)
            .map(|id| Value::String(id.to_string()))
            .ok_or_else(|| FormatError::InvalidTag(format!("{REF_TAG} without id"))),
        INT_TAG | LONG_TAG => {
            let raw = payload_str(&tag, &payload)?;
            raw.parse::<i64>()
                .map(Value::from)
                .map_err(|e| FormatError::InvalidTag(format!("{tag} '{raw}': {e}")))
        }
        DOUBLE_TAG => {
            let raw = payload_str(&tag, &payload)?;
            raw.parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| FormatError::InvalidTag(format!("{tag} '{raw}'")))
        }
        MOD_TAG => payload_str(&tag, &payload).map(|s| Value::String(s.to_string())),
        OBJECT_TAG => match payload {
            Value::Object(inner) => decode_fields(inner).map(Value::Object),
            _ => Err(FormatError::InvalidTag(format!("{OBJECT_TAG} payload"))),
        },
        unknown => Err(FormatError::InvalidTag(unknown.to_string())),
    }
}

fn decode_fields(map: Map<String, Value>) -> Result<Map<String, Value>, FormatError> {
    map.into_iter()
        .map(|(k, v)| decode_value(v).map(|v| (k, v)))
        .collect()
}

fn payload_str<'a>(tag: &str, payload: &'a Value) -> Result<&'a str, FormatError> {
    payload
        .as_str()
        .ok_or_else(|| FormatError::InvalidTag(format!("{tag} payload must be a string")))
}
