//! Lenient deserializers for server payloads.
//!
//! farmOS-style servers encode numbers as strings (`"changed": "1555000000"`)
//! and booleans as `0`/`1` or `"0"`/`"1"`. These helpers accept every form.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::Timestamp;

fn value_to_timestamp(value: &Value) -> Option<Timestamp> {
    match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            #[allow(clippy::cast_possible_truncation)]
            number.as_f64().map(|float| float.floor() as i64)
        }),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Required timestamp: number or numeric string.
pub fn timestamp<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_to_timestamp(&value)
        .ok_or_else(|| D::Error::custom(format!("expected a unix timestamp, got {value}")))
}

/// Optional timestamp: `null`, absent, empty string, number or numeric string.
pub fn optional_timestamp<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match &value {
        Value::Null => Ok(None),
        Value::String(text) if text.trim().is_empty() => Ok(None),
        _ => value_to_timestamp(&value)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("expected a unix timestamp, got {value}"))),
    }
}

/// Completion flag: `true`, `1` and `"1"` are set, everything else is unset.
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(flag) => flag,
        Value::Number(number) => number.as_i64() == Some(1),
        Value::String(text) => text.trim() == "1",
        _ => false,
    })
}

/// Identifier that may arrive as a number or a string.
pub fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
        Value::Number(number) => Ok(number.to_string()),
        other => Err(D::Error::custom(format!("expected an id, got {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(deserialize_with = "super::timestamp")]
        changed: i64,
        #[serde(default, deserialize_with = "super::optional_timestamp")]
        maybe: Option<i64>,
        #[serde(default, deserialize_with = "super::flag")]
        done: bool,
        #[serde(deserialize_with = "super::id_string")]
        id: String,
    }

    #[test]
    fn accepts_string_encoded_numbers() {
        let probe: Probe = serde_json::from_value(json!({
            "changed": "1555000000",
            "maybe": "12",
            "done": "1",
            "id": 7
        }))
        .unwrap();
        assert_eq!(probe.changed, 1_555_000_000);
        assert_eq!(probe.maybe, Some(12));
        assert!(probe.done);
        assert_eq!(probe.id, "7");
    }

    #[test]
    fn optional_timestamp_treats_null_and_absent_as_none() {
        let probe: Probe =
            serde_json::from_value(json!({ "changed": 1, "maybe": null, "id": "a" })).unwrap();
        assert_eq!(probe.maybe, None);
        assert!(!probe.done);

        let probe: Probe = serde_json::from_value(json!({ "changed": 1, "id": "a" })).unwrap();
        assert_eq!(probe.maybe, None);
    }

    #[test]
    fn flag_only_accepts_one_as_set() {
        let probe: Probe =
            serde_json::from_value(json!({ "changed": 1, "done": 0, "id": "a" })).unwrap();
        assert!(!probe.done);
        let probe: Probe =
            serde_json::from_value(json!({ "changed": 1, "done": "yes", "id": "a" })).unwrap();
        assert!(!probe.done);
    }

    #[test]
    fn rejects_non_numeric_timestamp() {
        let result = serde_json::from_value::<Probe>(json!({ "changed": "soon", "id": "a" }));
        assert!(result.is_err());
    }
}
