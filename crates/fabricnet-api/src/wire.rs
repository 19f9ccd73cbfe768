// Lenient scalar decoding for controller documents.
//
// The controller is inconsistent about scalar encoding: numbers arrive as
// numbers or strings, flags as booleans or "true"/"false", and absence is
// spelled either as JSON `null` or as the literal string "null". Everything
// is normalized here so no caller ever compares against "null".

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// The literal string the controller uses for an absent value.
pub const NULL_SENTINEL: &str = "null";

/// Render a scalar as text. JSON `null` and the `"null"` sentinel become `None`;
/// an empty string stays `Some("")`.
pub fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s == NULL_SENTINEL => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// Split a comma-separated port list, dropping blanks.
pub fn split_ports(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

pub(crate) fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?))
}

/// Accepts `true`, `"true"` (any case); everything else, including absence, is `false`.
pub(crate) fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?)
        .is_some_and(|s| s.trim().eq_ignore_ascii_case("true")))
}

/// Numeric field that may be a number, a numeric string, or absent.
pub(crate) fn optional_u16<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?).and_then(|s| s.trim().parse().ok()))
}

/// Comma-separated port names; `None` when absent or the null sentinel.
pub(crate) fn optional_ports<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => Some(items.into_iter().filter_map(scalar_text).collect()),
        other => scalar_text(other).map(|s| split_ports(&s)),
    })
}
