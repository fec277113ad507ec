//! Field deserializers tolerant of the controller's loose JSON typing,
//! where the same field may arrive as a string, a number or `null`.

use serde::de::Error;
use serde::{Deserialize, Deserializer};
use serde_json::{Number, Value};

/// Any scalar as a trimmed string; empty strings and `null` become `None`.
pub(crate) fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// A number or numeric string, kept as sent so integers stay integers;
/// anything else becomes `None`.
pub(crate) fn number<'de, D>(deserializer: D) -> Result<Option<Number>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => Some(n),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// A list or object that may also arrive as `null`.
pub(crate) fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A start number, sent either as an integer or as a decimal string.
pub(crate) fn start_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let parsed = match &value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| D::Error::custom(format!("invalid startNumber: {}", value)))
}

/// The digits of a displayed weight: `"105"` and `"(105)"` give 105,
/// `"-"` and `""` give `None`.
pub(crate) fn weight(display: &str) -> Option<u32> {
    let digits: String = display.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}
