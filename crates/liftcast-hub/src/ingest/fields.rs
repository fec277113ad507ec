//! Flat form-field conventions used by the controller.

use std::str::FromStr;

use liftcast_core::{Decision, ParseError};

use crate::error::IngestError;

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// The platform a payload targets. Required on every event and kept
/// exactly as sent, since displays look platforms up by the same string.
pub(crate) fn platform_name(field: &'static str, value: Option<&str>) -> Result<String, IngestError> {
    value
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or(IngestError::MissingField(field))
}

/// Only the literal `"true"` is true.
pub(crate) fn flag(value: Option<&str>) -> bool {
    value == Some("true")
}

/// Tri-state referee light: absent is unset, `"true"` is good, anything
/// else is bad.
pub(crate) fn referee(value: Option<&str>) -> Option<Decision> {
    match value {
        None | Some("") => None,
        Some("true") => Some(Decision::Good),
        Some(_) => Some(Decision::Bad),
    }
}

/// Parse a wire enum, logging and dropping values this build doesn't know.
pub(crate) fn known<T>(field: &'static str, value: Option<&str>) -> Option<T>
where
    T: FromStr<Err = ParseError>,
{
    match present(value)?.parse() {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!(field, "Ignoring value: {}", e);
            None
        }
    }
}

/// Milliseconds as a decimal string. Negative values clamp to zero.
pub(crate) fn millis(field: &'static str, value: Option<&str>) -> Option<u64> {
    let raw = present(value)?;
    match raw.parse::<f64>() {
        Ok(ms) if ms.is_finite() => Some(ms.max(0.0) as u64),
        _ => {
            tracing::warn!(field, value = raw, "Ignoring malformed duration");
            None
        }
    }
}

/// A free-text field; blank values are absent.
pub(crate) fn text(value: Option<&str>) -> Option<String> {
    present(value).map(str::to_string)
}
