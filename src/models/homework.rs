//! Payload returned by the homework status endpoint, and its validation.
//!
//! The endpoint answers with
//! `{"homeworks": [{"homework_name": .., "status": ..}, ..], "current_date": <unix ts>}`.
//! Items are ordered most recently updated first, and only the first one is
//! ever inspected, so the rest are counted but not parsed.

use serde::Deserialize;
use serde_json::Value;

use crate::errors::CycleError;

/// One homework entry. Both fields may be absent or null on the wire;
/// a missing status is rejected later by the translator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TrackedItem {
    #[serde(default)]
    pub homework_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    /// The most recently updated homework, if the window has any.
    pub latest: Option<TrackedItem>,
    /// Number of entries in `homeworks`, including unparsed ones.
    pub homework_count: usize,
    /// Server clock at response time. Becomes the next poll cursor.
    pub current_date: i64,
}

impl StatusReport {
    /// The most recently updated homework, if any.
    pub fn latest(&self) -> Option<&TrackedItem> {
        self.latest.as_ref()
    }
}

/// Check the structure of a raw endpoint payload and extract the report.
///
/// An empty `homeworks` list is valid; deciding what "nothing to report"
/// means is up to the caller.
pub fn validate(payload: &Value) -> Result<StatusReport, CycleError> {
    let obj = payload.as_object().ok_or_else(|| {
        CycleError::MalformedResponse(format!(
            "expected a JSON object, got {}",
            json_type(payload)
        ))
    })?;

    let homeworks = obj
        .get("homeworks")
        .ok_or_else(|| CycleError::MalformedResponse("missing key 'homeworks'".into()))?;
    let current_date = obj
        .get("current_date")
        .ok_or_else(|| CycleError::MalformedResponse("missing key 'current_date'".into()))?;

    let homeworks = homeworks.as_array().ok_or_else(|| {
        CycleError::MalformedResponse(format!(
            "'homeworks' must be an array, got {}",
            json_type(homeworks)
        ))
    })?;
    let current_date = current_date.as_i64().ok_or_else(|| {
        CycleError::MalformedResponse(format!(
            "'current_date' must be an integer, got {}",
            json_type(current_date)
        ))
    })?;

    let latest = homeworks
        .first()
        .map(|item| {
            TrackedItem::deserialize(item)
                .map_err(|e| CycleError::MalformedResponse(format!("homeworks[0]: {}", e)))
        })
        .transpose()?;

    Ok(StatusReport {
        latest,
        homework_count: homeworks.len(),
        current_date,
    })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
