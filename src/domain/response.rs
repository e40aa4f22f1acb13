//! Submitted responses and request-body validation.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// A validated submission, ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewResponse {
    /// Simulation cell the response belongs to.
    pub square_id: String,
    /// Free-form user text.
    pub response: String,
}

/// A stored response row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseRecord {
    /// Assigned once on insert; never reused.
    pub id: i64,
    pub square_id: String,
    pub response: String,
}

/// Why a request body was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("No data received")]
    NoData,
    #[error("Missing required fields")]
    MissingFields,
}

#[derive(Debug, Deserialize)]
struct RawPayload {
    #[serde(default)]
    square_id: Option<String>,
    #[serde(default)]
    response: Option<String>,
}

impl NewResponse {
    pub fn new(square_id: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            square_id: square_id.into(),
            response: response.into(),
        }
    }

    /// Validate a raw request body.
    ///
    /// An empty, unparseable, or falsy JSON body (`null`, `false`, `0`, `""`,
    /// `[]`, `{}`) yields [`PayloadError::NoData`]. Anything else must be an
    /// object carrying non-empty string `square_id` and `response` fields,
    /// otherwise [`PayloadError::MissingFields`].
    pub fn from_body(body: &[u8]) -> Result<Self, PayloadError> {
        let value: Value = serde_json::from_slice(body).map_err(|_| PayloadError::NoData)?;
        if !is_truthy(&value) {
            return Err(PayloadError::NoData);
        }
        // Serde would also accept a positional array for the struct.
        if !value.is_object() {
            return Err(PayloadError::MissingFields);
        }

        let raw: RawPayload =
            serde_json::from_value(value).map_err(|_| PayloadError::MissingFields)?;

        match (raw.square_id, raw.response) {
            (Some(square_id), Some(response)) if !square_id.is_empty() && !response.is_empty() => {
                Ok(Self {
                    square_id,
                    response,
                })
            }
            _ => Err(PayloadError::MissingFields),
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}
