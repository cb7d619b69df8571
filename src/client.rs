//! Decoding of what `/api` returns.
//!
//! A successful call still needs two more looks before its rows can be
//! used. The procedure reports its own outcome in `result.status`, and list
//! fields may carry each row as a JSON-encoded string rather than an
//! object. [`ProcedureResult`] folds both into one [`Result`] and one
//! accessor.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::util_resp::Envelope;

/// The procedure-level status value that marks a failed call.
pub const FAILED: &str = "FAILED";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CallError {
    /// The endpoint itself rejected or failed the call.
    #[error("{0}")]
    Transport(String),
    /// The procedure ran and reported `FAILED`.
    #[error("{0}")]
    Procedure(String),
    #[error("malformed procedure result: {0}")]
    Decode(String),
}

/// The outcome object of a procedure call.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureResult {
    fields: Map<String, Value>,
}

impl ProcedureResult {
    pub fn from_envelope(envelope: Envelope) -> Result<Self, CallError> {
        if !envelope.status {
            return Err(CallError::Transport(envelope.message));
        }
        Self::from_row(envelope.data)
    }

    /// Takes the `result` column of a row, or the row itself if it has no
    /// such column.
    pub fn from_row(row: Value) -> Result<Self, CallError> {
        let Value::Object(mut row) = row else {
            return Err(CallError::Decode(format!(
                "expected a row object, found {}",
                kind(&row)
            )));
        };

        let fields = match row.remove("result") {
            Some(Value::Object(result)) => result,
            Some(Value::String(text)) => match serde_json::from_str(&text) {
                Ok(Value::Object(result)) => result,
                _ => {
                    return Err(CallError::Decode(
                        "`result` is not a JSON object".to_string(),
                    ));
                }
            },
            Some(other) => {
                row.insert("result".to_string(), other);
                row
            }
            None => row,
        };

        let result = Self { fields };
        if result.is_failed() {
            return Err(CallError::Procedure(
                result
                    .message()
                    .unwrap_or("the procedure reported a failure")
                    .to_string(),
            ));
        }
        Ok(result)
    }

    fn is_failed(&self) -> bool {
        self.status()
            .is_some_and(|status| status.eq_ignore_ascii_case(FAILED))
    }

    pub fn status(&self) -> Option<&str> {
        self.fields.get("status").and_then(Value::as_str)
    }

    pub fn message(&self) -> Option<&str> {
        self.fields.get("message").and_then(Value::as_str)
    }

    pub fn raw(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// The rows of a list field. Elements may be objects or JSON-encoded
    /// strings; anything that does not decode as `T` is skipped.
    pub fn list<T: DeserializeOwned>(&self, field: &str) -> Vec<T> {
        let elements = match self.fields.get(field) {
            Some(Value::Array(elements)) => elements.clone(),
            Some(Value::String(text)) => {
                match serde_json::from_str::<Value>(text) {
                    Ok(Value::Array(elements)) => elements,
                    _ => return vec![],
                }
            }
            _ => return vec![],
        };

        elements.into_iter().filter_map(decode_element).collect()
    }

    /// A scalar or object field. Strings holding JSON are parsed when they
    /// do not decode as `T` directly.
    pub fn field<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        let value = self.fields.get(name)?;
        match serde_json::from_value(value.clone()) {
            Ok(t) => Some(t),
            Err(_) => match value {
                Value::String(text) => serde_json::from_str(text).ok(),
                _ => None,
            },
        }
    }

    /// `log_details` holds plain strings, either as an array or as a
    /// JSON-encoded array.
    pub fn log_lines(&self) -> Vec<String> {
        let lines = match self.fields.get("log_details") {
            Some(Value::Array(lines)) => lines.clone(),
            Some(Value::String(text)) => {
                serde_json::from_str::<Vec<Value>>(text).unwrap_or_default()
            }
            _ => vec![],
        };

        lines
            .into_iter()
            .filter_map(|line| match line {
                Value::String(s) => Some(s),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect()
    }
}

fn decode_element<T: DeserializeOwned>(element: Value) -> Option<T> {
    match element {
        Value::String(text) => {
            if text.trim().is_empty() {
                return None;
            }
            match serde_json::from_str(&text) {
                Ok(t) => Some(t),
                Err(e) => {
                    tracing::debug!("skipping undecodable list element: {e}");
                    None
                }
            }
        }
        other => serde_json::from_value(other)
            .inspect_err(|e| {
                tracing::debug!("skipping undecodable list element: {e}")
            })
            .ok(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
