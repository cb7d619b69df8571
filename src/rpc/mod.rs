//! The generic stored-procedure endpoint.
//!
//! A request names a procedure (`spname`) and carries an arbitrary JSON
//! payload (`data`). The payload is handed to the procedure as its single
//! argument and the first row the procedure produces is sent back inside an
//! [`Envelope`](crate::util_resp::Envelope).

use std::sync::Arc;

use axum::{body::Bytes, extract::State, http::Method};
use serde_json::Value;

use crate::{
    permission::ProcedureAllowlist,
    rpc::runner::ProcedureRunner,
    util_resp::{
        StandardResponse, bad_request, err_not_found, forbidden,
        method_not_allowed, server_error, success,
    },
};

pub mod runner;
pub mod value;

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum RequestError {
    #[error("Request body is empty")]
    EmptyBody,
    #[error("{0}")]
    Malformed(String),
    #[error("JSON parameter required")]
    MissingData,
    #[error("Stored procedure name required")]
    MissingProcedure,
}

/// A validated `{data, spname}` request body.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureRequest {
    pub spname: String,
    pub data: Value,
}

impl ProcedureRequest {
    /// Validates a raw request body. `data` is checked before `spname`, so
    /// an empty object reports the missing payload.
    pub fn parse(body: &[u8]) -> Result<Self, RequestError> {
        let body = std::str::from_utf8(body)
            .map_err(|e| RequestError::Malformed(e.to_string()))?;

        if body.trim().is_empty() {
            return Err(RequestError::EmptyBody);
        }

        let value: Value = serde_json::from_str(body)
            .map_err(|e| RequestError::Malformed(e.to_string()))?;

        let Value::Object(mut fields) = value else {
            return Err(RequestError::MissingData);
        };

        let data = match fields.remove("data") {
            Some(data) if !is_blank(&data) => data,
            _ => return Err(RequestError::MissingData),
        };

        let spname = match fields.remove("spname") {
            Some(Value::String(name)) if !name.is_empty() => name,
            _ => return Err(RequestError::MissingProcedure),
        };

        Ok(Self { spname, data })
    }
}

/// `null`, `false`, `0` and `""` count as no payload at all.
fn is_blank(data: &Value) -> bool {
    match data {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

pub async fn call_procedure(
    State(runner): State<Arc<dyn ProcedureRunner>>,
    State(allowlist): State<ProcedureAllowlist>,
    body: Bytes,
) -> StandardResponse {
    let request = match ProcedureRequest::parse(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::debug!("rejected procedure request: {e}");
            return bad_request(e.to_string());
        }
    };

    if !allowlist.permits(&request.spname) {
        tracing::warn!(spname = %request.spname, "procedure not allowlisted");
        return forbidden("Stored procedure not allowed");
    }

    // serializing a `Value` cannot fail
    let payload = request.data.to_string();

    match runner.call(&request.spname, payload).await {
        Ok(row) => {
            tracing::info!(
                spname = %request.spname,
                has_row = row.is_some(),
                "procedure call succeeded"
            );
            success(row.unwrap_or(Value::Null))
        }
        Err(e) => {
            tracing::error!(spname = %request.spname, "procedure call failed: {e}");
            server_error(e.to_string())
        }
    }
}

pub async fn reject_method() -> StandardResponse {
    method_not_allowed()
}

/// Fallback for paths with no route. Any non-POST request gets the
/// method-not-allowed envelope, whatever the path.
pub async fn unmatched(method: Method) -> StandardResponse {
    if method == Method::POST {
        err_not_found()
    } else {
        method_not_allowed()
    }
}
