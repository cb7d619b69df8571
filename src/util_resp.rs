use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The `{message, status, data}` wrapper around every `/api` response.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Envelope {
    pub message: String,
    pub status: bool,
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: false,
            data: Value::Array(vec![]),
        }
    }
}

pub const METHOD_NOT_ALLOWED: &str = "Method not allowed";
pub const NOT_FOUND: &str = "Not found";

pub fn success(data: Value) -> StandardResponse {
    Ok(SuccessResponse::Success(data))
}

pub fn bad_request(msg: impl Into<String>) -> StandardResponse {
    Err(FailureResponse::BadRequest(msg.into()))
}

pub fn forbidden(msg: impl Into<String>) -> StandardResponse {
    Err(FailureResponse::Forbidden(msg.into()))
}

pub fn server_error(msg: impl Into<String>) -> StandardResponse {
    Err(FailureResponse::ServerError(msg.into()))
}

pub fn err_not_found() -> StandardResponse {
    Err(FailureResponse::NotFound)
}

pub fn method_not_allowed() -> StandardResponse {
    Err(FailureResponse::MethodNotAllowed)
}

pub type StandardResponse = Result<SuccessResponse, FailureResponse>;

#[derive(Debug)]
pub enum SuccessResponse {
    Success(Value),
}

#[derive(Debug)]
pub enum FailureResponse {
    BadRequest(String),
    Forbidden(String),
    NotFound,
    MethodNotAllowed,
    ServerError(String),
}

impl FailureResponse {
    pub fn status(&self) -> StatusCode {
        match self {
            FailureResponse::BadRequest(_) => StatusCode::BAD_REQUEST,
            FailureResponse::Forbidden(_) => StatusCode::FORBIDDEN,
            FailureResponse::NotFound => StatusCode::NOT_FOUND,
            FailureResponse::MethodNotAllowed => {
                StatusCode::METHOD_NOT_ALLOWED
            }
            FailureResponse::ServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn into_envelope(self) -> Envelope {
        Envelope::failure(match self {
            FailureResponse::BadRequest(msg)
            | FailureResponse::Forbidden(msg)
            | FailureResponse::ServerError(msg) => msg,
            FailureResponse::NotFound => NOT_FOUND.to_string(),
            FailureResponse::MethodNotAllowed => METHOD_NOT_ALLOWED.to_string(),
        })
    }
}

impl IntoResponse for SuccessResponse {
    fn into_response(self) -> Response {
        match self {
            SuccessResponse::Success(data) => (
                StatusCode::OK,
                Json(Envelope {
                    message: "Success".to_string(),
                    status: true,
                    data,
                }),
            )
                .into_response(),
        }
    }
}

impl IntoResponse for FailureResponse {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(self.into_envelope())).into_response()
    }
}
