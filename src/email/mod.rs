//! One-time password delivery.

use std::sync::Arc;

use axum::{
    Json, async_trait,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::{Value, json};

pub mod smtp;
pub mod template;

pub use smtp::{SmtpMailer, UnconfiguredMailer};

#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("{0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("{0}")]
    Message(#[from] lettre::error::Error),
    #[error("{0}")]
    Transport(#[from] lettre::transport::smtp::Error),
    #[error("{0}")]
    Unconfigured(String),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError>;
}

#[derive(Deserialize)]
pub struct OtpRequest {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    message: Option<Value>,
}

impl OtpRequest {
    /// Both fields, if present and non-empty. Numeric codes are accepted as
    /// the procedures sometimes hand them out as numbers.
    fn fields(&self) -> Option<(&str, String)> {
        let email = self.email.as_deref().filter(|e| !e.trim().is_empty())?;
        let code = match self.message.as_ref()? {
            Value::String(s) if !s.is_empty() => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        Some((email, code))
    }
}

pub enum EmailResponse {
    Sent,
    MissingFields,
    Failed(String),
}

impl IntoResponse for EmailResponse {
    fn into_response(self) -> Response {
        match self {
            EmailResponse::Sent => (
                StatusCode::OK,
                Json(json!({"success": "Email sent successfully!"})),
            )
                .into_response(),
            EmailResponse::MissingFields => (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "All fields are required"})),
            )
                .into_response(),
            EmailResponse::Failed(details) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Failed to send email",
                    "details": details,
                })),
            )
                .into_response(),
        }
    }
}

pub async fn send_otp_email(
    State(mailer): State<Arc<dyn Mailer>>,
    body: Bytes,
) -> EmailResponse {
    let Ok(request) = serde_json::from_slice::<OtpRequest>(&body) else {
        return EmailResponse::MissingFields;
    };
    let Some((to, code)) = request.fields() else {
        return EmailResponse::MissingFields;
    };

    let email = OutgoingEmail {
        to: to.to_string(),
        subject: template::OTP_SUBJECT.to_string(),
        html: template::render_otp_email(&code),
    };

    match mailer.send(email).await {
        Ok(()) => {
            tracing::info!(recipient = %to, "sent otp email");
            EmailResponse::Sent
        }
        Err(e) => {
            tracing::error!(recipient = %to, "failed to send otp email: {e}");
            EmailResponse::Failed(e.to_string())
        }
    }
}
