use axum::http::StatusCode;
use serde_json::json;

use super::{FakeMailer, FakeRunner, Reply, server_with};
use crate::email::template::OTP_SUBJECT;

#[tokio::test]
async fn otp_is_delivered() {
    let mailer = FakeMailer::working();
    let server = server_with(FakeRunner::new(Reply::NoRows), mailer.clone());

    let response = server
        .post("/api/email")
        .json(&json!({"email": "juan@jrmsu.edu.ph", "message": "482913"}))
        .await;
    response.assert_status_ok();
    response.assert_json(&json!({"success": "Email sent successfully!"}));

    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "juan@jrmsu.edu.ph");
    assert_eq!(sent[0].subject, OTP_SUBJECT);
    assert!(sent[0].html.contains("482913"));
}

#[tokio::test]
async fn codes_are_escaped() {
    let mailer = FakeMailer::working();
    let server = server_with(FakeRunner::new(Reply::NoRows), mailer.clone());

    server
        .post("/api/email")
        .json(&json!({
            "email": "juan@jrmsu.edu.ph",
            "message": "<script>alert(1)</script>"
        }))
        .await
        .assert_status_ok();

    let html = &mailer.sent()[0].html;
    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;"));
}

#[tokio::test]
async fn missing_fields() {
    let mailer = FakeMailer::working();
    let server = server_with(FakeRunner::new(Reply::NoRows), mailer.clone());

    for body in [
        json!({}),
        json!({"email": "juan@jrmsu.edu.ph"}),
        json!({"message": "482913"}),
        json!({"email": "", "message": "482913"}),
        json!({"email": "juan@jrmsu.edu.ph", "message": ""}),
        json!({"email": null, "message": null}),
    ] {
        let response = server.post("/api/email").json(&body).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({"error": "All fields are required"}));
    }

    let response = server.post("/api/email").text("not json").await;
    response.assert_status(StatusCode::BAD_REQUEST);

    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn relay_failures() {
    let mailer = FakeMailer::failing("535 Authentication failed");
    let server = server_with(FakeRunner::new(Reply::NoRows), mailer);

    let response = server
        .post("/api/email")
        .json(&json!({"email": "juan@jrmsu.edu.ph", "message": 482913}))
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_json(&json!({
        "error": "Failed to send email",
        "details": "535 Authentication failed",
    }));
}
