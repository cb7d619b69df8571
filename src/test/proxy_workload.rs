//! Drives `/api` the way the tabulation pages do.

use axum::{
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use super::{FakeMailer, FakeRunner, Reply, allowlisted, server_with, state};
use crate::{
    client::{CallError, ProcedureResult},
    config::create_app,
    model::{Campus, RankingRow},
    procedures::{EventTypeScope, FileScope, Procedure, ProcedureCall},
    standings::medal_table,
    util_resp::Envelope,
};

fn failure(message: &str) -> Value {
    json!({"message": message, "status": false, "data": []})
}

#[tokio::test]
async fn empty_bodies_are_rejected() {
    let runner = FakeRunner::new(Reply::NoRows);
    let server = server_with(runner.clone(), FakeMailer::working());

    for body in ["", "   ", "\n\t"] {
        let response = server.post("/api").text(body).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&failure("Request body is empty"));
    }
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn raw_empty_body() {
    let runner = FakeRunner::new(Reply::NoRows);
    let app = create_app(state(runner, FakeMailer::working()));

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let envelope: Envelope = serde_json::from_slice(&body).unwrap();
    assert_eq!(envelope, Envelope::failure("Request body is empty"));
}

#[tokio::test]
async fn missing_fields() {
    let runner = FakeRunner::new(Reply::NoRows);
    let server = server_with(runner.clone(), FakeMailer::working());

    let response = server.post("/api").json(&json!({})).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&failure("JSON parameter required"));

    for data in [json!(null), json!(""), json!(0), json!(false)] {
        let response = server
            .post("/api")
            .json(&json!({"data": data, "spname": "Select_Files"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&failure("JSON parameter required"));
    }

    let response = server.post("/api").json(&json!({"data": {"x": 1}})).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&failure("Stored procedure name required"));

    let response = server
        .post("/api")
        .json(&json!({"data": {"x": 1}, "spname": ""}))
        .await;
    response.assert_json(&failure("Stored procedure name required"));

    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn malformed_json() {
    let runner = FakeRunner::new(Reply::NoRows);
    let server = server_with(runner.clone(), FakeMailer::working());

    let response = server.post("/api").text("{\"data\": ").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let envelope = response.json::<Envelope>();
    assert!(!envelope.status);
    assert!(!envelope.message.is_empty());
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn one_call_with_verbatim_arguments() {
    let row = json!({"result": {"status": "SUCCESS", "message": "ok"}});
    let runner = FakeRunner::new(Reply::Row(row.clone()));
    let server = server_with(runner.clone(), FakeMailer::working());

    let data = json!({"filename": "UW2024", "event_type": "SPORTS"});
    let response = server
        .post("/api")
        .json(&json!({"data": data, "spname": "Select_Event_By_Type"}))
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({
        "message": "Success",
        "status": true,
        "data": row,
    }));

    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "Select_Event_By_Type");
    assert_eq!(serde_json::from_str::<Value>(&calls[0].1).unwrap(), data);
}

#[tokio::test]
async fn names_are_not_sanitized() {
    let runner = FakeRunner::new(Reply::NoRows);
    let server = server_with(runner.clone(), FakeMailer::working());

    server
        .post("/api")
        .json(&json!({"data": [1, 2], "spname": "weird name;--"}))
        .await
        .assert_status_ok();

    assert_eq!(
        runner.calls(),
        [("weird name;--".to_string(), "[1,2]".to_string())]
    );
}

#[tokio::test]
async fn empty_result_sets() {
    let runner = FakeRunner::new(Reply::NoRows);
    let server = server_with(runner, FakeMailer::working());

    let response = server
        .post("/api")
        .json(&json!({"data": {}, "spname": "Select_Logs"}))
        .await;
    response.assert_status_ok();
    response.assert_json(&json!({
        "message": "Success",
        "status": true,
        "data": null,
    }));
}

#[tokio::test]
async fn execution_errors() {
    let runner = FakeRunner::new(Reply::Fail(
        "PROCEDURE uweek.Nope does not exist".to_string(),
    ));
    let server = server_with(runner.clone(), FakeMailer::working());

    let response = server
        .post("/api")
        .json(&json!({"data": {}, "spname": "Nope"}))
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_json(&failure("PROCEDURE uweek.Nope does not exist"));
    assert_eq!(runner.calls().len(), 1);
}

#[tokio::test]
async fn other_methods_and_paths() {
    let server =
        server_with(FakeRunner::new(Reply::NoRows), FakeMailer::working());

    for path in ["/api", "/api/email", "/", "/api/nope"] {
        for method in [Method::GET, Method::PUT, Method::DELETE, Method::PATCH]
        {
            let response = server.method(method.clone(), path).await;
            response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
            response.assert_json(&failure("Method not allowed"));
        }
    }

    let response = server.post("/api/nope").json(&json!({})).await;
    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_json(&failure("Not found"));
}

#[tokio::test]
async fn allowlist() {
    let runner = FakeRunner::new(Reply::NoRows);
    let server = allowlisted(runner.clone(), &["Select_Files"]);

    let response = server
        .post("/api")
        .json(&json!({"data": {}, "spname": "Update_User"}))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
    response.assert_json(&failure("Stored procedure not allowed"));

    server
        .post("/api")
        .json(&json!({"data": {"data": "ALL"}, "spname": "Select_Files"}))
        .await
        .assert_status_ok();

    assert_eq!(runner.calls().len(), 1);
}

#[tokio::test]
async fn campus_listing_decodes() {
    let runner = FakeRunner::new(Reply::Row(json!({
        "result": {
            "status": "SUCCESS",
            "campus_list": [
                "{\"campus_code\":\"CCMAIN01\",\"campus_name\":\"MAIN\",\"campus_file\":\"UW2024\"}",
                {"campus_code": "CCSIO001", "campus_name": "SIOCON", "campus_file": "UW2024"},
            ]
        }
    })));
    let server = server_with(runner.clone(), FakeMailer::working());

    let call = ProcedureCall::new(
        Procedure::SelectCampusAll,
        &FileScope {
            filename: "UW2024".to_string(),
        },
    )
    .unwrap();
    let envelope = server.post("/api").json(&call).await.json::<Envelope>();

    let result = ProcedureResult::from_envelope(envelope).unwrap();
    let field = Procedure::SelectCampusAll.list_field().unwrap();
    let campuses: Vec<Campus> = result.list(field);
    assert_eq!(
        campuses
            .iter()
            .map(|c| c.campus_code.as_str())
            .collect::<Vec<_>>(),
        ["CCMAIN01", "CCSIO001"]
    );
    assert_eq!(runner.calls()[0].1, r#"{"filename":"UW2024"}"#);
}

#[tokio::test]
async fn procedure_failures_reach_the_caller() {
    let runner = FakeRunner::new(Reply::Row(json!({
        "result": {"status": "FAILED", "message": "Campus already exists"}
    })));
    let server = server_with(runner, FakeMailer::working());

    let response = server
        .post("/api")
        .json(&json!({"data": {"campus_name": "MAIN"}, "spname": "Update_Campus"}))
        .await;
    // executed procedures always come back as a transport success
    response.assert_status_ok();

    let err = ProcedureResult::from_envelope(response.json::<Envelope>())
        .unwrap_err();
    assert_eq!(
        err,
        CallError::Procedure("Campus already exists".to_string())
    );
}

#[tokio::test]
async fn ranking_summary() {
    let runner = FakeRunner::new(Reply::Row(json!({
        "result": {
            "status": "SUCCESS",
            "ranking_lists": [
                {"campus_code": "CC1", "campus_name": "MAIN", "event_type": "SPORTS",
                 "details": {"gold": 1, "silver": 1, "bronze": 0}},
                {"campus_code": "CC2", "campus_name": "DIPOLOG", "event_type": "SPORTS",
                 "details": {"gold": 2, "silver": 0, "bronze": 0}},
            ]
        }
    })));
    let server = server_with(runner, FakeMailer::working());

    let call = ProcedureCall::new(
        Procedure::RankingSummary,
        &EventTypeScope {
            event_type: crate::model::EventType::Sports,
            filename: "UW2024".to_string(),
        },
    )
    .unwrap();
    let envelope = server.post("/api").json(&call).await.json::<Envelope>();
    let rows: Vec<RankingRow> = ProcedureResult::from_envelope(envelope)
        .unwrap()
        .list("ranking_lists");

    let table = medal_table(rows);
    assert_eq!(table[0].row.campus_name, "DIPOLOG");
    assert_eq!(table[1].position, 2);
}
