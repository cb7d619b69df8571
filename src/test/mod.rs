//! End-to-end tests against the assembled router, with the database and
//! the SMTP relay replaced by in-memory fakes.

use std::sync::{Arc, Mutex};

use axum::async_trait;
use axum_test::TestServer;
use diesel::result::{DatabaseErrorKind, Error};
use serde_json::Value;

use crate::{
    config::create_app,
    email::{MailError, Mailer, OutgoingEmail},
    permission::ProcedureAllowlist,
    rpc::runner::{ProcedureError, ProcedureRunner},
    state::AppState,
};

mod email_workload;
mod proxy_workload;

#[derive(Clone)]
pub enum Reply {
    Row(Value),
    NoRows,
    Fail(String),
}

/// Records every call and answers each one with the same reply.
pub struct FakeRunner {
    pub calls: Mutex<Vec<(String, String)>>,
    reply: Reply,
}

impl FakeRunner {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(vec![]),
            reply,
        })
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProcedureRunner for FakeRunner {
    async fn call(
        &self,
        spname: &str,
        payload: String,
    ) -> Result<Option<Value>, ProcedureError> {
        self.calls
            .lock()
            .unwrap()
            .push((spname.to_string(), payload));

        match &self.reply {
            Reply::Row(row) => Ok(Some(row.clone())),
            Reply::NoRows => Ok(None),
            Reply::Fail(msg) => Err(ProcedureError::Query(Error::DatabaseError(
                DatabaseErrorKind::Unknown,
                Box::new(msg.clone()),
            ))),
        }
    }
}

pub struct FakeMailer {
    pub sent: Mutex<Vec<OutgoingEmail>>,
    failure: Option<String>,
}

impl FakeMailer {
    pub fn working() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(vec![]),
            failure: None,
        })
    }

    pub fn failing(reason: &str) -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(vec![]),
            failure: Some(reason.to_string()),
        })
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for FakeMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        if let Some(reason) = &self.failure {
            return Err(MailError::Unconfigured(reason.clone()));
        }
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

pub fn state(runner: Arc<FakeRunner>, mailer: Arc<FakeMailer>) -> AppState {
    AppState::new(runner, mailer)
}

pub fn server(state: AppState) -> TestServer {
    TestServer::new(create_app(state)).unwrap()
}

pub fn server_with(
    runner: Arc<FakeRunner>,
    mailer: Arc<FakeMailer>,
) -> TestServer {
    server(state(runner, mailer))
}

pub fn allowlisted(runner: Arc<FakeRunner>, names: &[&str]) -> TestServer {
    server(
        state(runner, FakeMailer::working())
            .allowlist(ProcedureAllowlist::new(names.iter().copied())),
    )
}
