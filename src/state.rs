use std::sync::Arc;

use axum::extract::FromRef;
use diesel::{
    MysqlConnection,
    r2d2::{ConnectionManager, Pool},
};

use crate::{
    email::Mailer, permission::ProcedureAllowlist, rpc::runner::ProcedureRunner,
};

pub type DbPool = Pool<ConnectionManager<MysqlConnection>>;

/// Builds the shared connection pool.
///
/// No connection is opened here: the pool starts empty and fills on first
/// use, so the server comes up even while the database is unreachable.
pub fn build_pool(database_url: &str, max_size: u32) -> DbPool {
    Pool::builder()
        .max_size(max_size.max(1))
        .min_idle(Some(0))
        .build_unchecked(ConnectionManager::<MysqlConnection>::new(
            database_url,
        ))
}

#[derive(Clone, FromRef)]
pub struct AppState {
    pub runner: Arc<dyn ProcedureRunner>,
    pub mailer: Arc<dyn Mailer>,
    pub allowlist: ProcedureAllowlist,
}

impl AppState {
    pub fn new(
        runner: Arc<dyn ProcedureRunner>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            runner,
            mailer,
            allowlist: ProcedureAllowlist::default(),
        }
    }

    pub fn allowlist(mut self, allowlist: ProcedureAllowlist) -> Self {
        self.allowlist = allowlist;
        self
    }
}
