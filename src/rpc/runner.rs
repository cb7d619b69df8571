use axum::async_trait;
use diesel::{prelude::*, r2d2::PoolError, sql_types::Text};
use diesel_dynamic_schema::dynamic_value::{DynamicRow, NamedField};
use serde_json::Value;
use tokio::task::spawn_blocking;

use crate::{
    rpc::value::{Cell, row_to_object},
    state::DbPool,
};

#[derive(Debug, thiserror::Error)]
pub enum ProcedureError {
    #[error("Failed to connect to the database: {0}")]
    Connection(#[from] PoolError),
    #[error("{0}")]
    Query(#[from] diesel::result::Error),
    #[error("procedure call was interrupted: {0}")]
    Interrupted(#[from] tokio::task::JoinError),
}

/// Executes a stored procedure with a single JSON argument.
#[async_trait]
pub trait ProcedureRunner: Send + Sync {
    /// Returns the first row of the first result set as a JSON object, or
    /// `None` if the procedure produced no rows.
    async fn call(
        &self,
        spname: &str,
        payload: String,
    ) -> Result<Option<Value>, ProcedureError>;
}

/// The statement text for a call. The name is used verbatim.
pub fn call_statement(spname: &str) -> String {
    format!("CALL {spname}(?)")
}

pub struct MysqlRunner {
    pool: DbPool,
}

impl MysqlRunner {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProcedureRunner for MysqlRunner {
    async fn call(
        &self,
        spname: &str,
        payload: String,
    ) -> Result<Option<Value>, ProcedureError> {
        let pool = self.pool.clone();
        let statement = call_statement(spname);

        spawn_blocking(move || {
            let mut conn = pool.get()?;

            let rows = diesel::sql_query(statement)
                .bind::<Text, _>(payload)
                .load::<DynamicRow<NamedField<Cell>>>(&mut conn)?;

            Ok(rows.into_iter().next().map(row_to_object))
        })
        .await?
    }
}
