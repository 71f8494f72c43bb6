//! Connection source shared by the PostgreSQL repositories.
//!
//! Repositories either borrow a pooled connection per call or run on the
//! open transaction of the unit of work that created them.

use std::sync::Arc;

use activity_core::error::DomainError;
use sqlx::pool::PoolConnection;
use sqlx::{PgConnection, PgPool, Postgres};
use tokio::sync::{Mutex, MutexGuard};
use tracing::error;

pub(crate) type SharedTx = Arc<Mutex<Option<sqlx::Transaction<'static, Postgres>>>>;

#[derive(Clone)]
pub(crate) enum PgExecutor {
    Pool(PgPool),
    Tx(SharedTx),
}

pub(crate) enum PgConn<'a> {
    Pooled(PoolConnection<Postgres>),
    Tx(MutexGuard<'a, Option<sqlx::Transaction<'static, Postgres>>>),
}

impl PgExecutor {
    pub(crate) async fn acquire(&self) -> Result<PgConn<'_>, DomainError> {
        match self {
            PgExecutor::Pool(pool) => pool
                .acquire()
                .await
                .map(PgConn::Pooled)
                .map_err(db_error("acquiring connection")),
            PgExecutor::Tx(tx) => Ok(PgConn::Tx(tx.lock().await)),
        }
    }
}

impl PgConn<'_> {
    pub(crate) fn connection(&mut self) -> Result<&mut PgConnection, DomainError> {
        match self {
            PgConn::Pooled(conn) => Ok(&mut **conn),
            PgConn::Tx(guard) => guard
                .as_mut()
                .map(|tx| &mut **tx)
                .ok_or_else(|| DomainError::InternalError("transaction already finished".into())),
        }
    }
}

pub(crate) fn db_error(context: &'static str) -> impl Fn(sqlx::Error) -> DomainError {
    move |e| {
        error!("Database error {}: {}", context, e);
        DomainError::DatabaseError(e.to_string())
    }
}

pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

pub(crate) fn violates(e: &sqlx::Error, constraint: &str) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.constraint() == Some(constraint))
}
