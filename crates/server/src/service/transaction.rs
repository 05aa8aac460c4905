use futures_util::future::BoxFuture;
use sea_orm::{DatabaseConnection, DatabaseTransaction, DbErr, SqlErr, TransactionTrait};
use tokio::time::timeout;
use tracing::{error, warn};

use super::error::{Result, ServiceError};
use crate::config::TransactionSettings;

/// Runs a unit of work in one database transaction with a bounded wait for
/// `begin` and a bounded execution time.
///
/// Order values are read-then-written without locking; the unique indexes
/// reject a duplicate taken by a concurrent writer and the whole body is
/// retried in a fresh transaction.
#[derive(Clone)]
pub struct TransactionRunner {
    db: DatabaseConnection,
    settings: TransactionSettings,
}

impl TransactionRunner {
    pub fn new(db: DatabaseConnection, settings: TransactionSettings) -> Self {
        Self { db, settings }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    pub async fn run<T, F>(&self, op: F) -> Result<T>
    where
        T: Send,
        F: for<'c> Fn(&'c DatabaseTransaction) -> BoxFuture<'c, Result<T>> + Send + Sync,
    {
        let max_attempts = self.settings.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let txn = match timeout(self.settings.acquire_timeout(), self.db.begin()).await {
                Ok(txn) => txn?,
                Err(_) => {
                    error!(
                        timeout_ms = self.settings.acquire_timeout_ms,
                        "timed out waiting to begin transaction"
                    );
                    return Err(ServiceError::Timeout);
                }
            };

            let outcome = timeout(self.settings.execution_timeout(), op(&txn)).await;
            match outcome {
                Ok(Ok(value)) => {
                    txn.commit().await?;
                    return Ok(value);
                }
                Ok(Err(err)) => {
                    if let Err(rollback_err) = txn.rollback().await {
                        warn!(error = %rollback_err, "failed to roll back transaction");
                    }
                    if is_order_conflict(&err) && attempt < max_attempts {
                        warn!(attempt, error = %err, "order conflict, retrying transaction");
                        attempt += 1;
                        continue;
                    }
                    return Err(err);
                }
                Err(_) => {
                    if let Err(rollback_err) = txn.rollback().await {
                        warn!(error = %rollback_err, "failed to roll back transaction");
                    }
                    error!(
                        timeout_ms = self.settings.execution_timeout_ms,
                        "transaction exceeded its execution budget"
                    );
                    return Err(ServiceError::Timeout);
                }
            }
        }
    }
}

/// A unique index rejected the write, typically a concurrently allocated
/// `order` or `global_order`.
pub fn is_order_conflict(err: &ServiceError) -> bool {
    let ServiceError::Internal(err) = err else {
        return false;
    };

    err.chain()
        .filter_map(|cause| cause.downcast_ref::<DbErr>())
        .any(|db_err| matches!(db_err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))))
}
