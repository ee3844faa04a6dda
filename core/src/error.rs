//! Error types for the storage layer.
//!
//! # Design
//! Missing rows are not errors: lookups return `Ok(None)`. Everything else,
//! including an update that matched no row, lands here. Callers above the
//! service only ever render these as text, so each variant carries enough
//! context to read well in a log line or a response body.

use std::time::Duration;

use thiserror::Error;

/// Errors returned by `Storage` implementations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A statement failed inside PostgreSQL or on the wire.
    #[error("{context}: {source}")]
    Postgres {
        context: &'static str,
        #[source]
        source: tokio_postgres::Error,
    },

    /// No connection could be checked out of the pool.
    #[error("{context}: {source}")]
    Pool {
        context: &'static str,
        #[source]
        source: deadpool_postgres::PoolError,
    },

    /// A write touched a number of rows other than exactly one.
    #[error("expected to affect 1 row, affected {0}")]
    RowsAffected(u64),

    /// The referenced user row does not exist.
    #[error("insert todo: user {0} does not exist")]
    UserMissing(i64),

    /// The statement did not finish before the query deadline.
    #[error("query cancelled after {0:?}")]
    Timeout(Duration),

    /// The storage could not be configured or reached at startup.
    #[error("storage config: {0}")]
    Config(String),
}

impl StorageError {
    pub(crate) fn postgres(context: &'static str) -> impl FnOnce(tokio_postgres::Error) -> Self {
        move |source| StorageError::Postgres { context, source }
    }

    pub(crate) fn pool(context: &'static str) -> impl FnOnce(deadpool_postgres::PoolError) -> Self {
        move |source| StorageError::Pool { context, source }
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_affected_message_names_the_count() {
        assert_eq!(
            StorageError::RowsAffected(0).to_string(),
            "expected to affect 1 row, affected 0"
        );
    }

    #[test]
    fn timeout_message_includes_deadline() {
        let msg = StorageError::Timeout(Duration::from_secs(5)).to_string();
        assert_eq!(msg, "query cancelled after 5s");
    }

    #[test]
    fn user_missing_mentions_user_id() {
        assert!(StorageError::UserMissing(95).to_string().contains("95"));
    }
}
