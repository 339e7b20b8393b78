//! Event processing error types.

use sea_orm::DbErr;
use thiserror::Error;

use sprout_db::LedgerError;

/// Errors raised while processing one delivered event.
///
/// The variant decides how the delivery adapter settles the message:
/// malformed payloads are acknowledged so the transport stops
/// redelivering them; everything else is transient and left
/// unacknowledged for redelivery.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The payload could not be decoded or failed validation.
    #[error("malformed event payload: {0}")]
    Malformed(String),

    /// Loading the user's saving rules failed.
    #[error("failed to load saving rules: {0}")]
    LoadRules(#[source] DbErr),

    /// The composite ledger write (or a window read) failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Storing generated recommendations failed.
    #[error("failed to store recommendations: {0}")]
    StoreRecommendations(#[source] DbErr),
}

impl ProcessError {
    /// Whether the delivery should be retried by the transport.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        !matches!(self, Self::Malformed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_is_not_retryable() {
        assert!(!ProcessError::Malformed("bad".to_string()).is_retryable());
    }

    #[test]
    fn test_store_failures_are_retryable() {
        let db_err = DbErr::Custom("connection refused".to_string());
        assert!(ProcessError::LoadRules(db_err).is_retryable());

        let db_err = DbErr::Custom("connection refused".to_string());
        assert!(ProcessError::StoreRecommendations(db_err).is_retryable());

        let ledger = LedgerError::Database(DbErr::Custom("timeout".to_string()));
        assert!(ProcessError::Ledger(ledger).is_retryable());
    }
}
