// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::ErrorCode;
use thiserror::Error;

/// Failures surfaced by the ledger and the analytics engine.
#[derive(Debug, Error)]
pub enum FinanceError {
    #[error("invalid {field}: {message}")]
    Validation { field: &'static str, message: String },
    #[error("installment count must be between 1 and 36, got {0}")]
    InvalidInstallmentCount(u32),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("ledger unreachable: {0}")]
    Connectivity(String),
    #[error("missing or invalid session token")]
    Unauthorized,
    #[error("data integrity fault: {0}")]
    Integrity(String),
    #[error("database error: {0}")]
    Database(rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, FinanceError>;

impl FinanceError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        FinanceError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        FinanceError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Logs the fault before handing it back; stored data is never patched over.
    pub fn integrity(message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::error!(%message, "ledger integrity fault");
        FinanceError::Integrity(message)
    }

    /// Caller may retry the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FinanceError::Conflict(_) | FinanceError::Connectivity(_)
        )
    }
}

impl From<rusqlite::Error> for FinanceError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => {
                FinanceError::Conflict(format!("ledger is busy, retry: {}", err))
            }
            Some(ErrorCode::CannotOpen) | Some(ErrorCode::SystemIoFailure) => {
                FinanceError::Connectivity(err.to_string())
            }
            _ => FinanceError::Database(err),
        }
    }
}
