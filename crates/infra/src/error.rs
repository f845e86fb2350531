//! Error surfaced by the application services.

use thiserror::Error;

use eventshare_core::DomainError;

use crate::config::ConfigError;
use crate::store::StoreError;

/// Every service operation fails with exactly one of these.
///
/// ## Error Semantics
///
/// - **Validation / Conflict / Forbidden / NotFound / Unauthenticated**: local,
///   deterministic, caller-facing; the scope was discarded, nothing was written.
/// - **Storage**: the persistence layer failed; `is_retryable()` tells whether
///   re-running the operation is safe and may succeed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("validation failed on `{field}`: {message}")]
    Validation { field: String, message: String },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthenticated")]
    Unauthenticated,

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl ServiceError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// True only for storage failures where nothing was committed and a retry may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ServiceError::Storage(e) => e.is_retryable(),
            _ => false,
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation { field, message } => ServiceError::Validation { field, message },
            DomainError::InvalidId(msg) => ServiceError::Validation {
                field: "id".to_string(),
                message: msg,
            },
            DomainError::Conflict(msg) => ServiceError::Conflict(msg),
            DomainError::Forbidden(msg) => ServiceError::Forbidden(msg),
            DomainError::NotFound(msg) => ServiceError::NotFound(msg),
            DomainError::Unauthenticated => ServiceError::Unauthenticated,
        }
    }
}

impl From<ConfigError> for ServiceError {
    fn from(value: ConfigError) -> Self {
        match value {
            ConfigError::Invalid { key, value, reason } => {
                ServiceError::validation(key, format!("'{value}': {reason}"))
            }
        }
    }
}
