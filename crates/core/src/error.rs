//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, caller-visible failures (validation,
/// overlaps, access). Storage concerns belong to the infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A field failed validation. `field` names the offending input
    /// (e.g. `end_time`, or `events[2].title` inside a batch).
    #[error("validation failed on `{field}`: {message}")]
    Validation { field: String, message: String },

    /// An identifier could not be parsed.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// The requested interval overlaps an existing event.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Authenticated, but the held role does not allow the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Event, version, user or permission row is absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// No identity was presented.
    #[error("unauthenticated")]
    Unauthenticated,
}

impl DomainError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Re-scope a validation error under a parent field, e.g. `title` → `events[1].title`.
    pub fn within(self, parent: impl core::fmt::Display) -> Self {
        match self {
            Self::Validation { field, message } => Self::Validation {
                field: format!("{parent}.{field}"),
                message,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_names_the_field() {
        let err = DomainError::validation("end_time", "must be after start_time");
        assert_eq!(
            err.to_string(),
            "validation failed on `end_time`: must be after start_time"
        );
    }

    #[test]
    fn within_prefixes_only_validation_errors() {
        let err = DomainError::validation("title", "must not be blank").within("events[1]");
        assert_eq!(
            err,
            DomainError::Validation {
                field: "events[1].title".to_string(),
                message: "must not be blank".to_string(),
            }
        );

        let other = DomainError::conflict("overlap").within("events[1]");
        assert_eq!(other, DomainError::Conflict("overlap".to_string()));
    }
}
