//! Contract error types for agreements service
//!
//! These errors are transport-agnostic; the REST layer maps them to HTTP.

use thiserror::Error;

/// Agreements service domain errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AgreementsError {
    /// Resource not found
    #[error("{resource} not found: {id}")]
    NotFound {
        /// Resource type (agreement, institution, ...)
        resource: String,
        /// Resource identifier
        id: String,
    },
    /// Missing or malformed input
    #[error("Validation error: {message}")]
    Validation { message: String },
    /// Duplicate or still-referenced resource
    #[error("Conflict: {reason}")]
    Conflict { reason: String },
    /// Mobility record whose report was already submitted
    #[error("Mobility record is frozen after report submission: {id}")]
    Frozen { id: String },
    /// Storage or collaborator failure
    #[error("Internal error")]
    Internal,
}

impl AgreementsError {
    pub fn not_found(resource: &str, id: impl ToString) -> Self {
        Self::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::Conflict {
            reason: reason.into(),
        }
    }
}
