//! Unified error types for `BuildBuddy`.
//!
//! Every fallible operation in the crate returns [`Result`]. Errors are grouped into the
//! coarse [`ErrorKind`] classes the outer HTTP layer maps onto status codes; none of them
//! are retried.

use thiserror::Error;

/// Coarse classification used by callers to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing input
    Validation,
    /// A referenced id does not exist
    NotFound,
    /// Role or ownership mismatch
    Authorization,
    /// The request conflicts with existing data
    Conflict,
    /// Store or environment failure
    Internal,
}

/// Crate-wide error type
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed request input
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable description
        message: String,
    },

    /// A monetary amount that is negative or not a finite number
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// An assembly status outside `Pending`, `Assembling`, `Completed`
    #[error("Invalid status '{value}'. Must be Pending, Assembling, or Completed")]
    InvalidStatus {
        /// The rejected raw value
        value: String,
    },

    /// A status change the lifecycle does not allow
    #[error("Cannot move build from {from} to {to}")]
    InvalidTransition {
        /// Current status
        from: String,
        /// Requested status
        to: String,
    },

    /// Unknown component id
    #[error("Component not found: {id}")]
    ComponentNotFound {
        /// The missing id
        id: i64,
    },

    /// Unknown category id or name
    #[error("Category not found: {name}")]
    CategoryNotFound {
        /// The missing id or name
        name: String,
    },

    /// Unknown build id
    #[error("Build not found: {id}")]
    BuildNotFound {
        /// The missing id
        id: i64,
    },

    /// Unknown user id
    #[error("User not found: {id}")]
    UserNotFound {
        /// The missing id
        id: i64,
    },

    /// The acting user lacks the role or ownership required
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Human-readable description
        message: String,
    },

    /// The request conflicts with existing data
    #[error("Conflict: {message}")]
    Conflict {
        /// Human-readable description
        message: String,
    },

    /// Configuration could not be loaded
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description
        message: String,
    },

    /// Database layer failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Classifies the error for the outer request layer.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. }
            | Self::InvalidAmount { .. }
            | Self::InvalidStatus { .. }
            | Self::InvalidTransition { .. } => ErrorKind::Validation,
            Self::ComponentNotFound { .. }
            | Self::CategoryNotFound { .. }
            | Self::BuildNotFound { .. }
            | Self::UserNotFound { .. } => ErrorKind::NotFound,
            Self::Forbidden { .. } => ErrorKind::Authorization,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Config { .. } | Self::Database(_) | Self::Io(_) => ErrorKind::Internal,
        }
    }

    /// HTTP status code the router should answer with.
    ///
    /// Conflicts are reported as 400 to stay compatible with existing clients.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation | ErrorKind::Conflict => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Authorization => 403,
            ErrorKind::Internal => 500,
        }
    }

    /// Shorthand for a [`Error::Validation`] error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for a [`Error::Forbidden`] error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_follow_kind() {
        assert_eq!(Error::validation("bad").status_code(), 400);
        assert_eq!(Error::BuildNotFound { id: 7 }.status_code(), 404);
        assert_eq!(Error::forbidden("nope").status_code(), 403);
        assert_eq!(
            Error::Conflict {
                message: "in use".to_string()
            }
            .status_code(),
            400
        );
        assert_eq!(
            Error::Database(sea_orm::DbErr::Custom("boom".to_string())).status_code(),
            500
        );
    }

    #[test]
    fn test_invalid_status_message() {
        let err = Error::InvalidStatus {
            value: "Shipped".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("Shipped"));
    }
}
