//! Domain error types
//!
//! These errors are framework-agnostic and represent business-level failures.
//! The HTTP mapping lives in `api::error`.

use std::fmt;

#[derive(Debug)]
pub enum DomainError {
    /// Resource not found, carries the resource name ("Book", "Order", ...)
    NotFound(String),
    /// Validation error with message
    Validation(String),
    /// Missing, invalid or expired credentials
    Unauthorized(String),
    /// Authenticated but not allowed
    Forbidden(String),
    /// Database/persistence error
    Database(String),
    /// External service error
    External(String),
    /// Optional feature is not configured
    Unavailable(String),
    /// Generic internal error
    Internal(String),
}

impl DomainError {
    pub fn not_found(what: &str) -> Self {
        DomainError::NotFound(what.to_string())
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::NotFound(what) => write!(f, "{} not found", what),
            DomainError::Validation(msg) => write!(f, "{}", msg),
            DomainError::Unauthorized(msg) => write!(f, "{}", msg),
            DomainError::Forbidden(msg) => write!(f, "{}", msg),
            DomainError::Database(msg) => write!(f, "Database error: {}", msg),
            DomainError::External(msg) => write!(f, "External service error: {}", msg),
            DomainError::Unavailable(msg) => write!(f, "{}", msg),
            DomainError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

// Conversion from SeaORM errors (used in infrastructure layer)
impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        DomainError::Database(e.to_string())
    }
}

impl From<std::io::Error> for DomainError {
    fn from(e: std::io::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}
