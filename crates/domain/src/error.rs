//! Unified error types for the domain layer
//!
//! Static rows that fail validation are reported through `DomainError` so the
//! registry loader can log the offending row and drop it.

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed (e.g., operand out of range for its kind)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A static row references another row that does not exist
    #[error("{entity_type} {id} references missing {reference}")]
    InvalidReference {
        entity_type: &'static str,
        id: String,
        reference: String,
    },

    /// Parse error (for value objects)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl DomainError {
    /// Creates a validation error for rows whose operands do not fit their kind.
    ///
    /// # Example
    /// ```ignore
    /// if percent > 100 {
    ///     return Err(DomainError::validation("health percent must be within 0..=100"));
    /// }
    /// ```
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a dangling reference error
    pub fn invalid_reference(
        entity_type: &'static str,
        id: impl Into<String>,
        reference: impl Into<String>,
    ) -> Self {
        Self::InvalidReference {
            entity_type,
            id: id.into(),
            reference: reference.into(),
        }
    }

    /// Creates a parse error for string-to-type conversion failures.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}
