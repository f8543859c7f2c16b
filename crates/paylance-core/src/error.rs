//! # Error Types
//!
//! Domain-specific error types for paylance-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  paylance-core errors (this file)                                      │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  paylance-db errors (separate crate)                                   │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  paylance-api errors (in app)                                          │
//! │  └── ApiError         - What the client sees (serialized)              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → HTTP response          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The totals engine itself never returns an error. Everything here comes
//! from editing by index, model output parsing, rendering or the stores.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An edit addressed a line item that does not exist.
    #[error("Line item {index} not found (invoice has {len} items)")]
    ItemNotFound { index: usize, len: usize },

    /// An edit addressed a surcharge that does not exist.
    #[error("Surcharge {index} not found (invoice has {len} surcharges)")]
    SurchargeNotFound { index: usize, len: usize },

    /// The language model returned something that is not an invoice object.
    ///
    /// ## When This Occurs
    /// - Response has no `{ ... }` span at all
    /// - The span is not valid JSON
    /// - The JSON is an array or scalar instead of an object
    #[error("Could not extract invoice: {0}")]
    Extraction(String),

    /// A template failed to render.
    #[error("Render failed: {0}")]
    Render(String),

    /// A suggestion or draft store failed.
    #[error("Store error: {0}")]
    Store(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised when an invoice is finalized or settings are saved, never while
/// totals are being computed.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g., invalid email, invalid colour).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Two fields are inconsistent with each other.
    #[error("{field} must not be before {other}")]
    Before { field: String, other: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::ItemNotFound { index: 4, len: 2 };
        assert_eq!(err.to_string(), "Line item 4 not found (invoice has 2 items)");

        let err = ValidationError::Before {
            field: "due_date".to_string(),
            other: "invoice_date".to_string(),
        };
        assert_eq!(err.to_string(), "due_date must not be before invoice_date");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "invoice_number".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(
            core_err.to_string(),
            "Validation error: invoice_number is required"
        );
    }
}
