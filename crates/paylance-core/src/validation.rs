//! # Validation Module
//!
//! Business rule validation for invoices and settings.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Deserialization (coerce)                                     │
//! │  └── Bad numbers become 0, bad dates become None. Never fails.         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Editing                                                      │
//! │  └── Totals recomputed on every change. Never fails.                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: THIS MODULE, on save                                         │
//! │  └── Required fields, formats, date order, non-negative numbers        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 4: Database (SQLite CHECK / NOT NULL constraints)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::invoice::Invoice;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted invoice number.
pub const MAX_INVOICE_NUMBER_LEN: usize = 50;

/// Longest accepted client name.
pub const MAX_CLIENT_NAME_LEN: usize = 200;

/// Longest accepted search query.
pub const MAX_QUERY_LEN: usize = 100;

// =============================================================================
// Invoice
// =============================================================================

/// Validates an invoice before it is persisted.
///
/// ## Rules
/// - Invoice number present, at most 50 characters
/// - Client name at most 200 characters
/// - Client email, when present, looks like an address
/// - Currency is a three-letter code
/// - Due date is not before the invoice date
/// - No negative quantities or rates
pub fn validate_invoice(invoice: &Invoice) -> ValidationResult<()> {
    validate_invoice_number(&invoice.invoice_number)?;
    validate_client_name(&invoice.client_name)?;

    if let Some(email) = &invoice.client_email {
        validate_email(email)?;
    }

    validate_currency_code(&invoice.currency)?;

    if let (Some(issued), Some(due)) = (invoice.invoice_date, invoice.due_date) {
        if due < issued {
            return Err(ValidationError::Before {
                field: "due_date".to_string(),
                other: "invoice_date".to_string(),
            });
        }
    }

    for (index, item) in invoice.items().iter().enumerate() {
        if item.quantity() < 0.0 {
            return Err(ValidationError::Negative {
                field: format!("items[{}].quantity", index),
            });
        }
        if item.rate() < 0.0 {
            return Err(ValidationError::Negative {
                field: format!("items[{}].rate", index),
            });
        }
    }

    Ok(())
}

/// Validates an invoice number.
///
/// ## Example
/// ```rust
/// use paylance_core::validation::validate_invoice_number;
///
/// assert!(validate_invoice_number("INV-0042").is_ok());
/// assert!(validate_invoice_number("   ").is_err());
/// ```
pub fn validate_invoice_number(number: &str) -> ValidationResult<()> {
    let number = number.trim();

    if number.is_empty() {
        return Err(ValidationError::Required {
            field: "invoice_number".to_string(),
        });
    }

    if number.chars().count() > MAX_INVOICE_NUMBER_LEN {
        return Err(ValidationError::TooLong {
            field: "invoice_number".to_string(),
            max: MAX_INVOICE_NUMBER_LEN,
        });
    }

    Ok(())
}

/// Validates a client name. Empty is allowed for drafts.
pub fn validate_client_name(name: &str) -> ValidationResult<()> {
    if name.trim().chars().count() > MAX_CLIENT_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "client_name".to_string(),
            max: MAX_CLIENT_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates the rough shape of an email address.
///
/// Only checks for one `@` with text on both sides and a dot in the domain.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();
    let invalid = || ValidationError::InvalidFormat {
        field: "client_email".to_string(),
        reason: "must be an email address".to_string(),
    };

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.contains('@')
        || email.contains(char::is_whitespace)
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
    {
        return Err(invalid());
    }

    Ok(())
}

/// Validates an ISO 4217 style code (three ASCII letters).
pub fn validate_currency_code(code: &str) -> ValidationResult<()> {
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::InvalidFormat {
            field: "currency".to_string(),
            reason: "must be a three-letter currency code".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Settings
// =============================================================================

/// Validates a `#rrggbb` colour.
///
/// ## Example
/// ```rust
/// use paylance_core::validation::validate_hex_color;
///
/// assert!(validate_hex_color("primary_color", "#3b82f6").is_ok());
/// assert!(validate_hex_color("primary_color", "blue").is_err());
/// ```
pub fn validate_hex_color(field: &str, color: &str) -> ValidationResult<()> {
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());

    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a #rrggbb colour".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Search
// =============================================================================

/// Validates a suggestion search query.
///
/// ## Rules
/// - Can be empty (returns no suggestions)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_QUERY_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_QUERY_LEN,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Unit Tests
// =============================================================================
