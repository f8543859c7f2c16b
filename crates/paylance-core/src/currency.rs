//! # Currency Module
//!
//! Supported currencies and display formatting.
//!
//! Amounts are kept unrounded everywhere else; this module is where they
//! become two-decimal strings for documents and previews.
//!
//! ## Usage
//! ```rust
//! use paylance_core::currency::{format_amount, symbol_for};
//!
//! assert_eq!(symbol_for("GBP"), "£");
//! assert_eq!(format_amount(1234.5, "EUR"), "€1234.50");
//! ```

use serde::Serialize;

/// Symbol used when a code is not in [`CURRENCIES`].
pub const FALLBACK_SYMBOL: &str = "$";

/// A supported currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Currency {
    pub code: &'static str,
    pub symbol: &'static str,
    pub name: &'static str,
}

/// Currencies offered by the editor, in display order.
pub const CURRENCIES: [Currency; 10] = [
    Currency { code: "USD", symbol: "$", name: "US Dollar" },
    Currency { code: "EUR", symbol: "€", name: "Euro" },
    Currency { code: "GBP", symbol: "£", name: "British Pound" },
    Currency { code: "JPY", symbol: "¥", name: "Japanese Yen" },
    Currency { code: "AUD", symbol: "A$", name: "Australian Dollar" },
    Currency { code: "CAD", symbol: "C$", name: "Canadian Dollar" },
    Currency { code: "CHF", symbol: "CHF", name: "Swiss Franc" },
    Currency { code: "CNY", symbol: "¥", name: "Chinese Yuan" },
    Currency { code: "INR", symbol: "₹", name: "Indian Rupee" },
    Currency { code: "MXN", symbol: "$", name: "Mexican Peso" },
];

/// Looks up a currency by code (case-insensitive).
pub fn find(code: &str) -> Option<&'static Currency> {
    let code = code.trim();
    CURRENCIES
        .iter()
        .find(|currency| currency.code.eq_ignore_ascii_case(code))
}

/// Returns the display symbol for a code, `$` when unknown.
pub fn symbol_for(code: &str) -> &'static str {
    find(code).map_or(FALLBACK_SYMBOL, |currency| currency.symbol)
}

/// Formats an amount as symbol followed by the value to two decimals.
pub fn format_amount(amount: f64, code: &str) -> String {
    format!("{}{:.2}", symbol_for(code), crate::totals::sanitize(amount))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbols() {
        assert_eq!(symbol_for("USD"), "$");
        assert_eq!(symbol_for("inr"), "₹");
        assert_eq!(symbol_for("CHF"), "CHF");
        assert_eq!(symbol_for("XYZ"), "$");
        assert_eq!(symbol_for(""), "$");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0, "USD"), "$0.00");
        assert_eq!(format_amount(300.0, "USD"), "$300.00");
        assert_eq!(format_amount(1100.0, "AUD"), "A$1100.00");
        assert_eq!(format_amount(12.345678, "GBP"), "£12.35");
        assert_eq!(format_amount(-5.5, "EUR"), "€-5.50");
        assert_eq!(format_amount(f64::NAN, "USD"), "$0.00");
    }

    #[test]
    fn test_find() {
        assert_eq!(find("jpy").map(|c| c.code), Some("JPY"));
        assert!(find("ABC").is_none());
    }
}
