//! # Extraction Post-Processing
//!
//! Turns a free-text description into an [`Invoice`] with the help of a
//! language model. The model call itself lives in the API crate; this
//! module builds the instruction, digs the JSON out of the reply and
//! normalizes it.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  build_prompt(description, today)                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  (model call, outside this crate)                                      │
//! │       │ raw text, maybe fenced, maybe with prose around it             │
//! │       ▼                                                                 │
//! │  parse_model_output(text) ──► serde_json::Value (object)               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  normalize_extracted(value, today)                                     │
//! │       ├── lenient fields (coerce), model totals ignored                │
//! │       ├── defaults: USD, draft, today, +30 days, "Net 30", INV-XXXX   │
//! │       └── totals from compute_totals                                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{Duration, NaiveDate};
use serde_json::Value;

use crate::error::{CoreError, CoreResult};
use crate::invoice::{Invoice, InvoiceInput};
use crate::types::InvoiceStatus;
use crate::{DEFAULT_DUE_DAYS, DEFAULT_PAYMENT_TERMS};

/// Builds the instruction sent to the model.
pub fn build_prompt(description: &str, today: NaiveDate) -> String {
    format!(
        r#"Extract invoice details from this description: "{description}"

Today is {today}. Reply with a single JSON object and nothing else, using these fields:
- invoice_number (format INV-XXXX where X is a digit)
- client_name, client_email, client_address
- invoice_date (YYYY-MM-DD, today if not specified)
- due_date (YYYY-MM-DD, {days} days after the invoice date if not specified)
- currency (ISO 4217 code, detect from context or USD)
- items: array of {{"description", "quantity", "rate"}}
- tax_rate (percent, 0 if not mentioned)
- surcharges: array of {{"description", "amount", "type": "fixed" | "percentage"}} for fees that are mentioned
- payment_terms ("{terms}" if not specified)
- notes

If information is missing, make reasonable assumptions."#,
        description = description.trim(),
        today = today.format("%Y-%m-%d"),
        days = DEFAULT_DUE_DAYS,
        terms = DEFAULT_PAYMENT_TERMS,
    )
}

/// Extracts the JSON object from a model reply.
///
/// Accepts a bare object, a fenced code block, or an object surrounded by
/// prose. Anything that is not a JSON object is an error.
pub fn parse_model_output(text: &str) -> CoreResult<Value> {
    let text = strip_fences(text.trim());

    let start = text.find('{');
    let end = text.rfind('}');
    let candidate = match (start, end) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => {
            return Err(CoreError::Extraction(
                "model reply contains no JSON object".to_string(),
            ))
        }
    };

    let value: Value = serde_json::from_str(candidate)
        .map_err(|e| CoreError::Extraction(format!("model reply is not valid JSON: {}", e)))?;

    if !value.is_object() {
        return Err(CoreError::Extraction(
            "model reply is not a JSON object".to_string(),
        ));
    }

    Ok(value)
}

fn strip_fences(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the language tag, e.g. ```json, which may share a line with the body
    let body = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()).trim();
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Normalizes extracted data into a fresh draft invoice.
///
/// ## Defaults
/// - `currency`: USD
/// - `status`: always draft
/// - `invoice_date`: `today`
/// - `due_date`: invoice date + 30 days
/// - `payment_terms`: "Net 30"
/// - `invoice_number`: generated `INV-XXXX`
///
/// Identifiers and timestamps from the model are ignored. Totals are
/// recomputed from the items, surcharges and tax rate.
pub fn normalize_extracted(value: Value, today: NaiveDate) -> CoreResult<Invoice> {
    if !value.is_object() {
        return Err(CoreError::Extraction(
            "extracted data is not a JSON object".to_string(),
        ));
    }

    let mut input: InvoiceInput = serde_json::from_value(value)
        .map_err(|e| CoreError::Extraction(format!("unusable extracted data: {}", e)))?;

    let invoice_date = input.invoice_date.unwrap_or(today);
    input.id = None;
    input.created_at = None;
    input.updated_at = None;
    input.status = InvoiceStatus::Draft;
    input.invoice_date = Some(invoice_date);
    input.due_date = input
        .due_date
        .or_else(|| invoice_date.checked_add_signed(Duration::days(DEFAULT_DUE_DAYS)));
    input.payment_terms = input
        .payment_terms
        .or_else(|| Some(DEFAULT_PAYMENT_TERMS.to_string()));

    Ok(Invoice::from(input))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SurchargeKind;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_prompt_mentions_description_and_date() {
        let prompt = build_prompt("  Logo for Acme, $500  ", today());
        assert!(prompt.contains("\"Logo for Acme, $500\""));
        assert!(prompt.contains("Today is 2024-03-01"));
        assert!(prompt.contains("Net 30"));
    }

    #[test]
    fn test_parse_bare_object() {
        let value = parse_model_output(r#"{"client_name": "Acme"}"#).unwrap();
        assert_eq!(value["client_name"], "Acme");
    }

    #[test]
    fn test_parse_fenced_object() {
        let text = "```json\n{\"tax_rate\": 5}\n```";
        assert_eq!(parse_model_output(text).unwrap()["tax_rate"], 5);
    }

    #[test]
    fn test_parse_single_line_fence() {
        let tagged = parse_model_output("```json {\"client_name\": \"Acme\"} ```").unwrap();
        assert_eq!(tagged["client_name"], "Acme");

        let bare = parse_model_output("```{\"client_name\": \"Acme\"}```").unwrap();
        assert_eq!(bare["client_name"], "Acme");
    }

    #[test]
    fn test_parse_object_in_prose() {
        let text = "Here is the invoice:\n{\"items\": []}\nLet me know!";
        assert!(parse_model_output(text).unwrap()["items"].is_array());
    }

    #[test]
    fn test_parse_rejects_non_objects() {
        assert!(matches!(
            parse_model_output("I cannot help with that."),
            Err(CoreError::Extraction(_))
        ));
        assert!(parse_model_output("{not json}").is_err());
        assert!(normalize_extracted(json!([1, 2]), today()).is_err());
    }

    #[test]
    fn test_normalize_fills_defaults() {
        let invoice = normalize_extracted(json!({ "client_name": "Acme" }), today()).unwrap();

        assert_eq!(invoice.currency, "USD");
        assert_eq!(invoice.status, InvoiceStatus::Draft);
        assert_eq!(invoice.invoice_date, Some(today()));
        assert_eq!(invoice.due_date, NaiveDate::from_ymd_opt(2024, 3, 31));
        assert_eq!(invoice.payment_terms.as_deref(), Some("Net 30"));
        assert!(invoice.invoice_number.starts_with("INV-"));
        assert_eq!(invoice.totals().total, 0.0);
    }

    #[test]
    fn test_normalize_recomputes_model_totals() {
        let value = json!({
            "invoice_number": "INV-0420",
            "currency": "eur",
            "status": "paid",
            "invoice_date": "2024-02-10",
            "items": [
                { "description": "Design", "quantity": "2", "rate": 100, "amount": 1 },
                { "description": "Hosting", "quantity": 1, "rate": "50" }
            ],
            "tax_rate": "10",
            "surcharges": [
                { "description": "Regional fee", "amount": 10, "type": "percentage" }
            ],
            "subtotal": 999,
            "total": 12
        });

        let invoice = normalize_extracted(value, today()).unwrap();

        assert_eq!(invoice.invoice_number, "INV-0420");
        assert_eq!(invoice.currency, "EUR");
        assert_eq!(invoice.status, InvoiceStatus::Draft);
        assert_eq!(invoice.due_date, NaiveDate::from_ymd_opt(2024, 3, 11));
        assert_eq!(invoice.items()[0].amount(), 200.0);
        assert_eq!(invoice.surcharges()[0].kind, SurchargeKind::Percentage);

        let totals = invoice.totals();
        assert_eq!(totals.subtotal, 250.0);
        assert_eq!(totals.tax_amount, 25.0);
        assert_eq!(totals.surcharge_total, 25.0);
        assert_eq!(totals.total, 300.0);
    }

    #[test]
    fn test_normalize_ignores_garbage_numbers() {
        let value = json!({
            "items": [{ "description": "Mystery", "quantity": "lots", "rate": null }],
            "tax_rate": "abc"
        });
        let invoice = normalize_extracted(value, today()).unwrap();
        assert_eq!(invoice.totals().total, 0.0);
        assert_eq!(invoice.items().len(), 1);
    }
}
