//! # Template Rendering
//!
//! Turns an invoice plus branding into a standalone HTML document.
//!
//! ## Rendering Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Invoice + Branding                                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  InvoiceView::build                                                     │
//! │   ├── amounts ──────► currency::format_amount                          │
//! │   ├── surcharges ───► totals::surcharge_breakdown(stored subtotal)     │
//! │   └── dates ────────► "Mar 05, 2024"                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  RENDERERS[TemplateId] ──► askama template ──► String                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Templates never compute money themselves. Every figure they print comes
//! from the view, and every surcharge figure in the view comes from the
//! same function the totals engine uses.

use std::fmt;
use std::str::FromStr;

use askama::Template;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::currency::{format_amount, symbol_for};
use crate::error::{CoreError, CoreResult};
use crate::invoice::Invoice;
use crate::totals::surcharge_breakdown;
use crate::types::SurchargeKind;
use crate::validation::{validate_hex_color, ValidationResult};

// =============================================================================
// Template Catalog
// =============================================================================

/// Available document layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum TemplateId {
    #[default]
    Classic,
    Modern,
    Minimal,
    Bold,
}

impl TemplateId {
    pub const ALL: [TemplateId; 4] = [
        TemplateId::Classic,
        TemplateId::Modern,
        TemplateId::Minimal,
        TemplateId::Bold,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateId::Classic => "classic",
            TemplateId::Modern => "modern",
            TemplateId::Minimal => "minimal",
            TemplateId::Bold => "bold",
        }
    }

    /// Parses an id, falling back to classic for anything unknown.
    pub fn from_id(id: &str) -> Self {
        let id = id.trim();
        TemplateId::ALL
            .into_iter()
            .find(|template| template.as_str().eq_ignore_ascii_case(id))
            .unwrap_or_default()
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(TemplateId::from_id(s))
    }
}

impl<'de> Deserialize<'de> for TemplateId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(TemplateId::from_id(&crate::coerce::to_text(&value)))
    }
}

/// A catalog entry shown in the template picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TemplateInfo {
    pub id: TemplateId,
    pub name: &'static str,
    pub description: &'static str,
}

pub const TEMPLATES: [TemplateInfo; 4] = [
    TemplateInfo {
        id: TemplateId::Classic,
        name: "Classic",
        description: "Traditional and professional",
    },
    TemplateInfo {
        id: TemplateId::Modern,
        name: "Modern",
        description: "Clean and contemporary",
    },
    TemplateInfo {
        id: TemplateId::Minimal,
        name: "Minimal",
        description: "Simple and elegant",
    },
    TemplateInfo {
        id: TemplateId::Bold,
        name: "Bold",
        description: "Eye-catching design",
    },
];

// =============================================================================
// Branding
// =============================================================================

pub const DEFAULT_PRIMARY_COLOR: &str = "#3b82f6";
pub const DEFAULT_SECONDARY_COLOR: &str = "#1e40af";

/// A named primary/secondary colour pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColorPreset {
    pub name: &'static str,
    pub primary: &'static str,
    pub secondary: &'static str,
}

pub const COLOR_PRESETS: [ColorPreset; 6] = [
    ColorPreset { name: "Professional Blue", primary: "#3b82f6", secondary: "#1e40af" },
    ColorPreset { name: "Elegant Purple", primary: "#8b5cf6", secondary: "#6d28d9" },
    ColorPreset { name: "Modern Green", primary: "#10b981", secondary: "#059669" },
    ColorPreset { name: "Bold Red", primary: "#ef4444", secondary: "#dc2626" },
    ColorPreset { name: "Classic Black", primary: "#000000", secondary: "#374151" },
    ColorPreset { name: "Warm Orange", primary: "#f97316", secondary: "#ea580c" },
];

/// Look of rendered documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct Branding {
    /// Logo as a URL or data URI.
    pub logo: Option<String>,
    pub primary_color: String,
    pub secondary_color: String,
    pub template: TemplateId,
}

impl Default for Branding {
    fn default() -> Self {
        Branding {
            logo: None,
            primary_color: DEFAULT_PRIMARY_COLOR.to_string(),
            secondary_color: DEFAULT_SECONDARY_COLOR.to_string(),
            template: TemplateId::Classic,
        }
    }
}

impl Branding {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_hex_color("primary_color", &self.primary_color)?;
        validate_hex_color("secondary_color", &self.secondary_color)
    }
}

// =============================================================================
// View Model
// =============================================================================

/// Display form of one line item.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRow {
    pub description: String,
    pub quantity: String,
    pub rate: String,
    pub amount: String,
}

/// Display form of one surcharge.
#[derive(Debug, Clone, PartialEq)]
pub struct SurchargeRow {
    pub description: String,
    /// `"10%"` for percentage surcharges, empty for fixed ones.
    pub percent: String,
    pub amount: String,
}

/// Everything a template prints, already formatted.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceView {
    pub invoice_number: String,
    pub status: String,
    pub currency: String,
    pub currency_symbol: String,

    pub client_name: String,
    pub client_email: String,
    pub client_address: String,

    /// `Mar 05, 2024`
    pub invoice_date: String,
    /// `March 05, 2024`
    pub invoice_date_long: String,
    pub due_date: String,

    pub items: Vec<ItemRow>,
    pub surcharges: Vec<SurchargeRow>,

    pub subtotal: String,
    pub show_tax: bool,
    pub tax_rate: String,
    pub tax_amount: String,
    pub total: String,

    pub payment_terms: String,
    pub notes: String,

    pub logo: String,
    pub primary_color: String,
    pub secondary_color: String,
}

impl InvoiceView {
    pub fn build(invoice: &Invoice, branding: &Branding) -> Self {
        let currency = invoice.currency.as_str();
        let totals = invoice.totals();

        let items = invoice
            .items()
            .iter()
            .map(|item| ItemRow {
                description: item.description.clone(),
                quantity: item.quantity().to_string(),
                rate: format_amount(item.rate(), currency),
                amount: format_amount(item.amount(), currency),
            })
            .collect();

        let surcharges = surcharge_breakdown(invoice.surcharges(), totals.subtotal)
            .into_iter()
            .map(|line| SurchargeRow {
                description: line.description,
                percent: match line.kind {
                    SurchargeKind::Percentage => format!("{}%", line.rate),
                    SurchargeKind::Fixed => String::new(),
                },
                amount: format_amount(line.contribution, currency),
            })
            .collect();

        InvoiceView {
            invoice_number: invoice.invoice_number.clone(),
            status: invoice.status.to_string(),
            currency: currency.to_string(),
            currency_symbol: symbol_for(currency).to_string(),
            client_name: invoice.client_name.clone(),
            client_email: invoice.client_email.clone().unwrap_or_default(),
            client_address: invoice.client_address.clone().unwrap_or_default(),
            invoice_date: short_date(invoice.invoice_date),
            invoice_date_long: long_date(invoice.invoice_date),
            due_date: short_date(invoice.due_date),
            items,
            surcharges,
            subtotal: format_amount(totals.subtotal, currency),
            show_tax: invoice.tax_rate() > 0.0,
            tax_rate: invoice.tax_rate().to_string(),
            tax_amount: format_amount(totals.tax_amount, currency),
            total: format_amount(totals.total, currency),
            payment_terms: invoice.payment_terms.clone().unwrap_or_default(),
            notes: invoice.notes.clone().unwrap_or_default(),
            logo: branding.logo.clone().unwrap_or_default(),
            primary_color: branding.primary_color.clone(),
            secondary_color: branding.secondary_color.clone(),
        }
    }
}

fn short_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%b %d, %Y").to_string())
        .unwrap_or_default()
}

fn long_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%B %d, %Y").to_string())
        .unwrap_or_default()
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template)]
#[template(path = "classic.html")]
struct ClassicTemplate<'a> {
    view: &'a InvoiceView,
}

#[derive(Template)]
#[template(path = "modern.html")]
struct ModernTemplate<'a> {
    view: &'a InvoiceView,
}

#[derive(Template)]
#[template(path = "minimal.html")]
struct MinimalTemplate<'a> {
    view: &'a InvoiceView,
}

#[derive(Template)]
#[template(path = "bold.html")]
struct BoldTemplate<'a> {
    view: &'a InvoiceView,
}

type RenderFn = fn(&InvoiceView) -> askama::Result<String>;

fn render_classic(view: &InvoiceView) -> askama::Result<String> {
    ClassicTemplate { view }.render()
}

fn render_modern(view: &InvoiceView) -> askama::Result<String> {
    ModernTemplate { view }.render()
}

fn render_minimal(view: &InvoiceView) -> askama::Result<String> {
    MinimalTemplate { view }.render()
}

fn render_bold(view: &InvoiceView) -> askama::Result<String> {
    BoldTemplate { view }.render()
}

const RENDERERS: [(TemplateId, RenderFn); 4] = [
    (TemplateId::Classic, render_classic),
    (TemplateId::Modern, render_modern),
    (TemplateId::Minimal, render_minimal),
    (TemplateId::Bold, render_bold),
];

fn renderer(template: TemplateId) -> RenderFn {
    RENDERERS
        .iter()
        .find(|(id, _)| *id == template)
        .map_or(render_classic as RenderFn, |(_, render)| *render)
}

/// Renders an invoice as a complete HTML document.
pub fn render_invoice(
    invoice: &Invoice,
    branding: &Branding,
    template: TemplateId,
) -> CoreResult<String> {
    let view = InvoiceView::build(invoice, branding);
    renderer(template)(&view).map_err(|e| CoreError::Render(e.to_string()))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::InvoiceInput;
    use crate::types::{LineItem, Surcharge};

    fn sample() -> Invoice {
        let mut invoice = Invoice::from(InvoiceInput {
            invoice_number: Some("INV-0042".to_string()),
            client_name: "Acme & Sons".to_string(),
            client_email: Some("ap@acme.test".to_string()),
            invoice_date: NaiveDate::from_ymd_opt(2024, 3, 5),
            due_date: NaiveDate::from_ymd_opt(2024, 4, 4),
            currency: Some("EUR".to_string()),
            payment_terms: Some("Net 30".to_string()),
            ..Default::default()
        });
        invoice.add_item(LineItem::new("Design", 2.0, 100.0));
        invoice.add_item(LineItem::new("Hosting", 1.0, 50.0));
        invoice.add_surcharge(Surcharge::new("Regional fee", 10.0, SurchargeKind::Percentage));
        invoice.set_tax_rate(10.0);
        invoice
    }

    #[test]
    fn test_template_id_parsing() {
        assert_eq!(TemplateId::from_id("modern"), TemplateId::Modern);
        assert_eq!(TemplateId::from_id(" BOLD "), TemplateId::Bold);
        assert_eq!(TemplateId::from_id("fancy"), TemplateId::Classic);
        assert_eq!("".parse::<TemplateId>(), Ok(TemplateId::Classic));

        let branding: Branding = serde_json::from_str(r#"{"template": "neon"}"#).unwrap();
        assert_eq!(branding.template, TemplateId::Classic);
        assert_eq!(branding.primary_color, DEFAULT_PRIMARY_COLOR);
    }

    #[test]
    fn test_branding_validation_and_presets() {
        let mut branding = Branding::default();
        assert!(branding.validate().is_ok());

        // Every preset offered by the form passes validation
        for preset in &COLOR_PRESETS {
            let styled = Branding {
                primary_color: preset.primary.to_string(),
                secondary_color: preset.secondary.to_string(),
                ..Branding::default()
            };
            assert!(styled.validate().is_ok(), "{}", preset.name);
        }

        branding.secondary_color = "green".to_string();
        assert!(branding.validate().is_err());
    }

    #[test]
    fn test_view_formats_amounts_and_dates() {
        let view = InvoiceView::build(&sample(), &Branding::default());

        assert_eq!(view.currency_symbol, "€");
        assert_eq!(view.items[0].quantity, "2");
        assert_eq!(view.items[0].rate, "€100.00");
        assert_eq!(view.items[0].amount, "€200.00");
        assert_eq!(view.subtotal, "€250.00");
        assert!(view.show_tax);
        assert_eq!(view.tax_rate, "10");
        assert_eq!(view.tax_amount, "€25.00");
        assert_eq!(view.surcharges[0].percent, "10%");
        assert_eq!(view.surcharges[0].amount, "€25.00");
        assert_eq!(view.total, "€300.00");
        assert_eq!(view.invoice_date, "Mar 05, 2024");
        assert_eq!(view.invoice_date_long, "March 05, 2024");
        assert_eq!(view.due_date, "Apr 04, 2024");
    }

    #[test]
    fn test_view_hides_zero_tax() {
        let mut invoice = sample();
        invoice.set_tax_rate(0.0);
        assert!(!InvoiceView::build(&invoice, &Branding::default()).show_tax);
    }

    #[test]
    fn test_every_template_renders() {
        let invoice = sample();
        let branding = Branding::default();

        for template in TemplateId::ALL {
            let html = render_invoice(&invoice, &branding, template).unwrap();
            assert!(html.starts_with("<!DOCTYPE html>"), "{template}");
            assert!(html.contains("INV-0042"), "{template}");
            assert!(html.contains("€300.00"), "{template}");
            assert!(html.contains("Regional fee"), "{template}");
            assert!(html.contains(DEFAULT_PRIMARY_COLOR), "{template}");
            assert!(html.contains(&format!("template-{}", template.as_str())));
        }
    }

    #[test]
    fn test_rendering_escapes_text() {
        let mut invoice = sample();
        invoice.client_name = "<script>alert(1)</script>".to_string();
        let html = render_invoice(&invoice, &Branding::default(), TemplateId::Minimal).unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_only_classic_labels_percentages() {
        let invoice = sample();
        let branding = Branding::default();
        let classic = render_invoice(&invoice, &branding, TemplateId::Classic).unwrap();
        let modern = render_invoice(&invoice, &branding, TemplateId::Modern).unwrap();
        assert!(classic.contains("Regional fee (10%)"));
        assert!(!modern.contains("Regional fee ("));
    }

    #[test]
    fn test_renderer_table_covers_catalog() {
        for info in TEMPLATES {
            assert!(RENDERERS.iter().any(|(id, _)| *id == info.id));
        }
    }
}
