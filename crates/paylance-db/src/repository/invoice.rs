//! # Invoice Repository
//!
//! Database operations for saved invoices.
//!
//! ## Storage Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       invoices row                                      │
//! │                                                                         │
//! │  metadata columns    id, invoice_number, client_*, dates, currency,    │
//! │                      payment_terms, notes, status, timestamps           │
//! │  JSON columns        items, surcharges                                 │
//! │  inputs              tax_rate                                          │
//! │  derived columns     subtotal, tax_amount, surcharge_total, total      │
//! │                      (written for reporting, never read back)          │
//! │                                                                         │
//! │  save()  ──► upsert, created_at kept, updated_at = now                 │
//! │  load    ──► Invoice::from(InvoiceInput) ──► totals recomputed         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use paylance_core::{Invoice, InvoiceInput, InvoiceStatus, LineItem, Surcharge};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

const SELECT_COLUMNS: &str = r#"
    id, invoice_number, client_name, client_email, client_address,
    invoice_date, due_date, currency, items, surcharges, tax_rate,
    payment_terms, notes, status, created_at, updated_at
"#;

// =============================================================================
// Sorting
// =============================================================================

/// Columns an invoice list can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    CreatedAt,
    UpdatedAt,
    InvoiceDate,
    DueDate,
    InvoiceNumber,
    ClientName,
    Total,
    Status,
}

impl SortColumn {
    const ALL: [SortColumn; 8] = [
        SortColumn::CreatedAt,
        SortColumn::UpdatedAt,
        SortColumn::InvoiceDate,
        SortColumn::DueDate,
        SortColumn::InvoiceNumber,
        SortColumn::ClientName,
        SortColumn::Total,
        SortColumn::Status,
    ];

    /// Column name, also the accepted spelling in sort strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortColumn::CreatedAt => "created_at",
            SortColumn::UpdatedAt => "updated_at",
            SortColumn::InvoiceDate => "invoice_date",
            SortColumn::DueDate => "due_date",
            SortColumn::InvoiceNumber => "invoice_number",
            SortColumn::ClientName => "client_name",
            SortColumn::Total => "total",
            SortColumn::Status => "status",
        }
    }
}

/// Order for [`InvoiceRepository::list`], written `created_at` or
/// `-created_at` (descending).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceSort {
    pub column: SortColumn,
    pub descending: bool,
}

impl Default for InvoiceSort {
    /// Newest first.
    fn default() -> Self {
        InvoiceSort {
            column: SortColumn::CreatedAt,
            descending: true,
        }
    }
}

impl FromStr for InvoiceSort {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(InvoiceSort::default());
        }

        let (descending, name) = match s.strip_prefix('-') {
            Some(name) => (true, name),
            None => (false, s),
        };

        SortColumn::ALL
            .into_iter()
            .find(|column| column.as_str() == name)
            .map(|column| InvoiceSort { column, descending })
            .ok_or_else(|| DbError::InvalidSort(s.to_string()))
    }
}

impl fmt::Display for InvoiceSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descending {
            f.write_str("-")?;
        }
        f.write_str(self.column.as_str())
    }
}

impl InvoiceSort {
    fn order_by(&self) -> String {
        let direction = if self.descending { "DESC" } else { "ASC" };
        format!("{} {}, id {}", self.column.as_str(), direction, direction)
    }
}

// =============================================================================
// Row Mapping
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct InvoiceRow {
    id: String,
    invoice_number: String,
    client_name: String,
    client_email: Option<String>,
    client_address: Option<String>,
    invoice_date: Option<NaiveDate>,
    due_date: Option<NaiveDate>,
    currency: String,
    items: String,
    surcharges: String,
    tax_rate: f64,
    payment_terms: Option<String>,
    notes: Option<String>,
    status: InvoiceStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<InvoiceRow> for Invoice {
    type Error = DbError;

    fn try_from(row: InvoiceRow) -> Result<Self, Self::Error> {
        let items: Vec<LineItem> = serde_json::from_str(&row.items)?;
        let surcharges: Vec<Surcharge> = serde_json::from_str(&row.surcharges)?;

        Ok(Invoice::from(InvoiceInput {
            id: Some(row.id),
            invoice_number: Some(row.invoice_number),
            client_name: row.client_name,
            client_email: row.client_email,
            client_address: row.client_address,
            invoice_date: row.invoice_date,
            due_date: row.due_date,
            currency: Some(row.currency),
            payment_terms: row.payment_terms,
            notes: row.notes,
            status: row.status,
            items,
            surcharges,
            tax_rate: row.tax_rate,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        }))
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for invoice database operations.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    /// Creates a new InvoiceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    /// Inserts or updates an invoice and returns it as stored.
    ///
    /// `created_at` of an existing row is kept; `updated_at` becomes now.
    pub async fn save(&self, invoice: &Invoice) -> DbResult<Invoice> {
        debug!(id = %invoice.id, invoice_number = %invoice.invoice_number, "Saving invoice");

        let now = Utc::now();
        let totals = invoice.totals();
        let items = serde_json::to_string(invoice.items())?;
        let surcharges = serde_json::to_string(invoice.surcharges())?;

        sqlx::query(
            r#"
            INSERT INTO invoices (
                id, invoice_number, client_name, client_email, client_address,
                invoice_date, due_date, currency, items, surcharges, tax_rate,
                subtotal, tax_amount, surcharge_total, total,
                payment_terms, notes, status, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8, ?9, ?10, ?11,
                ?12, ?13, ?14, ?15,
                ?16, ?17, ?18, ?19, ?20
            )
            ON CONFLICT(id) DO UPDATE SET
                invoice_number = excluded.invoice_number,
                client_name = excluded.client_name,
                client_email = excluded.client_email,
                client_address = excluded.client_address,
                invoice_date = excluded.invoice_date,
                due_date = excluded.due_date,
                currency = excluded.currency,
                items = excluded.items,
                surcharges = excluded.surcharges,
                tax_rate = excluded.tax_rate,
                subtotal = excluded.subtotal,
                tax_amount = excluded.tax_amount,
                surcharge_total = excluded.surcharge_total,
                total = excluded.total,
                payment_terms = excluded.payment_terms,
                notes = excluded.notes,
                status = excluded.status,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&invoice.id)
        .bind(&invoice.invoice_number)
        .bind(&invoice.client_name)
        .bind(&invoice.client_email)
        .bind(&invoice.client_address)
        .bind(invoice.invoice_date)
        .bind(invoice.due_date)
        .bind(&invoice.currency)
        .bind(items)
        .bind(surcharges)
        .bind(invoice.tax_rate())
        .bind(totals.subtotal)
        .bind(totals.tax_amount)
        .bind(totals.surcharge_total)
        .bind(totals.total)
        .bind(&invoice.payment_terms)
        .bind(&invoice.notes)
        .bind(invoice.status)
        .bind(invoice.created_at)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_by_id(&invoice.id)
            .await?
            .ok_or_else(|| DbError::not_found("Invoice", &invoice.id))
    }

    /// Gets an invoice by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Invoice>> {
        let sql = format!("SELECT {} FROM invoices WHERE id = ?1", SELECT_COLUMNS);

        let row: Option<InvoiceRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Invoice::try_from).transpose()
    }

    /// Lists every invoice in the given order.
    pub async fn list(&self, sort: InvoiceSort) -> DbResult<Vec<Invoice>> {
        debug!(order = %sort, "Listing invoices");

        let sql = format!(
            "SELECT {} FROM invoices ORDER BY {}",
            SELECT_COLUMNS,
            sort.order_by()
        );

        let rows: Vec<InvoiceRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;

        rows.into_iter().map(Invoice::try_from).collect()
    }

    /// Changes the stored status of an invoice.
    pub async fn update_status(&self, id: &str, status: InvoiceStatus) -> DbResult<()> {
        debug!(id = %id, status = %status, "Updating invoice status");

        let result = sqlx::query("UPDATE invoices SET status = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(status)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Invoice", id));
        }

        Ok(())
    }

    /// Deletes an invoice.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting invoice");

        let result = sqlx::query("DELETE FROM invoices WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Invoice", id));
        }

        Ok(())
    }

    /// Counts stored invoices.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM invoices")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
