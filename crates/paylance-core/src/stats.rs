//! Dashboard statistics over a set of invoices.

use chrono::NaiveDate;
use serde::Serialize;
use ts_rs::TS;

use crate::invoice::Invoice;
use crate::types::InvoiceStatus;

/// Headline figures for the invoice list.
///
/// Amounts are summed across currencies as plain numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct DashboardStats {
    /// Number of invoices.
    pub total: usize,
    /// Sum of totals of paid invoices.
    pub revenue: f64,
    /// Sum of totals of sent and draft invoices.
    pub pending: f64,
    /// Unpaid invoices whose due date has passed.
    pub overdue: usize,
}

/// Whether an unpaid invoice is past its due date.
pub fn is_overdue(invoice: &Invoice, today: NaiveDate) -> bool {
    invoice.status != InvoiceStatus::Paid && invoice.due_date.is_some_and(|due| due < today)
}

/// The status to display: paid stays paid, a passed due date shows as
/// overdue, everything else shows as stored.
pub fn effective_status(invoice: &Invoice, today: NaiveDate) -> InvoiceStatus {
    if is_overdue(invoice, today) {
        InvoiceStatus::Overdue
    } else {
        invoice.status
    }
}

/// Computes dashboard figures. Pending uses the stored status.
pub fn dashboard_stats<'a>(
    invoices: impl IntoIterator<Item = &'a Invoice>,
    today: NaiveDate,
) -> DashboardStats {
    invoices
        .into_iter()
        .fold(DashboardStats::default(), |mut stats, invoice| {
            stats.total += 1;
            match invoice.status {
                InvoiceStatus::Paid => stats.revenue += invoice.totals().total,
                InvoiceStatus::Sent | InvoiceStatus::Draft => {
                    stats.pending += invoice.totals().total
                }
                InvoiceStatus::Overdue => {}
            }
            if is_overdue(invoice, today) {
                stats.overdue += 1;
            }
            stats
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LineItem;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn invoice(status: InvoiceStatus, total: f64, due: Option<NaiveDate>) -> Invoice {
        let mut invoice = Invoice::new();
        invoice.add_item(LineItem::new("Work", 1.0, total));
        invoice.status = status;
        invoice.due_date = due;
        invoice
    }

    #[test]
    fn test_effective_status() {
        let today = day(15);
        assert_eq!(
            effective_status(&invoice(InvoiceStatus::Paid, 1.0, Some(day(1))), today),
            InvoiceStatus::Paid
        );
        assert_eq!(
            effective_status(&invoice(InvoiceStatus::Sent, 1.0, Some(day(14))), today),
            InvoiceStatus::Overdue
        );
        // Due today is not overdue yet
        assert_eq!(
            effective_status(&invoice(InvoiceStatus::Sent, 1.0, Some(today)), today),
            InvoiceStatus::Sent
        );
        assert_eq!(
            effective_status(&invoice(InvoiceStatus::Draft, 1.0, None), today),
            InvoiceStatus::Draft
        );
    }

    #[test]
    fn test_dashboard_stats() {
        let invoices = vec![
            invoice(InvoiceStatus::Paid, 500.0, Some(day(1))),
            invoice(InvoiceStatus::Paid, 250.0, None),
            invoice(InvoiceStatus::Sent, 100.0, Some(day(10))),
            invoice(InvoiceStatus::Draft, 40.0, Some(day(20))),
            invoice(InvoiceStatus::Overdue, 70.0, Some(day(2))),
        ];

        let stats = dashboard_stats(&invoices, day(15));
        assert_eq!(stats.total, 5);
        assert_eq!(stats.revenue, 750.0);
        assert_eq!(stats.pending, 140.0);
        assert_eq!(stats.overdue, 2);
    }

    #[test]
    fn test_empty_stats() {
        assert_eq!(dashboard_stats(&[], day(1)), DashboardStats::default());
    }
}
