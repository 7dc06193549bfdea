//! Financial aggregation over invoice collections.
//!
//! Snapshots are recomputed wholesale from the full collection on every
//! relevant input change; there is no incremental update path, so the
//! snapshot can never drift from its inputs. Collections in this domain are
//! page-bounded, which keeps the O(n) recompute cheap.

use crate::models::{InvoiceDocument, InvoiceStatus};
use money_fx::{convert, RateTable};
use rust_decimal::Decimal;
use serde::Serialize;

/// Aggregated view of an invoice collection in one display currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub total: u32,
    pub paid: u32,
    pub pending: u32,
    pub overdue: u32,
    /// Sum of all amounts, converted to the display currency where a rate
    /// exists.
    pub total_amount: Decimal,
    /// Sum of paid amounts, converted like `total_amount`.
    pub paid_amount: Decimal,
    /// Invoices whose amount passed through without a conversion rate.
    /// Non-zero means the totals are not fully denominated in the display
    /// currency.
    pub unconverted: u32,
}

impl StatsSnapshot {
    pub fn empty() -> Self {
        Self {
            total: 0,
            paid: 0,
            pending: 0,
            overdue: 0,
            total_amount: Decimal::ZERO,
            paid_amount: Decimal::ZERO,
            unconverted: 0,
        }
    }
}

/// Compute a snapshot of `invoices` in `display_currency`.
///
/// Single pass; never fails. Amounts with no available rate are added
/// unconverted and counted in [`StatsSnapshot::unconverted`].
pub fn aggregate(
    invoices: &[InvoiceDocument],
    display_currency: &str,
    table: &RateTable,
) -> StatsSnapshot {
    let mut snapshot = StatsSnapshot::empty();

    for invoice in invoices {
        snapshot.total += 1;
        match invoice.status {
            InvoiceStatus::Paid => snapshot.paid += 1,
            InvoiceStatus::Pending => snapshot.pending += 1,
            InvoiceStatus::Overdue => snapshot.overdue += 1,
            InvoiceStatus::Draft => {}
        }

        let conversion = convert(invoice.amount, &invoice.currency, display_currency, table);
        if !conversion.converted {
            snapshot.unconverted += 1;
        }

        snapshot.total_amount += conversion.amount;
        if invoice.status == InvoiceStatus::Paid {
            snapshot.paid_amount += conversion.amount;
        }
    }

    tracing::debug!(
        invoices = snapshot.total,
        unconverted = snapshot.unconverted,
        currency = display_currency,
        "Aggregated invoice collection"
    );

    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn invoice(number: &str, currency: &str, amount: &str, status: InvoiceStatus) -> InvoiceDocument {
        InvoiceDocument {
            invoice_number: number.to_string(),
            issue_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
            currency: currency.to_string(),
            items: vec![],
            recipient: None,
            issuer: None,
            status,
            amount: dec(amount),
        }
    }

    #[test]
    fn test_empty_collection_is_all_zero() {
        let snapshot = aggregate(&[], "NGN", &RateTable::new());
        assert_eq!(snapshot, StatsSnapshot::empty());
    }

    #[test]
    fn test_mixed_currency_collection() {
        // 1000 NGN paid + 10 USD pending at USD->NGN = 800
        let invoices = vec![
            invoice("A", "NGN", "1000", InvoiceStatus::Paid),
            invoice("B", "USD", "10", InvoiceStatus::Pending),
        ];
        let table = RateTable::new().with_rate("USD", "NGN", dec("800")).unwrap();

        let snapshot = aggregate(&invoices, "NGN", &table);

        assert_eq!(snapshot.total, 2);
        assert_eq!(snapshot.paid, 1);
        assert_eq!(snapshot.pending, 1);
        assert_eq!(snapshot.overdue, 0);
        assert_eq!(snapshot.total_amount, dec("9000"));
        assert_eq!(snapshot.paid_amount, dec("1000"));
        assert_eq!(snapshot.unconverted, 0);
    }

    #[test]
    fn test_missing_rate_counts_as_unconverted() {
        let invoices = vec![
            invoice("A", "NGN", "1000", InvoiceStatus::Paid),
            invoice("B", "EUR", "10", InvoiceStatus::Pending),
        ];

        let snapshot = aggregate(&invoices, "NGN", &RateTable::new());

        // EUR amount passes through unchanged and is flagged.
        assert_eq!(snapshot.total_amount, dec("1010"));
        assert_eq!(snapshot.unconverted, 1);
    }

    #[test]
    fn test_draft_counts_in_total_only() {
        let invoices = vec![invoice("A", "USD", "100", InvoiceStatus::Draft)];
        let snapshot = aggregate(&invoices, "USD", &RateTable::new());

        assert_eq!(snapshot.total, 1);
        assert_eq!(snapshot.paid + snapshot.pending + snapshot.overdue, 0);
        assert_eq!(snapshot.total_amount, dec("100"));
        assert_eq!(snapshot.paid_amount, dec("0"));
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let invoices = vec![
            invoice("A", "NGN", "1000", InvoiceStatus::Paid),
            invoice("B", "USD", "10", InvoiceStatus::Overdue),
        ];
        let table = RateTable::new().with_rate("USD", "NGN", dec("800")).unwrap();

        let first = aggregate(&invoices, "NGN", &table);
        let second = aggregate(&invoices, "NGN", &table);
        assert_eq!(first, second);
    }

    #[test]
    fn test_repeated_fractional_sums_stay_exact() {
        let invoices: Vec<_> = (0..100)
            .map(|i| invoice(&format!("I{i}"), "USD", "0.10", InvoiceStatus::Paid))
            .collect();

        let snapshot = aggregate(&invoices, "USD", &RateTable::new());
        assert_eq!(snapshot.total_amount, dec("10.00"));
        assert_eq!(snapshot.paid_amount, dec("10.00"));
    }
}
