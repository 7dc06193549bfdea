//! Invoice domain records handed to the rendering and aggregation pipeline.
//!
//! These records are owned by the caller; the renderer borrows them for the
//! duration of one render call and retains nothing afterwards.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Invoice lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Pending,
    Paid,
    Overdue,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "pending" => InvoiceStatus::Pending,
            "paid" => InvoiceStatus::Paid,
            "overdue" => InvoiceStatus::Overdue,
            _ => InvoiceStatus::Draft,
        }
    }
}

/// Line item on an invoice.
///
/// The line amount is always derived from quantity and unit price; it is
/// intentionally not a stored field, so it can never drift from its inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl LineItem {
    pub fn new(description: impl Into<String>, quantity: u32, unit_price: Decimal) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price,
        }
    }

    /// Derived line amount: quantity x unit price.
    pub fn amount(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }
}

/// Receiving party of an invoice.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Recipient {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Issuing party of an invoice.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Issuer {
    pub company_name: String,
    #[serde(default)]
    pub address: Option<String>,
    /// Remote logo image reference, resolved during rendering.
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub bank_details: Option<String>,
    #[serde(default)]
    pub tax_rate: Option<Decimal>,
}

/// Invoice document record.
///
/// `amount` is the authoritative total and is independent of the item sum:
/// some upstream flows compute it server-side, so consumers must not assume
/// `amount == sum(items)`. Use [`InvoiceDocument::items_total`] when the item
/// sum itself is wanted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceDocument {
    pub invoice_number: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    /// ISO-4217-like currency code of `amount` and every unit price.
    pub currency: String,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub recipient: Option<Recipient>,
    #[serde(default)]
    pub issuer: Option<Issuer>,
    pub status: InvoiceStatus,
    pub amount: Decimal,
}

impl InvoiceDocument {
    /// Sum of the derived line amounts. Not the authoritative total.
    pub fn items_total(&self) -> Decimal {
        self.items.iter().map(LineItem::amount).sum()
    }
}

/// Format an amount for display: two fractional digits, thousands separators.
///
/// Presentation-boundary only; all arithmetic stays on [`Decimal`].
pub fn format_amount(amount: &Decimal) -> String {
    let s = format!("{:.2}", amount.round_dp(2));
    let (int_part, dec_part) = match s.split_once('.') {
        Some((i, d)) => (i, d),
        None => (s.as_str(), "00"),
    };
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", int_part),
    };

    let mut grouped = String::new();
    let chars: Vec<char> = digits.chars().collect();
    for (i, ch) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*ch);
    }

    format!("{}{}.{}", sign, grouped, dec_part)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_line_item_amount_is_derived() {
        let item = LineItem::new("Consulting", 3, dec("150.50"));
        assert_eq!(item.amount(), dec("451.50"));
    }

    #[test]
    fn test_items_total_sums_derived_amounts() {
        let invoice = InvoiceDocument {
            invoice_number: "INV-001".to_string(),
            issue_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
            currency: "USD".to_string(),
            items: vec![
                LineItem::new("Design", 2, dec("100")),
                LineItem::new("Hosting", 1, dec("25.50")),
            ],
            recipient: None,
            issuer: None,
            status: InvoiceStatus::Pending,
            // Deliberately different from the item sum.
            amount: dec("500"),
        };

        assert_eq!(invoice.items_total(), dec("225.50"));
        assert_eq!(invoice.amount, dec("500"));
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            InvoiceStatus::Draft,
            InvoiceStatus::Pending,
            InvoiceStatus::Paid,
            InvoiceStatus::Overdue,
        ] {
            assert_eq!(InvoiceStatus::from_string(status.as_str()), status);
        }
    }

    #[test]
    fn test_status_from_unknown_string_defaults_to_draft() {
        assert_eq!(InvoiceStatus::from_string("archived"), InvoiceStatus::Draft);
    }

    #[test]
    fn test_format_amount_groups_thousands() {
        assert_eq!(format_amount(&dec("1234567.8")), "1,234,567.80");
        assert_eq!(format_amount(&dec("999")), "999.00");
        assert_eq!(format_amount(&dec("0")), "0.00");
        assert_eq!(format_amount(&dec("-1234.5")), "-1,234.50");
    }

    #[test]
    fn test_format_amount_rounds_to_minor_units() {
        assert_eq!(format_amount(&dec("10.005")), "10.00");
        assert_eq!(format_amount(&dec("10.015")), "10.02");
    }

    #[test]
    fn test_deserialize_invoice_json() {
        let json = r#"{
            "invoice_number": "INV-42",
            "issue_date": "2025-06-01",
            "due_date": "2025-07-01",
            "currency": "NGN",
            "items": [{"description": "Widget", "quantity": 4, "unit_price": "12.25"}],
            "status": "paid",
            "amount": "49.00"
        }"#;

        let invoice: InvoiceDocument = serde_json::from_str(json).unwrap();
        assert_eq!(invoice.invoice_number, "INV-42");
        assert_eq!(invoice.status, InvoiceStatus::Paid);
        assert_eq!(invoice.items.len(), 1);
        assert_eq!(invoice.items[0].amount(), dec("49.00"));
        assert!(invoice.recipient.is_none());
    }
}
