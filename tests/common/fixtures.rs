//! Invoice fixtures shared across integration tests.

use chrono::NaiveDate;
use folio::models::{InvoiceDocument, InvoiceStatus, Issuer, LineItem, Recipient};
use rust_decimal::Decimal;

pub fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

/// A representative invoice with recipient, issuer and a few items.
pub fn sample_invoice() -> InvoiceDocument {
    InvoiceDocument {
        invoice_number: "INV-2025-0042".to_string(),
        issue_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        due_date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
        currency: "USD".to_string(),
        items: vec![
            LineItem::new("Platform subscription (annual)", 1, dec("1200")),
            LineItem::new("Priority support hours", 10, dec("85.50")),
            LineItem::new("Custom onboarding workshop", 2, dec("400")),
        ],
        recipient: Some(Recipient {
            name: "Acme Industries".to_string(),
            email: Some("billing@acme.example".to_string()),
            phone: None,
            address: Some("12 Harbour Road, Lagos".to_string()),
        }),
        issuer: Some(Issuer {
            company_name: "Folio Ltd".to_string(),
            address: Some("1 Fleet Street, London".to_string()),
            logo_url: None,
            bank_details: Some("GTB 0123456789".to_string()),
            tax_rate: Some(dec("7.5")),
        }),
        status: InvoiceStatus::Pending,
        amount: dec("2855.00"),
    }
}

/// Invoice with a remote logo reference, for image-resolution tests.
pub fn invoice_with_logo(logo_url: &str) -> InvoiceDocument {
    let mut invoice = sample_invoice();
    if let Some(issuer) = invoice.issuer.as_mut() {
        issuer.logo_url = Some(logo_url.to_string());
    }
    invoice
}

/// Small status/currency matrix used by aggregation tests.
pub fn stats_invoices() -> Vec<InvoiceDocument> {
    let base = sample_invoice();

    let mut ngn_paid = base.clone();
    ngn_paid.invoice_number = "INV-NGN-1".to_string();
    ngn_paid.currency = "NGN".to_string();
    ngn_paid.amount = dec("1000");
    ngn_paid.status = InvoiceStatus::Paid;

    let mut usd_pending = base.clone();
    usd_pending.invoice_number = "INV-USD-1".to_string();
    usd_pending.currency = "USD".to_string();
    usd_pending.amount = dec("10");
    usd_pending.status = InvoiceStatus::Pending;

    vec![ngn_paid, usd_pending]
}

/// Minimal single-page SVG template used by remote-source mocks.
pub fn simple_template() -> &'static str {
    r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 1240 1754" width="1240" height="1754">
  <rect width="1240" height="1754" fill="white"/>
  <text x="70" y="100" font-family="sans-serif" font-size="40">Invoice {{ invoice_number }}</text>
  <text x="70" y="160" font-family="sans-serif" font-size="24">{{ currency }} {{ amount | money }}</text>
  {% for item in items %}
  <text x="70" y="{{ 240 + loop.index0 * 30 }}" font-family="sans-serif" font-size="18">{{ item.description | escape }}</text>
  {% endfor %}
</svg>"#
}

/// Template whose rendered output is not valid SVG, to force a
/// rasterization failure after the surface is mounted.
pub fn broken_markup_template() -> &'static str {
    "{{ invoice_number }} is not svg markup at all"
}

/// Template embedding a remote image.
pub fn template_with_image(image_url: &str) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 1240 1754" width="1240" height="1754">
  <rect width="1240" height="1754" fill="white"/>
  <text x="70" y="100" font-family="sans-serif" font-size="40">{{{{ invoice_number }}}}</text>
  <image href="{image_url}" x="70" y="200" width="200" height="200"/>
</svg>"#
    )
}
