//! Template-free fallback document construction.
//!
//! Produces a plain text PDF directly from the invoice record: a header
//! block followed by one line per item, paginating on overflow. This path
//! makes no network calls and needs nothing beyond the fields already on
//! the record, so it stays available when every templated stage has failed.

use crate::error::RenderError;
use crate::models::{format_amount, DocumentArtifact, InvoiceDocument};
use crate::rendering::pdf::{wrap_text_lines, TextDocument};
use crate::services::artifact::artifact_file_name;

const HEADER_SIZE: f32 = 16.0;
const BODY_SIZE: f32 = 10.0;
const WRAP_CHARS: usize = 72;

/// Builds the text-only degraded document.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackDocumentBuilder;

impl FallbackDocumentBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build the fallback artifact for an invoice.
    ///
    /// The only failure mode is document encoding itself; that error is
    /// surfaced, never swallowed.
    pub fn build(
        &self,
        invoice: &InvoiceDocument,
        template_id: &str,
    ) -> Result<DocumentArtifact, RenderError> {
        let mut doc = TextDocument::new(&format!("Invoice {}", invoice.invoice_number))?;

        let lines = Self::compose_lines(invoice);
        for (idx, line) in lines.iter().enumerate() {
            if line.is_empty() {
                doc.gap(4.0);
            } else if idx == 0 {
                doc.line(line, HEADER_SIZE, true);
                doc.gap(2.0);
            } else {
                doc.line(line, BODY_SIZE, false);
            }
        }

        let (bytes, page_count) = doc.finish()?;
        tracing::debug!(
            invoice = %invoice.invoice_number,
            pages = page_count,
            "Built fallback document"
        );

        Ok(DocumentArtifact {
            file_name: artifact_file_name(&invoice.invoice_number, template_id),
            bytes,
            page_count,
        })
    }

    /// The ordered text content of the fallback document.
    ///
    /// Empty strings mark paragraph gaps. Exposed so tests can assert on
    /// content without decoding the PDF.
    pub fn compose_lines(invoice: &InvoiceDocument) -> Vec<String> {
        let mut lines = Vec::new();

        lines.push(format!("INVOICE {}", invoice.invoice_number));
        lines.push(String::new());

        if let Some(recipient) = &invoice.recipient {
            lines.push(format!("Billed to: {}", recipient.name));
            if let Some(address) = &recipient.address {
                lines.extend(wrap_text_lines(address, WRAP_CHARS));
            }
        }
        if let Some(issuer) = &invoice.issuer {
            lines.push(format!("Issued by: {}", issuer.company_name));
            if let Some(bank) = &issuer.bank_details {
                lines.push(format!("Bank: {bank}"));
            }
        }

        lines.push(format!("Status: {}", invoice.status.as_str()));
        lines.push(format!("Issued: {}", invoice.issue_date.format("%Y-%m-%d")));
        lines.push(format!("Due: {}", invoice.due_date.format("%Y-%m-%d")));
        lines.push(format!(
            "Amount due: {} {}",
            invoice.currency,
            format_amount(&invoice.amount)
        ));
        lines.push(String::new());

        if !invoice.items.is_empty() {
            lines.push("Items".to_string());
            for item in &invoice.items {
                let prefix = format!(
                    "{} x {} = {}  ",
                    item.quantity,
                    format_amount(&item.unit_price),
                    format_amount(&item.amount())
                );
                let wrapped = wrap_text_lines(&item.description, WRAP_CHARS);
                match wrapped.split_first() {
                    Some((first, rest)) => {
                        lines.push(format!("{prefix}{first}"));
                        for cont in rest {
                            lines.push(format!("    {cont}"));
                        }
                    }
                    None => lines.push(prefix.trim_end().to_string()),
                }
            }
        }

        lines
    }
}
