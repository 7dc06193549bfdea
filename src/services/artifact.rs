//! Artifact naming, local save and share-target hand-off.
//!
//! The renderer itself never persists or publishes anything; callers decide
//! what happens to the produced artifact.

use crate::models::{format_amount, DocumentArtifact, InvoiceDocument};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ShareError {
    #[error("Share delivery failed: {0}")]
    Delivery(String),
}

/// Deterministic artifact file name for an invoice/template pair.
pub fn artifact_file_name(invoice_number: &str, template_id: &str) -> String {
    format!(
        "invoice-{}-{}.pdf",
        sanitize_component(invoice_number),
        sanitize_component(template_id)
    )
}

fn sanitize_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        let ok = ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == '.';
        out.push(if ok { ch } else { '_' });
    }
    let trimmed = out.trim_matches('_').to_string();
    if trimmed.is_empty() {
        "document".to_string()
    } else {
        trimmed
    }
}

/// Writes artifacts into a configured output directory.
pub struct ArtifactStore {
    output_dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    /// Save the artifact under its deterministic name; returns the path.
    pub async fn save(&self, artifact: &DocumentArtifact) -> Result<PathBuf, ArtifactError> {
        tokio::fs::create_dir_all(&self.output_dir).await?;
        let path = self.output_dir.join(&artifact.file_name);
        tokio::fs::write(&path, &artifact.bytes).await?;

        tracing::info!(
            path = %path.display(),
            bytes = artifact.bytes.len(),
            pages = artifact.page_count,
            "Saved artifact"
        );
        Ok(path)
    }
}

/// Platform share destination for a rendered document.
#[async_trait]
pub trait ShareTarget: Send + Sync {
    /// Hand over the artifact with a title and descriptive text.
    async fn deliver(
        &self,
        artifact: &DocumentArtifact,
        title: &str,
        text: &str,
    ) -> Result<(), ShareError>;
}

/// Share an invoice artifact with a deterministic title and description.
pub async fn share_invoice(
    target: &dyn ShareTarget,
    artifact: &DocumentArtifact,
    invoice: &InvoiceDocument,
) -> Result<(), ShareError> {
    let title = format!("Invoice {}", invoice.invoice_number);
    let text = format!(
        "Invoice {} for {} {} ({} page document)",
        invoice.invoice_number,
        invoice.currency,
        format_amount(&invoice.amount),
        artifact.page_count
    );
    target.deliver(artifact, &title, &text).await
}
