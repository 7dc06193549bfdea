//! Render orchestration: template resolution through artifact encoding.
//!
//! Every stage failure is caught at this boundary and converted into a
//! fallback attempt; only total failure (templated path and fallback both
//! failing) surfaces as `Failed`.

use crate::error::RenderError;
use crate::models::{AppConfig, DocumentArtifact, InvoiceDocument, PageSpec, RenderFailure, RenderOutcome};
use crate::rendering::{RenderSurface, SvgRasterizer};
use crate::services::artifact::artifact_file_name;
use crate::services::fallback::FallbackDocumentBuilder;
use crate::services::image_loader::ImageLoader;
use crate::services::template_registry::{TemplateError, TemplateRegistry};
use std::sync::Arc;

/// Distinguishes which blocking stage failed once the pipeline has left the
/// async boundary.
enum StageError {
    Raster(RenderError),
    Encode(RenderError),
}

/// Orchestrates the templated document pipeline with guaranteed fallback.
pub struct DocumentRenderer {
    spec: PageSpec,
    registry: Arc<TemplateRegistry>,
    rasterizer: Arc<SvgRasterizer>,
    images: ImageLoader,
    fallback: FallbackDocumentBuilder,
}

impl DocumentRenderer {
    pub fn new(
        config: &AppConfig,
        registry: Arc<TemplateRegistry>,
        rasterizer: Arc<SvgRasterizer>,
    ) -> Self {
        Self {
            spec: config.page.spec(),
            registry,
            rasterizer,
            images: ImageLoader::new(&config.images),
            fallback: FallbackDocumentBuilder::new(),
        }
    }

    /// Render an invoice through the named template.
    ///
    /// The invoice is borrowed for the duration of the call only. Each call
    /// owns an independent render surface, so concurrent calls never share
    /// layout state.
    pub async fn render(&self, template_id: &str, invoice: &InvoiceDocument) -> RenderOutcome {
        match self.render_templated(template_id, invoice).await {
            Ok(artifact) => {
                tracing::info!(
                    invoice = %invoice.invoice_number,
                    template = template_id,
                    pages = artifact.page_count,
                    "Rendered invoice document"
                );
                RenderOutcome::Success {
                    page_count: artifact.page_count,
                    artifact,
                }
            }
            Err(reason) => {
                tracing::warn!(
                    invoice = %invoice.invoice_number,
                    template = template_id,
                    %reason,
                    "Templated render failed, building fallback document"
                );
                match self.fallback.build(invoice, template_id) {
                    Ok(artifact) => RenderOutcome::Degraded { artifact, reason },
                    Err(e) => {
                        tracing::error!(
                            invoice = %invoice.invoice_number,
                            error = %e,
                            "Fallback document failed"
                        );
                        RenderOutcome::Failed {
                            reason: RenderFailure::Fallback(e.to_string()),
                        }
                    }
                }
            }
        }
    }

    async fn render_templated(
        &self,
        template_id: &str,
        invoice: &InvoiceDocument,
    ) -> Result<DocumentArtifact, RenderFailure> {
        // 1-2. Resolve the template and compile markup from the invoice.
        self.registry.load(&[template_id]).await;
        let markup = self
            .registry
            .render(template_id, invoice)
            .map_err(|e| match e {
                TemplateError::NotFound(id) => RenderFailure::TemplateNotFound(id),
                e => RenderFailure::TemplateCompile(e.to_string()),
            })?;

        // 3. Mount the markup on a surface scoped to this call. From here on
        // the surface is released on every exit path via Drop.
        let mut surface = RenderSurface::acquire(self.spec, markup);

        // 4a. Wait for embedded images, bounded by the configured timeout.
        let resolved = self
            .images
            .resolve(surface.markup())
            .await
            .map_err(|e| RenderFailure::ImageLoad(e.to_string()))?;
        surface.set_markup(resolved);

        // 4b. Rasterize and encode off the async runtime; the surface moves
        // into the blocking task and is dropped there whatever happens.
        let rasterizer = self.rasterizer.clone();
        let spec = self.spec;
        let title = format!("Invoice {}", invoice.invoice_number);
        let joined = tokio::task::spawn_blocking(move || {
            let pages = rasterizer.rasterize(&surface).map_err(StageError::Raster)?;
            let bytes = crate::rendering::pdf::encode_raster_document(&title, &pages, spec.dpi)
                .map_err(StageError::Encode)?;
            spec.validate_size(bytes.len()).map_err(StageError::Encode)?;
            Ok::<_, StageError>((bytes, pages.len()))
        })
        .await;

        let (bytes, page_count) = match joined {
            Ok(Ok(result)) => result,
            Ok(Err(StageError::Raster(e))) => return Err(RenderFailure::Rasterization(e.to_string())),
            Ok(Err(StageError::Encode(e))) => return Err(RenderFailure::Encoding(e.to_string())),
            Err(e) => return Err(RenderFailure::Rasterization(format!("render task failed: {e}"))),
        };

        Ok(DocumentArtifact {
            file_name: artifact_file_name(&invoice.invoice_number, template_id),
            bytes,
            page_count,
        })
    }
}
