pub mod artifact;
pub mod document_renderer;
pub mod fallback;
pub mod image_loader;
pub mod stats_aggregator;
pub mod template_registry;

pub use artifact::{
    artifact_file_name, share_invoice, ArtifactError, ArtifactStore, ShareError, ShareTarget,
};
pub use document_renderer::DocumentRenderer;
pub use fallback::FallbackDocumentBuilder;
pub use image_loader::{ImageError, ImageLoader};
pub use stats_aggregator::{aggregate, StatsSnapshot};
pub use template_registry::{
    BundledTemplateSource, CompiledTemplate, HttpTemplateSource, TemplateError, TemplateRegistry,
    TemplateSource,
};
