pub mod config;
pub mod invoice;
pub mod outcome;
pub mod page_spec;

pub use config::{AppConfig, ImageErrorPolicy, ImagePolicy, PageConfig, TemplateSourceConfig};
pub use invoice::{format_amount, InvoiceDocument, InvoiceStatus, Issuer, LineItem, Recipient};
pub use outcome::{DocumentArtifact, RenderFailure, RenderOutcome};
pub use page_spec::PageSpec;
