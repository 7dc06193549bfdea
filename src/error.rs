use thiserror::Error;

/// Errors raised while turning markup into a paginated binary document.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("SVG parse error: {0}")]
    SvgParse(String),

    #[error("Failed to allocate pixmap")]
    PixmapAllocation,

    #[error("Content overflows {pages} pages (max {max})")]
    TooManyPages { pages: usize, max: usize },

    #[error("Artifact too large: {size} bytes (max {max})")]
    ArtifactTooLarge { size: usize, max: usize },

    #[error("PDF encode error: {0}")]
    PdfEncode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
