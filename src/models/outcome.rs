//! Tagged render outcomes.
//!
//! Degradation is an explicit state, not an exception: callers must match on
//! the outcome rather than treating "it still produced a file" as an error
//! that happened to carry data.

use thiserror::Error;

/// Reason a render stage (or the fallback) failed.
///
/// Carried inside [`RenderOutcome::Degraded`] and [`RenderOutcome::Failed`]
/// so callers can report what degraded without unwinding.
#[derive(Debug, Clone, Error)]
pub enum RenderFailure {
    #[error("template not found: {0}")]
    TemplateNotFound(String),

    #[error("template compile failed: {0}")]
    TemplateCompile(String),

    #[error("image load failed: {0}")]
    ImageLoad(String),

    #[error("rasterization failed: {0}")]
    Rasterization(String),

    #[error("document encoding failed: {0}")]
    Encoding(String),

    #[error("fallback rendering failed: {0}")]
    Fallback(String),
}

/// Final paginated document produced by a render call.
#[derive(Debug, Clone)]
pub struct DocumentArtifact {
    /// Deterministic file name derived from invoice number and template id.
    pub file_name: String,
    /// Encoded PDF bytes.
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// Result of `DocumentRenderer::render`.
#[derive(Debug)]
pub enum RenderOutcome {
    /// Templated path succeeded.
    Success {
        artifact: DocumentArtifact,
        page_count: usize,
    },
    /// Templated path failed; the text-only fallback document was produced.
    Degraded {
        artifact: DocumentArtifact,
        reason: RenderFailure,
    },
    /// Both the templated path and the fallback failed.
    Failed { reason: RenderFailure },
}

impl RenderOutcome {
    /// The artifact, if any path produced one.
    pub fn artifact(&self) -> Option<&DocumentArtifact> {
        match self {
            RenderOutcome::Success { artifact, .. } | RenderOutcome::Degraded { artifact, .. } => {
                Some(artifact)
            }
            RenderOutcome::Failed { .. } => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RenderOutcome::Success { .. })
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, RenderOutcome::Degraded { .. })
    }
}
