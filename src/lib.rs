//! Folio - invoice document generation and financial aggregation.
//!
//! Turns structured invoice records into paginated PDF artifacts through
//! swappable SVG templates (with a template-free fallback path), and computes
//! multi-currency financial summaries over invoice collections.
//! This library exposes modules for integration testing.

pub mod assets;
pub mod error;
pub mod models;
pub mod rendering;
pub mod services;

// Currency conversion is its own crate; re-exported so callers reach the
// full `render` / `aggregate` / `convert` surface through one dependency.
pub use money_fx;
