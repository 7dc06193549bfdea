//! Rasterizes mounted SVG markup into page-sized RGB buffers.

use crate::error::RenderError;
use crate::rendering::RenderSurface;
use resvg::usvg::{self, Transform};
use std::path::Path;
use std::sync::Arc;
use tiny_skia::Pixmap;

/// Upper bound on pages a single document may overflow into.
const MAX_PAGES: usize = 30;

/// One rasterized page: tightly packed 8-bit RGB rows.
pub struct RasterPage {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

/// Lays out SVG markup at page width and slices the result into page-height
/// raster bands.
pub struct SvgRasterizer {
    /// Font database for text rendering
    fontdb: Arc<fontdb::Database>,
}

impl SvgRasterizer {
    /// Create a rasterizer using system fonts only.
    pub fn new() -> Self {
        Self::with_font_dir(None)
    }

    /// Create a rasterizer loading fonts from a directory in addition to
    /// system fonts.
    pub fn with_font_dir(dir: Option<&Path>) -> Self {
        let mut fontdb = fontdb::Database::new();

        if let Some(dir) = dir {
            fontdb.load_fonts_dir(dir);
            tracing::debug!(dir = %dir.display(), "Loaded fonts directory");
        }
        fontdb.load_system_fonts();

        tracing::info!(font_count = fontdb.len(), "Loaded fonts for SVG text rendering");

        Self {
            fontdb: Arc::new(fontdb),
        }
    }

    /// Rasterize the surface's markup into one or more page buffers.
    ///
    /// The markup is scaled to fit the page width; content taller than one
    /// page continues onto subsequent pages. Alpha is composited against
    /// white since document pages have an opaque background.
    pub fn rasterize(&self, surface: &RenderSurface) -> Result<Vec<RasterPage>, RenderError> {
        let spec = surface.spec();

        let options = usvg::Options {
            fontdb: self.fontdb.clone(),
            ..Default::default()
        };
        let tree = usvg::Tree::from_data(surface.markup().as_bytes(), &options)
            .map_err(|e| RenderError::SvgParse(e.to_string()))?;

        let svg_size = tree.size();
        if svg_size.width() <= 0.0 || svg_size.height() <= 0.0 {
            return Err(RenderError::SvgParse("markup has zero size".to_string()));
        }

        let scale = spec.width as f32 / svg_size.width();
        let content_height = (svg_size.height() * scale).ceil().max(1.0) as u32;
        let page_count = content_height.div_ceil(spec.height).max(1) as usize;
        if page_count > MAX_PAGES {
            return Err(RenderError::TooManyPages {
                pages: page_count,
                max: MAX_PAGES,
            });
        }

        let mut pixmap = Pixmap::new(spec.width, spec.height * page_count as u32)
            .ok_or(RenderError::PixmapAllocation)?;
        pixmap.fill(tiny_skia::Color::WHITE);

        let transform = Transform::from_scale(scale, scale);
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        tracing::debug!(
            surface = surface.id(),
            pages = page_count,
            content_height,
            "Rasterized document"
        );

        Ok(slice_pages(&pixmap, spec.width, spec.height))
    }
}

impl Default for SvgRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Split a tall pixmap into page-height bands of RGB rows.
fn slice_pages(pixmap: &Pixmap, width: u32, page_height: u32) -> Vec<RasterPage> {
    let row_bytes = width as usize * 4;
    let total_rows = pixmap.height() as usize;
    let data = pixmap.data();

    (0..total_rows)
        .step_by(page_height as usize)
        .map(|top| {
            let rows = (total_rows - top).min(page_height as usize);
            let band = &data[top * row_bytes..(top + rows) * row_bytes];
            RasterPage {
                width,
                height: rows as u32,
                rgb: rgba_to_rgb8(band),
            }
        })
        .collect()
}

/// Convert premultiplied RGBA pixel data to RGB8, compositing against white.
///
/// For premultiplied color `c` and alpha `a`, white shows through as
/// `255 - a`, so the composite is `c + (255 - a)`.
fn rgba_to_rgb8(rgba: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
    for pixel in rgba.chunks_exact(4) {
        let (r, g, b, a) = (pixel[0], pixel[1], pixel[2], pixel[3]);
        if a == 255 {
            rgb.extend_from_slice(&[r, g, b]);
        } else {
            let white = 255 - a;
            rgb.extend_from_slice(&[
                r.saturating_add(white),
                g.saturating_add(white),
                b.saturating_add(white),
            ]);
        }
    }
    rgb
}
