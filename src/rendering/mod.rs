pub mod pdf;
pub mod surface;
pub mod svg_raster;

pub use pdf::{encode_raster_document, TextDocument};
pub use surface::{RenderSurface, SurfaceRegistry};
pub use svg_raster::{RasterPage, SvgRasterizer};
