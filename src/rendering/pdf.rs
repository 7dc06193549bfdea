//! Binary document encoding: raster pages or plain text lines into a single
//! paginated PDF sized to A4.

use crate::error::RenderError;
use crate::rendering::RasterPage;
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference,
};

const PAGE_W_MM: f32 = 210.0;
const PAGE_H_MM: f32 = 297.0;
const MM_PER_INCH: f32 = 25.4;

/// Encode rasterized pages into one PDF, one raster band per page.
///
/// Bands are placed at their physical size (raster pixels at the rendering
/// DPI), top-aligned so a partial last band sits at the top of its page.
pub fn encode_raster_document(
    title: &str,
    pages: &[RasterPage],
    dpi: f32,
) -> Result<Vec<u8>, RenderError> {
    if pages.is_empty() {
        return Err(RenderError::PdfEncode("no raster pages to encode".to_string()));
    }

    let (doc, page1, layer1) = PdfDocument::new(title, Mm(PAGE_W_MM), Mm(PAGE_H_MM), "Layer 1");

    for (idx, page) in pages.iter().enumerate() {
        let layer = if idx == 0 {
            doc.get_page(page1).get_layer(layer1)
        } else {
            let (page_idx, layer_idx) =
                doc.add_page(Mm(PAGE_W_MM), Mm(PAGE_H_MM), format!("Page {}, Layer 1", idx + 1));
            doc.get_page(page_idx).get_layer(layer_idx)
        };

        let buffer = printpdf::image_crate::ImageBuffer::<printpdf::image_crate::Rgb<u8>, Vec<u8>>::from_raw(
            page.width,
            page.height,
            page.rgb.clone(),
        )
        .ok_or_else(|| RenderError::PdfEncode("raster buffer size mismatch".to_string()))?;
        let dynamic = printpdf::image_crate::DynamicImage::ImageRgb8(buffer);

        let band_h_mm = page.height as f32 / dpi * MM_PER_INCH;
        let image = Image::from_dynamic_image(&dynamic);
        image.add_to_layer(
            layer,
            ImageTransform {
                translate_x: Some(Mm(0.0)),
                translate_y: Some(Mm((PAGE_H_MM - band_h_mm).max(0.0))),
                rotate: None,
                scale_x: None,
                scale_y: None,
                dpi: Some(dpi),
            },
        );
    }

    save_to_bytes(doc)
}

/// Incrementally written text-only PDF with automatic page breaks.
///
/// Used by the fallback path: no template, no images, builtin fonts only.
pub struct TextDocument {
    doc: PdfDocumentReference,
    font: IndirectFontRef,
    font_bold: IndirectFontRef,
    layer: PdfLayerReference,
    y: f32,
    page_count: usize,
}

impl TextDocument {
    const MARGIN_X: f32 = 15.0;
    const MARGIN_TOP: f32 = 18.0;
    const MARGIN_BOTTOM: f32 = 15.0;

    pub fn new(title: &str) -> Result<Self, RenderError> {
        let (doc, page1, layer1) = PdfDocument::new(title, Mm(PAGE_W_MM), Mm(PAGE_H_MM), "Layer 1");
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| RenderError::PdfEncode(e.to_string()))?;
        let font_bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| RenderError::PdfEncode(e.to_string()))?;
        let layer = doc.get_page(page1).get_layer(layer1);

        Ok(Self {
            doc,
            font,
            font_bold,
            layer,
            y: PAGE_H_MM - Self::MARGIN_TOP,
            page_count: 1,
        })
    }

    /// Write one text line, breaking to a new page when the cursor would
    /// pass the bottom margin.
    pub fn line(&mut self, text: &str, font_size: f32, bold: bool) {
        let line_height = font_size * 0.55;
        if self.y - line_height < Self::MARGIN_BOTTOM {
            self.break_page();
        }
        self.y -= line_height;

        let font = if bold { &self.font_bold } else { &self.font };
        self.layer
            .use_text(text, font_size, Mm(Self::MARGIN_X), Mm(self.y), font);
    }

    /// Insert vertical whitespace.
    pub fn gap(&mut self, mm: f32) {
        self.y -= mm;
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    fn break_page(&mut self) {
        let (page_idx, layer_idx) = self.doc.add_page(
            Mm(PAGE_W_MM),
            Mm(PAGE_H_MM),
            format!("Page {}, Layer 1", self.page_count + 1),
        );
        self.layer = self.doc.get_page(page_idx).get_layer(layer_idx);
        self.y = PAGE_H_MM - Self::MARGIN_TOP;
        self.page_count += 1;
    }

    /// Finish the document and return its bytes with the page count.
    pub fn finish(self) -> Result<(Vec<u8>, usize), RenderError> {
        let page_count = self.page_count;
        let bytes = save_to_bytes(self.doc)?;
        Ok((bytes, page_count))
    }
}

fn save_to_bytes(doc: PdfDocumentReference) -> Result<Vec<u8>, RenderError> {
    let mut writer = std::io::BufWriter::new(Vec::<u8>::new());
    doc.save(&mut writer)
        .map_err(|e| RenderError::PdfEncode(e.to_string()))?;
    writer
        .into_inner()
        .map_err(|e| RenderError::PdfEncode(e.to_string()))
}

/// Greedy word wrap to a maximum line width in characters.
pub fn wrap_text_lines(input: &str, max_chars: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in input.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }

        if current.chars().count() + 1 + word.chars().count() <= max_chars {
            current.push(' ');
            current.push_str(word);
        } else {
            out.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }

    if !current.is_empty() {
        out.push(current);
    }

    out
}
