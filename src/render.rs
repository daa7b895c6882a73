//! Page rendering seam.
//!
//! The recompression pipeline only needs to open a PDF, count its pages and
//! rasterize one page at a time. `PdfiumRenderer` does that through a pdfium
//! shared library bound at runtime; tests substitute their own renderer.

use crate::error::Result;

/// RGBA pixels for exactly one rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRaster {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA8, `width * height * 4` bytes
    pub pixels: Vec<u8>,
}

impl PageRaster {
    /// Opaque white raster of the given size
    pub fn blank(width: u32, height: u32) -> Self {
        PageRaster {
            width,
            height,
            pixels: vec![255; width as usize * height as usize * 4],
        }
    }
}

/// Pixel extent of a page side rendered at `scale`.
///
/// Truncates like a canvas sized from a fractional viewport, never below one pixel.
pub fn raster_extent(points: f32, scale: f32) -> u32 {
    let extent = (points * scale).trunc();
    if extent.is_finite() && extent >= 1.0 {
        extent as u32
    } else {
        1
    }
}

/// An opened source document.
pub trait SourceDocument {
    fn page_count(&self) -> usize;

    /// Rasterize the page at 0-based `index`, `scale` times its native size.
    fn render_page(&self, index: usize, scale: f32) -> Result<PageRaster>;
}

/// Opens PDF bytes for rasterization.
pub trait PageRenderer {
    type Document<'a>: SourceDocument
    where
        Self: 'a;

    /// Fails with `ShrinkError::Decode` when the bytes are not a readable PDF.
    fn open<'a>(&'a self, bytes: &'a [u8]) -> Result<Self::Document<'a>>;
}

#[cfg(feature = "pdfium")]
pub use self::pdfium::{PdfiumDocument, PdfiumRenderer};

#[cfg(feature = "pdfium")]
mod pdfium {
    use super::{raster_extent, PageRaster, PageRenderer, SourceDocument};
    use crate::error::{Result, ShrinkError};
    use pdfium_render::prelude::*;

    /// Renderer backed by a dynamically bound pdfium library.
    pub struct PdfiumRenderer {
        pdfium: Pdfium,
    }

    impl PdfiumRenderer {
        /// Bind to pdfium in `dir` if given, falling back to the system library.
        #[cfg(not(target_arch = "wasm32"))]
        pub fn bind(dir: Option<&std::path::Path>) -> Result<Self> {
            let dir = dir.unwrap_or_else(|| std::path::Path::new("./"));
            let bindings =
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
                    .or_else(|_| Pdfium::bind_to_system_library())
                    .map_err(|e| ShrinkError::RendererUnavailable(e.to_string()))?;

            log::debug!("Bound pdfium library (searched {:?} first)", dir);
            Ok(PdfiumRenderer {
                pdfium: Pdfium::new(bindings),
            })
        }

        /// Bind to the pdfium module already initialised by the host page.
        #[cfg(target_arch = "wasm32")]
        pub fn bind() -> Result<Self> {
            let bindings = Pdfium::bind_to_system_library()
                .map_err(|e| ShrinkError::RendererUnavailable(e.to_string()))?;
            Ok(PdfiumRenderer {
                pdfium: Pdfium::new(bindings),
            })
        }
    }

    pub struct PdfiumDocument<'a> {
        document: PdfDocument<'a>,
    }

    impl PageRenderer for PdfiumRenderer {
        type Document<'a> = PdfiumDocument<'a>;

        fn open<'a>(&'a self, bytes: &'a [u8]) -> Result<PdfiumDocument<'a>> {
            let document = self
                .pdfium
                .load_pdf_from_byte_slice(bytes, None)
                .map_err(|e| ShrinkError::Decode(e.to_string()))?;
            Ok(PdfiumDocument { document })
        }
    }

    impl SourceDocument for PdfiumDocument<'_> {
        fn page_count(&self) -> usize {
            self.document.pages().len() as usize
        }

        fn render_page(&self, index: usize, scale: f32) -> Result<PageRaster> {
            let render_err = |message: String| ShrinkError::Render {
                page: index + 1,
                message,
            };

            let page = self
                .document
                .pages()
                .get(index as PdfPageIndex)
                .map_err(|e| render_err(e.to_string()))?;

            let width = raster_extent(page.width().value, scale);
            let height = raster_extent(page.height().value, scale);

            let bitmap = page
                .render_with_config(
                    &PdfRenderConfig::new()
                        .set_target_width(width as i32)
                        .set_target_height(height as i32),
                )
                .map_err(|e| render_err(e.to_string()))?;

            let pixels = bitmap.as_rgba_bytes();
            let (width, height) = (bitmap.width() as u32, bitmap.height() as u32);
            if pixels.len() != width as usize * height as usize * 4 {
                return Err(render_err(format!(
                    "bitmap size mismatch: got {} bytes for {}x{}",
                    pixels.len(),
                    width,
                    height
                )));
            }

            Ok(PageRaster {
                width,
                height,
                pixels,
            })
        }
    }
}
