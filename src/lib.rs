//! PDF Shrinker Library
//!
//! Core logic for shrinking PDFs and combining images into PDFs, entirely
//! offline. Shared between CLI and WASM targets.
//!
//! Recompression renders every page to pixels, re-encodes it as JPEG at a
//! level-dependent scale and quality, and rebuilds the document one full-page
//! image at a time. Text and vector content is never preserved. Image
//! conversion places JPEG/PNG files page by page at their native size.
//!
//! The rendering engine, lossy encoder and document builder are traits so the
//! pipelines can run against fakes.

#[cfg(target_arch = "wasm32")]
pub mod wasm;

#[cfg(not(target_arch = "wasm32"))]
pub mod file_ops;

pub mod assemble;
pub mod batch;
pub mod compress;
pub mod encode;
pub mod error;
pub mod images;
pub mod input;
pub mod level;
pub mod progress;
pub mod render;
pub mod size;

#[cfg(test)]
mod test_support;

pub use assemble::{DocumentBuilder, LopdfBuilder, Orientation, PageSize};
pub use batch::{run_batch, BatchResult, SourceFile};
pub use compress::{recompress, CompressionResult, OUTPUT_PREFIX};
pub use encode::{ImageEncoder, JpegEncoder};
pub use error::{Result, ShrinkError};
pub use images::{build_pdf_from_images, CONVERTED_FILE_NAME};
pub use input::InputKind;
pub use level::{CompressionLevel, LevelParameters};
pub use render::{PageRaster, PageRenderer, SourceDocument};
pub use size::format_bytes;

#[cfg(feature = "pdfium")]
pub use render::PdfiumRenderer;

/// Options for PDF recompression
#[derive(Debug, Clone)]
pub struct CompressOptions {
    /// Compression level (render scale and JPEG quality)
    pub level: CompressionLevel,
    /// Compress PDF streams of the rebuilt document
    pub compress_streams: bool,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            level: CompressionLevel::Medium,
            compress_streams: true,
        }
    }
}

impl CompressOptions {
    /// Fresh production document builder for one output
    pub fn builder(&self) -> LopdfBuilder {
        LopdfBuilder::new().with_stream_compression(self.compress_streams)
    }
}

/// Recompress one PDF with the JPEG encoder and lopdf builder.
pub fn compress_pdf_bytes<R: PageRenderer>(
    renderer: &R,
    file_name: &str,
    pdf_bytes: &[u8],
    options: &CompressOptions,
    on_progress: impl FnMut(u8),
) -> Result<CompressionResult> {
    recompress(
        renderer,
        &JpegEncoder,
        options.builder(),
        file_name,
        pdf_bytes,
        options.level,
        on_progress,
    )
}

/// Recompress several PDFs in order with the JPEG encoder and lopdf builder.
pub fn compress_batch<R: PageRenderer>(
    renderer: &R,
    files: &[SourceFile],
    options: &CompressOptions,
    on_progress: impl FnMut(f64),
) -> Result<BatchResult> {
    run_batch(
        renderer,
        &JpegEncoder,
        || options.builder(),
        files,
        options.level,
        on_progress,
    )
}

/// Combine encoded JPEG/PNG images into one PDF with the lopdf builder.
pub fn images_to_pdf_bytes<I: AsRef<[u8]>>(
    images: &[I],
    on_progress: impl FnMut(u8),
) -> Result<Vec<u8>> {
    build_pdf_from_images(LopdfBuilder::new(), images, on_progress)
}
