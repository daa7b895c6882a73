//! Lossy re-encoding of page rasters.

use crate::error::{Result, ShrinkError};
use crate::render::PageRaster;

/// Compresses a raster into image bytes the document builder can place.
pub trait ImageEncoder {
    /// `quality` is in [0, 1]; the meaning of intermediate values is up to the codec.
    fn encode(&self, raster: &PageRaster, quality: f32) -> Result<Vec<u8>>;
}

/// Baseline JPEG with 4:2:0 chroma subsampling.
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegEncoder;

/// Quality on the JPEG 1-100 scale
fn jpeg_quality(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

impl ImageEncoder for JpegEncoder {
    fn encode(&self, raster: &PageRaster, quality: f32) -> Result<Vec<u8>> {
        let width = u16::try_from(raster.width)
            .map_err(|_| ShrinkError::Encode(format!("raster too wide: {} px", raster.width)))?;
        let height = u16::try_from(raster.height)
            .map_err(|_| ShrinkError::Encode(format!("raster too tall: {} px", raster.height)))?;

        let mut jpeg_bytes = Vec::new();
        let mut encoder = jpeg_encoder::Encoder::new(&mut jpeg_bytes, jpeg_quality(quality));
        encoder.set_sampling_factor(jpeg_encoder::SamplingFactor::R_4_2_0);
        // Alpha is discarded; pages are rendered onto an opaque background
        encoder
            .encode(&raster.pixels, width, height, jpeg_encoder::ColorType::Rgba)
            .map_err(|e| ShrinkError::Encode(format!("Failed to encode JPEG: {}", e)))?;

        Ok(jpeg_bytes)
    }
}
