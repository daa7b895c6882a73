//! Fakes for the rendering, encoding and assembly seams.

use crate::assemble::{DocumentBuilder, Orientation, PageSize};
use crate::encode::ImageEncoder;
use crate::error::{Result, ShrinkError};
use crate::render::{raster_extent, PageRaster, PageRenderer, SourceDocument};

/// Pages of a fake PDF, in points.
///
/// A fake PDF is the text `%PDF-FAKE` followed by `WxH` page sizes separated by
/// `;`, e.g. `%PDF-FAKE 612x792;792x612`. A page written as `!` fails to render.
pub fn fake_pdf(pages: &[(f32, f32)]) -> Vec<u8> {
    let sizes: Vec<String> = pages.iter().map(|(w, h)| format!("{}x{}", w, h)).collect();
    format!("%PDF-FAKE {}", sizes.join(";")).into_bytes()
}

#[derive(Debug, Default)]
pub struct FakeRenderer;

pub struct FakeDocument {
    pages: Vec<Option<(f32, f32)>>,
}

impl PageRenderer for FakeRenderer {
    type Document<'a> = FakeDocument;

    fn open<'a>(&'a self, bytes: &'a [u8]) -> Result<FakeDocument> {
        let text = std::str::from_utf8(bytes)
            .map_err(|_| ShrinkError::Decode("not a fake PDF".to_string()))?;
        let body = text
            .strip_prefix("%PDF-FAKE")
            .ok_or_else(|| ShrinkError::Decode("missing %PDF-FAKE header".to_string()))?
            .trim();

        let mut pages = Vec::new();
        for page in body.split(';').filter(|s| !s.is_empty()) {
            if page == "!" {
                pages.push(None);
                continue;
            }
            let (w, h) = page
                .split_once('x')
                .ok_or_else(|| ShrinkError::Decode(format!("bad page size {}", page)))?;
            let w: f32 = w.parse().map_err(|_| ShrinkError::Decode(page.to_string()))?;
            let h: f32 = h.parse().map_err(|_| ShrinkError::Decode(page.to_string()))?;
            pages.push(Some((w, h)));
        }
        Ok(FakeDocument { pages })
    }
}

impl SourceDocument for FakeDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn render_page(&self, index: usize, scale: f32) -> Result<PageRaster> {
        match self.pages.get(index).copied().flatten() {
            Some((w, h)) => Ok(PageRaster::blank(
                raster_extent(w, scale),
                raster_extent(h, scale),
            )),
            None => Err(ShrinkError::Render {
                page: index + 1,
                message: "fake render failure".to_string(),
            }),
        }
    }
}

/// Emits `jpeg:WxH@Q` instead of real image data.
#[derive(Debug, Default)]
pub struct FakeEncoder;

impl ImageEncoder for FakeEncoder {
    fn encode(&self, raster: &PageRaster, quality: f32) -> Result<Vec<u8>> {
        Ok(format!("jpeg:{}x{}@{}", raster.width, raster.height, quality).into_bytes())
    }
}

/// Records every builder call; `serialize` returns the log, one call per line.
#[derive(Debug, Default)]
pub struct RecordingBuilder {
    calls: Vec<String>,
}

fn orientation_tag(orientation: Orientation) -> &'static str {
    match orientation {
        Orientation::Portrait => "p",
        Orientation::Landscape => "l",
    }
}

impl DocumentBuilder for RecordingBuilder {
    fn create_document(&mut self, size: PageSize, orientation: Orientation) -> Result<()> {
        self.calls.push(format!(
            "create {}x{} {}",
            size.width,
            size.height,
            orientation_tag(orientation)
        ));
        Ok(())
    }

    fn add_page(&mut self, size: PageSize, orientation: Orientation) -> Result<()> {
        self.calls.push(format!(
            "page {}x{} {}",
            size.width,
            size.height,
            orientation_tag(orientation)
        ));
        Ok(())
    }

    fn place_image(
        &mut self,
        image: &[u8],
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Result<()> {
        let label = match std::str::from_utf8(image) {
            Ok(text) if text.starts_with("jpeg:") => text.to_string(),
            _ => format!("{} bytes", image.len()),
        };
        self.calls.push(format!(
            "image {} at {},{} {}x{}",
            label, x, y, width, height
        ));
        Ok(())
    }

    fn serialize(self) -> Result<Vec<u8>> {
        Ok(self.calls.join("\n").into_bytes())
    }
}

/// Split a `RecordingBuilder` blob back into its call lines.
pub fn recorded_calls(blob: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(blob)
        .lines()
        .map(str::to_string)
        .collect()
}
