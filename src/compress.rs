//! PDF recompression: rasterize every page, re-encode it lossily and rebuild
//! the document one full-page image at a time.

use crate::assemble::{begin_page, DocumentBuilder, PageSize};
use crate::encode::ImageEncoder;
use crate::error::{Result, ShrinkError};
use crate::level::CompressionLevel;
use crate::progress::{before_item, round_half_up};
use crate::render::{PageRenderer, SourceDocument};

/// Prefix given to recompressed output files
pub const OUTPUT_PREFIX: &str = "optimize_";

/// Outcome of recompressing one document.
///
/// Derived figures are fixed when the result is built.
#[derive(Debug, Clone)]
pub struct CompressionResult {
    file_name: String,
    original_size: u64,
    new_size: u64,
    ratio: i64,
    is_larger: bool,
    output: Vec<u8>,
}

impl CompressionResult {
    pub fn new(file_name: impl Into<String>, original_size: u64, output: Vec<u8>) -> Self {
        let new_size = output.len() as u64;
        let ratio = if original_size == 0 {
            0
        } else {
            let saved = original_size as f64 - new_size as f64;
            round_half_up(saved / original_size as f64 * 100.0) as i64
        };

        CompressionResult {
            file_name: file_name.into(),
            original_size,
            new_size,
            ratio,
            is_larger: new_size > original_size,
            output,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Name for the downloadable output, `optimize_<file name>`
    pub fn output_name(&self) -> String {
        format!("{}{}", OUTPUT_PREFIX, self.file_name)
    }

    pub fn original_size(&self) -> u64 {
        self.original_size
    }

    pub fn new_size(&self) -> u64 {
        self.new_size
    }

    /// Percentage saved; negative when the output grew
    pub fn ratio(&self) -> i64 {
        self.ratio
    }

    pub fn is_larger(&self) -> bool {
        self.is_larger
    }

    /// Bytes saved; negative when the output grew
    pub fn saved_bytes(&self) -> i64 {
        self.original_size as i64 - self.new_size as i64
    }

    pub fn output(&self) -> &[u8] {
        &self.output
    }

    pub fn into_output(self) -> Vec<u8> {
        self.output
    }
}

/// Recompress one PDF.
///
/// `on_progress` sees a non-decreasing percentage: the share of pages finished
/// before each page starts, then `100` exactly once after the last page.
/// Any failure aborts the whole document.
pub fn recompress<R, E, B>(
    renderer: &R,
    encoder: &E,
    mut builder: B,
    file_name: &str,
    bytes: &[u8],
    level: CompressionLevel,
    mut on_progress: impl FnMut(u8),
) -> Result<CompressionResult>
where
    R: PageRenderer,
    E: ImageEncoder,
    B: DocumentBuilder,
{
    let source = renderer.open(bytes)?;
    let total_pages = source.page_count();
    if total_pages == 0 {
        return Err(ShrinkError::EmptyDocument);
    }

    let params = level.parameters();
    log::info!(
        "Recompressing {} ({} pages, level {}: scale {}, quality {})",
        file_name,
        total_pages,
        level,
        params.scale,
        params.quality
    );

    for index in 0..total_pages {
        on_progress(before_item(index, total_pages));

        let raster = source.render_page(index, params.scale)?;
        let jpeg = encoder.encode(&raster, params.quality)?;
        log::debug!(
            "Page {}/{}: {}x{} px -> {} bytes",
            index + 1,
            total_pages,
            raster.width,
            raster.height,
            jpeg.len()
        );

        let size = PageSize::from_pixels(raster.width, raster.height);
        begin_page(&mut builder, index, size)?;
        builder.place_image(&jpeg, 0.0, 0.0, size.width, size.height)?;
    }

    on_progress(100);

    let output = builder.serialize()?;
    let result = CompressionResult::new(file_name, bytes.len() as u64, output);

    log::info!(
        "{}: {} -> {} bytes ({}%)",
        file_name,
        result.original_size(),
        result.new_size(),
        result.ratio()
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        fake_pdf, recorded_calls, FakeEncoder, FakeRenderer, RecordingBuilder,
    };

    fn run(
        pdf: &[u8],
        level: CompressionLevel,
    ) -> (Result<CompressionResult>, Vec<u8>) {
        let mut progress = Vec::new();
        let result = recompress(
            &FakeRenderer,
            &FakeEncoder,
            RecordingBuilder::default(),
            "report.pdf",
            pdf,
            level,
            |p| progress.push(p),
        );
        (result, progress)
    }

    #[test]
    fn rebuilds_each_page_in_order() {
        let pdf = fake_pdf(&[(600.0, 800.0), (800.0, 600.0), (500.0, 500.0)]);
        let (result, _) = run(&pdf, CompressionLevel::Medium);
        let result = result.unwrap();

        assert_eq!(
            recorded_calls(result.output()),
            vec![
                "create 600x800 p",
                "image jpeg:600x800@0.6 at 0,0 600x800",
                "page 800x600 l",
                "image jpeg:800x600@0.6 at 0,0 800x600",
                "page 500x500 p",
                "image jpeg:500x500@0.6 at 0,0 500x500",
            ]
        );
    }

    #[test]
    fn level_scale_sets_raster_size() {
        let pdf = fake_pdf(&[(612.0, 792.0)]);

        let (low, _) = run(&pdf, CompressionLevel::Low);
        assert_eq!(
            recorded_calls(low.unwrap().output())[0],
            "create 918x1188 p"
        );

        let (high, _) = run(&pdf, CompressionLevel::High);
        let calls = recorded_calls(high.unwrap().output());
        assert_eq!(calls[0], "create 428x554 p");
        assert_eq!(calls[1], "image jpeg:428x554@0.4 at 0,0 428x554");
    }

    #[test]
    fn progress_counts_finished_pages_then_completes() {
        let pdf = fake_pdf(&[(100.0, 100.0); 3]);
        let (result, progress) = run(&pdf, CompressionLevel::Medium);
        result.unwrap();
        assert_eq!(progress, vec![0, 33, 67, 100]);
    }

    #[test]
    fn progress_is_monotonic_and_ends_once_at_100() {
        for pages in 1..=12 {
            let pdf = fake_pdf(&vec![(10.0, 20.0); pages]);
            let (result, progress) = run(&pdf, CompressionLevel::High);
            result.unwrap();

            assert_eq!(progress.len(), pages + 1);
            assert!(progress.windows(2).all(|w| w[0] <= w[1]));
            assert_eq!(progress.iter().filter(|&&p| p == 100).count(), 1);
            assert_eq!(*progress.last().unwrap(), 100);
            assert!(progress[pages - 1] < 100);
        }
    }

    #[test]
    fn long_document_reports_100_once() {
        let pdf = fake_pdf(&vec![(10.0, 10.0); 250]);
        let (result, progress) = run(&pdf, CompressionLevel::High);
        result.unwrap();

        assert_eq!(progress[249], 99);
        assert_eq!(progress.iter().filter(|&&p| p == 100).count(), 1);
    }

    #[test]
    fn single_page_document() {
        let pdf = fake_pdf(&[(300.0, 200.0)]);
        let (result, progress) = run(&pdf, CompressionLevel::Medium);
        let result = result.unwrap();

        assert_eq!(progress, vec![0, 100]);
        let calls = recorded_calls(result.output());
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], "create 300x200 l");
    }

    #[test]
    fn zero_pages_is_a_decode_error() {
        let (result, progress) = run(b"%PDF-FAKE ", CompressionLevel::Medium);
        let err = result.unwrap_err();
        assert!(matches!(err, ShrinkError::EmptyDocument));
        assert!(err.is_decode());
        assert!(progress.is_empty());
    }

    #[test]
    fn unreadable_bytes_propagate_decode_error() {
        let (result, progress) = run(b"%PDF-1.7 truncated", CompressionLevel::Low);
        assert!(matches!(result, Err(ShrinkError::Decode(_))));
        assert!(progress.is_empty());
    }

    #[test]
    fn page_failure_aborts_document() {
        let (result, progress) = run(b"%PDF-FAKE 10x10;!;10x10", CompressionLevel::Medium);
        assert!(matches!(result, Err(ShrinkError::Render { page: 2, .. })));
        assert_eq!(progress, vec![0, 33]);
    }

    #[test]
    fn result_arithmetic() {
        let result = CompressionResult::new("scan.pdf", 1_000_000, vec![0; 400_000]);
        assert_eq!(result.ratio(), 60);
        assert!(!result.is_larger());
        assert_eq!(result.saved_bytes(), 600_000);
        assert_eq!(result.output_name(), "optimize_scan.pdf");
    }

    #[test]
    fn larger_output_has_negative_ratio() {
        let result = CompressionResult::new("tiny.pdf", 1000, vec![0; 1250]);
        assert_eq!(result.ratio(), -25);
        assert!(result.is_larger());

        let same = CompressionResult::new("same.pdf", 10, vec![0; 10]);
        assert_eq!(same.ratio(), 0);
        assert!(!same.is_larger());
    }

    #[test]
    fn sizes_come_from_input_and_output_lengths() {
        let pdf = fake_pdf(&[(50.0, 50.0)]);
        let (result, _) = run(&pdf, CompressionLevel::Medium);
        let result = result.unwrap();
        assert_eq!(result.original_size(), pdf.len() as u64);
        assert_eq!(result.new_size(), result.output().len() as u64);
        assert_eq!(result.file_name(), "report.pdf");
    }
}
