//! WebAssembly bindings for PDF Shrinker

use crate::{format_bytes as format_size, images_to_pdf_bytes, CompressionLevel, CompressionResult};
use serde::Serialize;
use wasm_bindgen::prelude::*;

struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from_str(&format!("[pdf-shrink] {}", record.args()));
        match record.level() {
            log::Level::Error => web_sys::console::error_1(&line),
            log::Level::Warn => web_sys::console::warn_1(&line),
            _ => web_sys::console::log_1(&line),
        }
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

/// Initialize panic hook and console logging
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(log::LevelFilter::Info);
    }
}

/// Forward progress to an optional JS callback `(percent: number) => void`
fn report(callback: Option<&js_sys::Function>, percent: f64) {
    if let Some(callback) = callback {
        if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_f64(percent)) {
            log::warn!("Progress callback threw: {:?}", e);
        }
    }
}

/// Size metrics of one compressed file, as shown by the UI
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResultSummary<'a> {
    file_name: &'a str,
    output_name: String,
    original_size_raw: u64,
    original_size: String,
    new_size_raw: u64,
    new_size: String,
    ratio: i64,
    is_larger: bool,
}

impl<'a> ResultSummary<'a> {
    fn new(result: &'a CompressionResult) -> Self {
        Self {
            file_name: result.file_name(),
            output_name: result.output_name(),
            original_size_raw: result.original_size(),
            original_size: format_size(result.original_size()),
            new_size_raw: result.new_size(),
            new_size: format_size(result.new_size()),
            ratio: result.ratio(),
            is_larger: result.is_larger(),
        }
    }
}

/// Per-file metrics plus batch totals
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchSummary<'a> {
    files: Vec<ResultSummary<'a>>,
    total_original_raw: u64,
    total_original: String,
    total_new_raw: u64,
    total_new: String,
    total_saved: i64,
    is_overall_gain: bool,
}

fn parse_level(level: Option<String>) -> Result<CompressionLevel, JsError> {
    match level {
        Some(name) => name
            .parse::<CompressionLevel>()
            .map_err(|e| JsError::new(&e)),
        None => Ok(CompressionLevel::default()),
    }
}

fn to_js_error(e: impl std::fmt::Display) -> JsError {
    JsError::new(&e.to_string())
}

fn into_js_result(result: CompressionResult) -> Result<CompressionResultJs, JsError> {
    let summary_json = serde_json::to_string(&ResultSummary::new(&result)).map_err(to_js_error)?;
    Ok(CompressionResultJs {
        output_name: result.output_name(),
        original_size: result.original_size(),
        new_size: result.new_size(),
        ratio: result.ratio(),
        is_larger: result.is_larger(),
        summary_json,
        pdf_bytes: result.into_output(),
    })
}

/// Recompress one PDF in the browser
///
/// # Arguments
/// * `file_name` - Name of the selected file, used for the output name
/// * `pdf_bytes` - The input PDF file as a byte array
/// * `level` - "low", "medium" or "high" (default: "medium")
/// * `on_progress` - Optional callback receiving 0-100
///
/// # Returns
/// A `CompressionResultJs` with the rebuilt PDF and size metrics, or throws an error
#[cfg(feature = "pdfium")]
#[wasm_bindgen]
pub fn compress_pdf(
    file_name: &str,
    pdf_bytes: &[u8],
    level: Option<String>,
    on_progress: Option<js_sys::Function>,
) -> Result<CompressionResultJs, JsError> {
    let options = crate::CompressOptions {
        level: parse_level(level)?,
        ..Default::default()
    };

    let renderer = crate::PdfiumRenderer::bind().map_err(to_js_error)?;
    let result = crate::compress_pdf_bytes(&renderer, file_name, pdf_bytes, &options, |p| {
        report(on_progress.as_ref(), f64::from(p))
    })
    .map_err(to_js_error)?;

    into_js_result(result)
}

/// Recompress several PDFs in order; the first failure aborts the whole batch
///
/// # Arguments
/// * `names` - Array of file names
/// * `files` - Array of Uint8Array, same length and order as `names`
/// * `level` - "low", "medium" or "high" (default: "medium")
/// * `on_progress` - Optional callback receiving the overall 0-100 (not rounded)
///
/// # Returns
/// A `BatchResultJs` with the results in input order and the batch totals
#[cfg(feature = "pdfium")]
#[wasm_bindgen]
pub fn compress_pdfs(
    names: js_sys::Array,
    files: js_sys::Array,
    level: Option<String>,
    on_progress: Option<js_sys::Function>,
) -> Result<BatchResultJs, JsError> {
    if names.length() != files.length() {
        return Err(JsError::new(&format!(
            "Got {} names for {} files",
            names.length(),
            files.length()
        )));
    }

    let sources = names
        .iter()
        .zip(files.iter())
        .map(|(name, bytes)| {
            let name = name
                .as_string()
                .ok_or_else(|| JsError::new("File names must be strings"))?;
            Ok(crate::SourceFile::new(
                name,
                js_sys::Uint8Array::new(&bytes).to_vec(),
            ))
        })
        .collect::<Result<Vec<_>, JsError>>()?;

    let options = crate::CompressOptions {
        level: parse_level(level)?,
        ..Default::default()
    };

    let renderer = crate::PdfiumRenderer::bind().map_err(to_js_error)?;
    let batch = crate::compress_batch(&renderer, &sources, &options, |p| {
        report(on_progress.as_ref(), p)
    })
    .map_err(to_js_error)?;

    let summary = BatchSummary {
        files: batch.iter().map(ResultSummary::new).collect(),
        total_original_raw: batch.total_original(),
        total_original: format_size(batch.total_original()),
        total_new_raw: batch.total_new(),
        total_new: format_size(batch.total_new()),
        total_saved: batch.total_saved(),
        is_overall_gain: batch.is_overall_gain(),
    };
    let summary_json = serde_json::to_string(&summary).map_err(to_js_error)?;
    let total_original = batch.total_original();
    let total_new = batch.total_new();
    let is_overall_gain = batch.is_overall_gain();

    let results = batch
        .into_results()
        .into_iter()
        .map(into_js_result)
        .collect::<Result<Vec<_>, JsError>>()?;

    Ok(BatchResultJs {
        results,
        total_original,
        total_new,
        is_overall_gain,
        summary_json,
    })
}

/// Combine JPEG/PNG images into one PDF
///
/// # Arguments
/// * `images` - Array of Uint8Array, one per page, in order
/// * `on_progress` - Optional callback receiving 0-100
///
/// # Returns
/// The PDF as a byte array (save it as `converted_images.pdf`), or throws an error
#[wasm_bindgen]
pub fn images_to_pdf(
    images: js_sys::Array,
    on_progress: Option<js_sys::Function>,
) -> Result<Vec<u8>, JsError> {
    let images: Vec<Vec<u8>> = images
        .iter()
        .map(|value| js_sys::Uint8Array::new(&value).to_vec())
        .collect();

    images_to_pdf_bytes(&images, |p| report(on_progress.as_ref(), f64::from(p)))
        .map_err(to_js_error)
}

/// Human-readable size, e.g. "1.50 KB"
#[wasm_bindgen]
pub fn format_bytes(bytes: f64) -> String {
    format_size(bytes.max(0.0) as u64)
}

/// Result of PDF recompression with size metrics
#[wasm_bindgen]
#[derive(Clone)]
pub struct CompressionResultJs {
    pdf_bytes: Vec<u8>,
    output_name: String,
    original_size: u64,
    new_size: u64,
    ratio: i64,
    is_larger: bool,
    summary_json: String,
}

#[wasm_bindgen]
impl CompressionResultJs {
    /// Get the recompressed PDF bytes
    #[wasm_bindgen(getter)]
    pub fn pdf_bytes(&self) -> Vec<u8> {
        self.pdf_bytes.clone()
    }

    /// Get the download name, `optimize_<original name>`
    #[wasm_bindgen(getter)]
    pub fn output_name(&self) -> String {
        self.output_name.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn original_size(&self) -> f64 {
        self.original_size as f64
    }

    #[wasm_bindgen(getter)]
    pub fn new_size(&self) -> f64 {
        self.new_size as f64
    }

    /// Get the percentage saved (negative when the output grew)
    #[wasm_bindgen(getter)]
    pub fn ratio(&self) -> f64 {
        self.ratio as f64
    }

    #[wasm_bindgen(getter)]
    pub fn is_larger(&self) -> bool {
        self.is_larger
    }

    /// Get all metrics, formatted sizes included, as a JSON string
    #[wasm_bindgen(getter)]
    pub fn summary_json(&self) -> String {
        self.summary_json.clone()
    }
}

/// Ordered results of a batch plus its totals
#[wasm_bindgen]
pub struct BatchResultJs {
    results: Vec<CompressionResultJs>,
    total_original: u64,
    total_new: u64,
    is_overall_gain: bool,
    summary_json: String,
}

#[wasm_bindgen]
impl BatchResultJs {
    #[wasm_bindgen(getter)]
    pub fn length(&self) -> usize {
        self.results.len()
    }

    /// Get the result for the file at `index`, in input order
    pub fn result(&self, index: usize) -> Option<CompressionResultJs> {
        self.results.get(index).cloned()
    }

    #[wasm_bindgen(getter)]
    pub fn total_original(&self) -> f64 {
        self.total_original as f64
    }

    #[wasm_bindgen(getter)]
    pub fn total_new(&self) -> f64 {
        self.total_new as f64
    }

    /// Get whether the batch shrank overall
    #[wasm_bindgen(getter)]
    pub fn is_overall_gain(&self) -> bool {
        self.is_overall_gain
    }

    /// Get per-file metrics and totals, formatted sizes included, as a JSON string
    #[wasm_bindgen(getter)]
    pub fn summary_json(&self) -> String {
        self.summary_json.clone()
    }
}
