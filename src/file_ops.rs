//! File-system host for the pipelines (native targets only).

use crate::batch::{BatchResult, SourceFile};
use crate::error::{Result, ShrinkError};
use crate::input::InputKind;
use crate::render::PageRenderer;
use crate::{compress_batch, images_to_pdf_bytes, CompressOptions};
use std::fs;
use std::path::{Path, PathBuf};

/// Read every path into memory, rejecting files that are not of `kind`.
pub fn read_inputs(paths: &[PathBuf], kind: InputKind) -> Result<Vec<SourceFile>> {
    paths
        .iter()
        .map(|path| {
            let bytes = fs::read(path).map_err(|e| ShrinkError::io(path, e))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            kind.require(&name, &bytes)?;
            Ok(SourceFile::new(name, bytes))
        })
        .collect()
}

/// Recompress PDFs from disk and write `optimize_<name>` for each into `out_dir`.
///
/// Nothing is written unless every file succeeds.
pub fn compress_files<R: PageRenderer>(
    renderer: &R,
    paths: &[PathBuf],
    out_dir: &Path,
    options: &CompressOptions,
    on_progress: impl FnMut(f64),
) -> Result<BatchResult> {
    let files = read_inputs(paths, InputKind::Pdf)?;
    let batch = compress_batch(renderer, &files, options, on_progress)?;

    fs::create_dir_all(out_dir).map_err(|e| ShrinkError::io(out_dir, e))?;
    for result in &batch {
        let out_path = out_dir.join(result.output_name());
        fs::write(&out_path, result.output()).map_err(|e| ShrinkError::io(&out_path, e))?;
        log::info!("Wrote {}", out_path.display());
    }

    Ok(batch)
}

/// Combine images from disk into one PDF at `out_path`; returns its size in bytes.
pub fn convert_images(
    paths: &[PathBuf],
    out_path: &Path,
    on_progress: impl FnMut(u8),
) -> Result<u64> {
    let files = read_inputs(paths, InputKind::Image)?;
    let images: Vec<&[u8]> = files.iter().map(|f| f.bytes.as_slice()).collect();
    let pdf = images_to_pdf_bytes(&images, on_progress)?;

    fs::write(out_path, &pdf).map_err(|e| ShrinkError::io(out_path, e))?;
    log::info!("Wrote {}", out_path.display());
    Ok(pdf.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fake_pdf, FakeRenderer};
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::io::Cursor;

    fn write(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn writes_optimized_copies() {
        let dir = tempfile::tempdir().unwrap();
        let inputs = vec![
            write(dir.path(), "one.pdf", &fake_pdf(&[(100.0, 80.0)])),
            write(dir.path(), "two.pdf", &fake_pdf(&[(80.0, 100.0); 2])),
        ];
        let out_dir = dir.path().join("out");

        let batch = compress_files(
            &FakeRenderer,
            &inputs,
            &out_dir,
            &CompressOptions::default(),
            |_| {},
        )
        .unwrap();

        assert_eq!(batch.len(), 2);
        let written = fs::read(out_dir.join("optimize_two.pdf")).unwrap();
        assert_eq!(written, batch.results()[1].output());
        assert!(out_dir.join("optimize_one.pdf").exists());
    }

    #[test]
    fn failed_batch_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let inputs = vec![
            write(dir.path(), "good.pdf", &fake_pdf(&[(10.0, 10.0)])),
            write(dir.path(), "bad.pdf", b"%PDF-1.4 but broken"),
        ];
        let out_dir = dir.path().join("out");

        let err = compress_files(
            &FakeRenderer,
            &inputs,
            &out_dir,
            &CompressOptions::default(),
            |_| {},
        )
        .unwrap_err();

        assert!(err.is_decode());
        assert!(!out_dir.exists());
    }

    #[test]
    fn non_pdf_is_rejected_before_processing() {
        let dir = tempfile::tempdir().unwrap();
        let inputs = vec![write(dir.path(), "notes.txt", b"plain text")];

        let err = compress_files(
            &FakeRenderer,
            &inputs,
            dir.path(),
            &CompressOptions::default(),
            |_| panic!("no progress expected"),
        )
        .unwrap_err();
        assert!(matches!(err, ShrinkError::UnsupportedInput { .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = read_inputs(&[PathBuf::from("/nonexistent/x.pdf")], InputKind::Pdf).unwrap_err();
        assert!(matches!(err, ShrinkError::Io { .. }));
    }

    #[test]
    fn converts_images_to_one_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let mut png = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::new(30, 20))
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();
        let inputs = vec![
            write(dir.path(), "a.png", &png),
            write(dir.path(), "b.png", &png),
        ];
        let out_path = dir.path().join(crate::CONVERTED_FILE_NAME);

        let size = convert_images(&inputs, &out_path, |_| {}).unwrap();

        let bytes = fs::read(&out_path).unwrap();
        assert_eq!(size, bytes.len() as u64);
        assert_eq!(lopdf::Document::load_mem(&bytes).unwrap().get_pages().len(), 2);
    }
}
