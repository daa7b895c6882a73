//! Combine JPEG/PNG images into one PDF, one full-page image per page.

use crate::assemble::{begin_page, DocumentBuilder, PageSize};
use crate::error::{Result, ShrinkError};
use crate::progress::before_item;
use image::ImageReader;
use std::io::Cursor;

/// File name for the combined document
pub const CONVERTED_FILE_NAME: &str = "converted_images.pdf";

/// Native pixel size of encoded image bytes.
///
/// The whole image is decoded, so a readable header over a corrupt body fails here.
pub fn image_dimensions(bytes: &[u8]) -> std::result::Result<(u32, u32), String> {
    let image = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| e.to_string())?
        .decode()
        .map_err(|e| e.to_string())?;
    Ok((image.width(), image.height()))
}

/// Build a PDF whose page `i` is image `i` at its native pixel size.
///
/// Images are placed with their original encoded bytes; nothing is re-encoded.
pub fn build_pdf_from_images<B, I>(
    mut builder: B,
    images: &[I],
    mut on_progress: impl FnMut(u8),
) -> Result<Vec<u8>>
where
    B: DocumentBuilder,
    I: AsRef<[u8]>,
{
    if images.is_empty() {
        return Err(ShrinkError::NoImages);
    }

    let total = images.len();
    for (index, image) in images.iter().enumerate() {
        on_progress(before_item(index, total));

        let bytes = image.as_ref();
        let (width, height) =
            image_dimensions(bytes).map_err(|message| ShrinkError::ImageDecode {
                index,
                message,
            })?;
        log::debug!("Image {}/{}: {}x{} px", index + 1, total, width, height);

        let size = PageSize::from_pixels(width, height);
        begin_page(&mut builder, index, size)?;
        builder.place_image(bytes, 0.0, 0.0, size.width, size.height)?;
    }

    on_progress(100);
    log::info!("Combined {} image(s) into one PDF", total);
    builder.serialize()
}
