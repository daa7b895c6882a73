//! Output document assembly.
//!
//! Pipelines talk to a `DocumentBuilder`, which knows only four things:
//! start a document, add a page, place one image, and serialize. `LopdfBuilder`
//! is the production implementation; sizes are given in device pixels and
//! written to the PDF in points.

use crate::error::{Result, ShrinkError};
use flate2::write::ZlibEncoder;
use image::codecs::jpeg::JpegDecoder;
use image::{DynamicImage, ExtendedColorType, ImageDecoder, ImageFormat};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::io::{Cursor, Write};

/// Points per device pixel (a 96 DPI pixel)
pub const PX_TO_PT: f32 = 72.0 / 96.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    /// Landscape when strictly wider than tall
    pub fn for_size(width: f32, height: f32) -> Self {
        if width > height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }
}

/// Page size in device pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    pub fn new(width: f32, height: f32) -> Self {
        PageSize { width, height }
    }

    pub fn from_pixels(width: u32, height: u32) -> Self {
        PageSize::new(width as f32, height as f32)
    }

    pub fn orientation(&self) -> Orientation {
        Orientation::for_size(self.width, self.height)
    }

    /// Swap sides if needed so the longer one matches `orientation`.
    pub fn oriented(self, orientation: Orientation) -> Self {
        let (short, long) = if self.width <= self.height {
            (self.width, self.height)
        } else {
            (self.height, self.width)
        };
        match orientation {
            Orientation::Portrait => PageSize::new(short, long),
            Orientation::Landscape => PageSize::new(long, short),
        }
    }
}

/// Narrow PDF-building capability used by both pipelines.
pub trait DocumentBuilder {
    /// Start the document with its first page.
    fn create_document(&mut self, size: PageSize, orientation: Orientation) -> Result<()>;

    /// Append a page; every page carries its own size.
    fn add_page(&mut self, size: PageSize, orientation: Orientation) -> Result<()>;

    /// Draw encoded image bytes on the latest page, (x, y) being the top-left corner.
    fn place_image(&mut self, image: &[u8], x: f32, y: f32, width: f32, height: f32)
        -> Result<()>;

    fn serialize(self) -> Result<Vec<u8>>
    where
        Self: Sized;
}

/// Open the page for item `index` of a sequence: the first one creates the document.
pub(crate) fn begin_page<B: DocumentBuilder>(
    builder: &mut B,
    index: usize,
    size: PageSize,
) -> Result<()> {
    let orientation = size.orientation();
    if index == 0 {
        builder.create_document(size, orientation)
    } else {
        builder.add_page(size, orientation)
    }
}

struct PendingPage {
    size: PageSize,
    operations: Vec<Operation>,
    xobjects: Dictionary,
}

/// `DocumentBuilder` writing a PDF with lopdf.
pub struct LopdfBuilder {
    doc: Document,
    pages_id: ObjectId,
    page_ids: Vec<ObjectId>,
    current: Option<PendingPage>,
    image_count: usize,
    compress_streams: bool,
}

impl Default for LopdfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LopdfBuilder {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        LopdfBuilder {
            doc,
            pages_id,
            page_ids: Vec::new(),
            current: None,
            image_count: 0,
            compress_streams: true,
        }
    }

    /// Flate-compress content streams on serialize (on by default)
    pub fn with_stream_compression(mut self, compress_streams: bool) -> Self {
        self.compress_streams = compress_streams;
        self
    }

    fn start_page(&mut self, size: PageSize, orientation: Orientation) -> Result<()> {
        self.finish_page()?;
        self.current = Some(PendingPage {
            size: size.oriented(orientation),
            operations: Vec::new(),
            xobjects: Dictionary::new(),
        });
        Ok(())
    }

    /// Write out the pending page, if any.
    fn finish_page(&mut self) -> Result<()> {
        let Some(page) = self.current.take() else {
            return Ok(());
        };

        let content = Content {
            operations: page.operations,
        };
        let content_bytes = content
            .encode()
            .map_err(|e| ShrinkError::Encode(format!("Failed to encode page content: {}", e)))?;
        let content_id = self
            .doc
            .add_object(Stream::new(Dictionary::new(), content_bytes));

        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::from(page.size.width * PX_TO_PT),
                Object::from(page.size.height * PX_TO_PT),
            ],
            "Resources" => dictionary! {
                "XObject" => page.xobjects,
            },
            "Contents" => content_id,
        });
        self.page_ids.push(page_id);
        Ok(())
    }
}

impl DocumentBuilder for LopdfBuilder {
    fn create_document(&mut self, size: PageSize, orientation: Orientation) -> Result<()> {
        if self.current.is_some() || !self.page_ids.is_empty() {
            return Err(ShrinkError::Encode("document already created".to_string()));
        }
        self.start_page(size, orientation)
    }

    fn add_page(&mut self, size: PageSize, orientation: Orientation) -> Result<()> {
        if self.current.is_none() {
            return Err(ShrinkError::Encode(
                "add_page called before create_document".to_string(),
            ));
        }
        self.start_page(size, orientation)
    }

    fn place_image(
        &mut self,
        image: &[u8],
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Result<()> {
        let Some(page_height) = self.current.as_ref().map(|page| page.size.height) else {
            return Err(ShrinkError::Encode("no page to place image on".to_string()));
        };

        let xobject_id = add_image_xobject(&mut self.doc, image)?;
        self.image_count += 1;
        let name = format!("Im{}", self.image_count);

        // PDF user space has its origin at the bottom-left corner
        let operations = vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::from(width * PX_TO_PT),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::from(height * PX_TO_PT),
                    Object::from(x * PX_TO_PT),
                    Object::from((page_height - y - height) * PX_TO_PT),
                ],
            ),
            Operation::new("Do", vec![Object::Name(name.clone().into_bytes())]),
            Operation::new("Q", vec![]),
        ];

        if let Some(page) = self.current.as_mut() {
            page.xobjects.set(name, Object::Reference(xobject_id));
            page.operations.extend(operations);
        }
        Ok(())
    }

    fn serialize(mut self) -> Result<Vec<u8>> {
        self.finish_page()?;
        if self.page_ids.is_empty() {
            return Err(ShrinkError::Encode("document has no pages".to_string()));
        }

        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => self.page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
            "Count" => self.page_ids.len() as i64,
        };
        self.doc.objects.insert(self.pages_id, Object::Dictionary(pages));

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        let info_id = self.doc.add_object(dictionary! {
            "Producer" => Object::string_literal("pdf-shrink"),
        });
        self.doc.trailer.set("Info", info_id);

        if self.compress_streams {
            self.doc.compress();
        }

        let mut output = Vec::new();
        self.doc
            .save_to(&mut output)
            .map_err(|e| ShrinkError::Encode(format!("Failed to save PDF: {}", e)))?;

        log::debug!(
            "Serialized {} page(s), {} bytes",
            self.page_ids.len(),
            output.len()
        );
        Ok(output)
    }
}

/// Add an Image XObject for encoded image bytes and return its id.
///
/// JPEG data is embedded as-is; anything else the `image` crate can read is
/// stored losslessly with Flate, plus an SMask when it carries transparency.
fn add_image_xobject(doc: &mut Document, bytes: &[u8]) -> Result<ObjectId> {
    if let Ok(ImageFormat::Jpeg) = image::guess_format(bytes) {
        if let Some(stream) = passthrough_jpeg_stream(bytes)? {
            return Ok(doc.add_object(stream));
        }
    }

    let img = image::load_from_memory(bytes)
        .map_err(|e| ShrinkError::Encode(format!("Failed to decode image: {}", e)))?;
    let (mut main_stream, smask_stream) = flate_image_streams(&img)?;
    if let Some(smask) = smask_stream {
        let smask_id = doc.add_object(smask);
        main_stream.dict.set("SMask", Object::Reference(smask_id));
    }
    Ok(doc.add_object(main_stream))
}

/// DCTDecode stream over the original JPEG bytes.
///
/// Returns `None` for colour models that cannot be embedded verbatim (CMYK).
fn passthrough_jpeg_stream(bytes: &[u8]) -> Result<Option<Stream>> {
    let decoder = JpegDecoder::new(Cursor::new(bytes))
        .map_err(|e| ShrinkError::Encode(format!("Failed to read JPEG header: {}", e)))?;
    let (width, height) = decoder.dimensions();

    let color_space: &[u8] = match decoder.original_color_type() {
        ExtendedColorType::L8 => b"DeviceGray",
        ExtendedColorType::Rgb8 => b"DeviceRGB",
        _ => return Ok(None),
    };

    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Image".to_vec()));
    dict.set("Width", Object::Integer(width as i64));
    dict.set("Height", Object::Integer(height as i64));
    dict.set("ColorSpace", Object::Name(color_space.to_vec()));
    dict.set("BitsPerComponent", Object::Integer(8));
    dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));
    dict.set("Length", Object::Integer(bytes.len() as i64));

    Ok(Some(
        Stream::new(dict, bytes.to_vec()).with_compression(false),
    ))
}

fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::best());
    encoder
        .write_all(data)
        .map_err(|e| ShrinkError::Encode(format!("Failed to compress image data: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| ShrinkError::Encode(format!("Failed to finish compression: {}", e)))
}

fn flate_image_dict(width: u32, height: u32, color_space: &[u8], length: usize) -> Dictionary {
    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Image".to_vec()));
    dict.set("Width", Object::Integer(width as i64));
    dict.set("Height", Object::Integer(height as i64));
    dict.set("ColorSpace", Object::Name(color_space.to_vec()));
    dict.set("BitsPerComponent", Object::Integer(8));
    dict.set("Filter", Object::Name(b"FlateDecode".to_vec()));
    dict.set("Length", Object::Integer(length as i64));
    dict
}

/// Lossless RGB stream, with a separate alpha SMask when any pixel is translucent
fn flate_image_streams(img: &DynamicImage) -> Result<(Stream, Option<Stream>)> {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgb_data = Vec::with_capacity(width as usize * height as usize * 3);
    let mut alpha_data = Vec::with_capacity(width as usize * height as usize);
    for chunk in rgba.as_raw().chunks(4) {
        rgb_data.extend_from_slice(&chunk[..3]);
        alpha_data.push(chunk[3]);
    }

    let compressed_rgb = deflate(&rgb_data)?;
    let main_stream = Stream::new(
        flate_image_dict(width, height, b"DeviceRGB", compressed_rgb.len()),
        compressed_rgb,
    )
    .with_compression(false);

    let smask_stream = if alpha_data.iter().any(|&a| a < 255) {
        let compressed_alpha = deflate(&alpha_data)?;
        Some(
            Stream::new(
                flate_image_dict(width, height, b"DeviceGray", compressed_alpha.len()),
                compressed_alpha,
            )
            .with_compression(false),
        )
    } else {
        None
    };

    Ok((main_stream, smask_stream))
}
