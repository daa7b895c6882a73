//! Error type shared by every pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while transcoding documents or images.
///
/// Every variant is fatal to the call that produced it: nothing is retried
/// and no partial output is returned.
#[derive(Error, Debug)]
pub enum ShrinkError {
    #[error("Failed to load PDF: {0}")]
    Decode(String),

    #[error("Failed to load PDF: document has no pages")]
    EmptyDocument,

    #[error("Failed to render page {page}: {message}")]
    Render { page: usize, message: String },

    #[error("Failed to read image {index}: {message}")]
    ImageDecode { index: usize, message: String },

    #[error("Failed to encode output: {0}")]
    Encode(String),

    #[error("PDF renderer unavailable: {0}")]
    RendererUnavailable(String),

    #[error("No images to convert")]
    NoImages,

    #[error("{name} is not a {expected} file")]
    UnsupportedInput { name: String, expected: &'static str },

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ShrinkError {
    /// True for input that could not be opened as a document at all.
    pub fn is_decode(&self) -> bool {
        matches!(self, ShrinkError::Decode(_) | ShrinkError::EmptyDocument)
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ShrinkError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ShrinkError>;
