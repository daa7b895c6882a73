//! Upstream input filtering.
//!
//! Hosts sniff each selected file and reject anything outside the two
//! supported families before it reaches a pipeline.

use crate::error::ShrinkError;
use image::ImageFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Pdf,
    /// JPEG or PNG
    Image,
}

impl InputKind {
    pub fn sniff(bytes: &[u8]) -> Option<InputKind> {
        // Readers tolerate junk before the header, so look a little way in
        let head = &bytes[..bytes.len().min(1024)];
        if head.windows(5).any(|w| w == b"%PDF-") {
            return Some(InputKind::Pdf);
        }
        match image::guess_format(bytes) {
            Ok(ImageFormat::Jpeg) | Ok(ImageFormat::Png) => Some(InputKind::Image),
            _ => None,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            InputKind::Pdf => "PDF",
            InputKind::Image => "JPEG or PNG",
        }
    }

    /// Reject `bytes` unless they are of this kind.
    pub fn require(self, name: &str, bytes: &[u8]) -> Result<(), ShrinkError> {
        if InputKind::sniff(bytes) == Some(self) {
            Ok(())
        } else {
            log::warn!("Rejected {}: not a {} file", name, self.description());
            Err(ShrinkError::UnsupportedInput {
                name: name.to_string(),
                expected: self.description(),
            })
        }
    }
}
