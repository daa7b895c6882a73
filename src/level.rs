//! Compression level policy.

use std::fmt;
use std::str::FromStr;

/// User-facing compression strength, chosen once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(not(target_arch = "wasm32"), derive(clap::ValueEnum))]
pub enum CompressionLevel {
    /// Light compression, highest fidelity
    Low,
    #[default]
    Medium,
    /// Strongest compression, smallest output
    High,
}

/// Render scale and encoder quality for one level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelParameters {
    /// Geometric scale applied to the native page size when rasterizing
    pub scale: f32,
    /// Lossy encoder quality in [0, 1]
    pub quality: f32,
}

impl CompressionLevel {
    pub const ALL: [CompressionLevel; 3] = [
        CompressionLevel::Low,
        CompressionLevel::Medium,
        CompressionLevel::High,
    ];

    pub fn parameters(self) -> LevelParameters {
        match self {
            CompressionLevel::Low => LevelParameters {
                scale: 1.5,
                quality: 0.8,
            },
            CompressionLevel::Medium => LevelParameters {
                scale: 1.0,
                quality: 0.6,
            },
            CompressionLevel::High => LevelParameters {
                scale: 0.7,
                quality: 0.4,
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CompressionLevel::Low => "low",
            CompressionLevel::Medium => "medium",
            CompressionLevel::High => "high",
        }
    }
}

impl fmt::Display for CompressionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CompressionLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(CompressionLevel::Low),
            "medium" => Ok(CompressionLevel::Medium),
            "high" => Ok(CompressionLevel::High),
            other => Err(format!(
                "Unknown compression level '{}' (expected low, medium or high)",
                other
            )),
        }
    }
}
