//! # Conversion Module
//!
//! This module defines the [`ConversionSpec`] shared by every batch item and
//! the enums it is built from: the [`TargetFormat`] to encode into and the
//! [`ChromaSubsampling`] level applied by the JPEG encoder.
//!
//! A spec is constructed once at startup from the CLI input and is read-only
//! afterwards.

use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpecError {
    #[error("Unknown target format: {message}")]
    UnknownFormat { message: String },

    #[error("Chroma subsampling must be 0, 1 or 2, got: {value}")]
    InvalidSubsampling { value: u8 },

    #[error("Quality must be between 1 and 100, got: {value}")]
    InvalidQuality { value: u8 },
}

/// Represents the raster format a downloaded image will be re-encoded into.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TargetFormat {
    Jpeg,
    Png,
    Webp,
}

impl TargetFormat {
    /// The extension appended to converted files.
    ///
    /// Follows the lower-cased format name, so JPEG output ends in `.jpeg`.
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }
}

impl FromStr for TargetFormat {
    type Err = SpecError;

    /// Parses a string slice into a `TargetFormat` variant, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            "webp" => Ok(Self::Webp),
            _ => Err(SpecError::UnknownFormat {
                message: s.to_string(),
            }),
        }
    }
}

impl Display for TargetFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// JPEG chroma subsampling level.
///
/// Follows the usual encoder convention: `0` keeps full color resolution
/// (4:4:4), `1` halves it horizontally (4:2:2) and `2` halves it in both
/// directions (4:2:0). Ignored by the PNG and WEBP encoders.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChromaSubsampling {
    Best = 0,
    Medium = 1,
    Worst = 2,
}

impl TryFrom<u8> for ChromaSubsampling {
    type Error = SpecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Best),
            1 => Ok(Self::Medium),
            2 => Ok(Self::Worst),
            _ => Err(SpecError::InvalidSubsampling { value }),
        }
    }
}

impl Display for ChromaSubsampling {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Best => write!(f, "4:4:4"),
            Self::Medium => write!(f, "4:2:2"),
            Self::Worst => write!(f, "4:2:0"),
        }
    }
}

/// Encoding parameters shared read-only across all batch items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionSpec {
    pub format: TargetFormat,
    /// Quality from 1 to 100. Drives the lossy quality for JPEG/WEBP and the
    /// compression level for PNG.
    pub quality: u8,
    pub subsampling: ChromaSubsampling,
}

impl ConversionSpec {
    pub fn new(
        format: TargetFormat,
        quality: u8,
        subsampling: ChromaSubsampling,
    ) -> Result<Self, SpecError> {
        if !(1..=100).contains(&quality) {
            return Err(SpecError::InvalidQuality { value: quality });
        }

        Ok(Self {
            format,
            quality,
            subsampling,
        })
    }

    /// Maps the 1-100 quality onto the PNG 0-9 compression scale.
    ///
    /// Quality 100 means level 0 (fastest, least compression) and quality 1
    /// means level 9.
    #[inline]
    pub fn png_compression_level(&self) -> u8 {
        9 - ((f32::from(self.quality) / 100.0) * 9.0).round() as u8
    }
}

/// Result of one file's conversion attempt. Either the written output path or
/// a human-readable reason; never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    Success { output_path: PathBuf },
    Failure { reason: String },
}

impl ConversionOutcome {
    #[inline]
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use super::{ChromaSubsampling, ConversionSpec, TargetFormat};

    fn spec(quality: u8) -> ConversionSpec {
        ConversionSpec::new(TargetFormat::Png, quality, ChromaSubsampling::Best).unwrap()
    }

    #[test]
    fn png_level_endpoints() {
        assert_eq!(spec(100).png_compression_level(), 0);
        assert_eq!(spec(1).png_compression_level(), 9);
    }

    #[test]
    fn png_level_stays_in_range() {
        for quality in 1..=100u8 {
            assert!(spec(quality).png_compression_level() <= 9);
        }
    }

    #[test]
    fn format_parses_case_insensitively() {
        assert_eq!(TargetFormat::from_str("JPEG").unwrap(), TargetFormat::Jpeg);
        assert_eq!(TargetFormat::from_str("WebP").unwrap(), TargetFormat::Webp);
        assert_eq!(TargetFormat::from_str("png").unwrap(), TargetFormat::Png);
        assert!(TargetFormat::from_str("avif").is_err());
    }

    #[test]
    fn subsampling_from_cli_value() {
        assert_eq!(
            ChromaSubsampling::try_from(0).unwrap(),
            ChromaSubsampling::Best
        );
        assert_eq!(
            ChromaSubsampling::try_from(2).unwrap(),
            ChromaSubsampling::Worst
        );
        assert!(ChromaSubsampling::try_from(3).is_err());
    }

    #[test]
    fn quality_is_validated() {
        assert!(
            ConversionSpec::new(TargetFormat::Jpeg, 0, ChromaSubsampling::Best).is_err()
        );
        assert!(
            ConversionSpec::new(TargetFormat::Jpeg, 100, ChromaSubsampling::Best).is_ok()
        );
    }
}
