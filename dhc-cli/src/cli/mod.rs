use std::path::PathBuf;

use clap::Parser;

use dhc_common::conversion::{ChromaSubsampling, ConversionSpec, SpecError};

use crate::{FormatArg, PolicyArg};

#[derive(Parser, Debug)]
#[clap(name = "Drive HEIC Converter", author, version, about, long_about = None)]
pub struct Cli {
    /// Google Drive folder ID containing the HEIC files
    #[clap(long, value_name = "ID", help_heading = "DRIVE")]
    pub folder_id: String,

    /// Path to the service account credentials JSON file
    ///
    /// When omitted, the path is read from the GOOGLE_APPLICATION_CREDENTIALS
    /// environment variable.
    #[clap(long, value_name = "PATH", help_heading = "DRIVE")]
    pub credentials: Option<PathBuf>,

    /// Where to save converted images (If the path doesn't exist, it will be created.)
    #[clap(
        short = 'o',
        long,
        value_name = "PATH",
        default_value = "./converted_photos",
        help_heading = "SAVE"
    )]
    pub output: PathBuf,

    /// Target format for conversion
    #[clap(
        short,
        long,
        value_enum,
        ignore_case = true,
        default_value = "jpeg",
        help_heading = "CONVERSION"
    )]
    pub format: FormatArg,

    /// Quality setting
    ///
    /// [range: 1-100]
    #[clap(
        short,
        long,
        value_name = "NUMBER",
        value_parser(clap::value_parser!(u8).range(1..=100)),
        default_value_t = 100,
        help_heading = "CONVERSION"
    )]
    pub quality: u8,

    /// JPEG chroma subsampling (0=best, 1=medium, 2=worst quality)
    #[clap(
        short,
        long,
        value_name = "NUMBER",
        value_parser(clap::value_parser!(u8).range(0..=2)),
        default_value_t = 0,
        help_heading = "CONVERSION"
    )]
    pub subsampling: u8,

    /// What to do with the rest of the batch when a single file fails
    #[clap(
        long = "on-error",
        value_enum,
        default_value = "fail-fast",
        help_heading = "CONVERSION"
    )]
    pub on_error: PolicyArg,
}

impl Cli {
    /// Builds the read-only spec shared by every batch item.
    ///
    /// The clap value parsers already constrain the ranges, so this only
    /// fails on inputs that bypassed argument parsing.
    pub fn conversion_spec(&self) -> Result<ConversionSpec, SpecError> {
        let subsampling = ChromaSubsampling::try_from(self.subsampling)?;
        ConversionSpec::new(self.format.0, self.quality, subsampling)
    }
}
