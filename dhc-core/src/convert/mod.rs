//! Decode → normalize → encode pipeline for one downloaded blob.
//!
//! Every attempt follows the same steps: make sure the destination directory
//! exists, decode the bytes, flatten the color representation, then encode
//! under the shared [`ConversionSpec`]. Whatever goes wrong ends up as this
//! item's [`ConversionOutcome::Failure`]; nothing here aborts the process.
use std::fs::{File, create_dir_all};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::DynamicImage;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use jpeg_encoder::{ColorType, Encoder, SamplingFactor};
use log::debug;
use thiserror::Error;

use dhc_common::conversion::{ChromaSubsampling, ConversionOutcome, ConversionSpec, TargetFormat};
use dhc_common::remote_file::DownloadedBlob;

#[cfg(feature = "heif")]
mod heif;

/// Internal error for a single conversion attempt. Callers only ever see the
/// rendered reason inside a [`ConversionOutcome::Failure`].
#[derive(Error, Debug)]
pub(crate) enum ConvertError {
    #[error("decode error: {message}")]
    Decode { message: String },

    #[error("Image dimensions {width}x{height} exceed the JPEG encoder limit")]
    TooLarge { width: u32, height: u32 },

    #[error("Encode failed: {message}")]
    Encode { message: String },

    #[error("Failed to write output file: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

/// Converts one blob and writes the result under `output_dir`.
///
/// The directory is created on demand; running against an existing directory
/// is a no-op. Never panics or propagates: the outcome carries either the
/// written path or the failure reason.
pub fn convert(blob: &DownloadedBlob, spec: ConversionSpec, output_dir: &Path) -> ConversionOutcome {
    match try_convert(blob, spec, output_dir) {
        Ok(output_path) => ConversionOutcome::Success { output_path },
        Err(error) => ConversionOutcome::Failure {
            reason: error.to_string(),
        },
    }
}

fn try_convert(
    blob: &DownloadedBlob,
    spec: ConversionSpec,
    output_dir: &Path,
) -> Result<PathBuf, ConvertError> {
    create_dir_all(output_dir)?;

    let image = decode_image(&blob.data)?;
    let image = normalize_colors(image);

    let output_path = output_dir.join(blob.output_name(spec.format));

    match spec.format {
        TargetFormat::Jpeg => encode_jpeg(&image, spec, &output_path)?,
        TargetFormat::Png => encode_png(&image, spec, &output_path)?,
        TargetFormat::Webp => encode_webp(&image, spec, &output_path)?,
    }

    debug!("Wrote {}", output_path.display());
    Ok(output_path)
}

fn decode_image(data: &[u8]) -> Result<DynamicImage, ConvertError> {
    #[cfg(feature = "heif")]
    if heif::is_heif(data) {
        return heif::decode(data);
    }

    image::load_from_memory(data).map_err(|error| ConvertError::Decode {
        message: error.to_string(),
    })
}

/// Flattens alpha and palette-expanded modes to plain 8-bit RGB and narrows
/// 16-bit single-channel images to 8-bit.
///
/// Runs before every encode regardless of whether the target format could
/// have carried the original mode.
fn normalize_colors(image: DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => image,
        DynamicImage::ImageLuma16(_) => DynamicImage::ImageLuma8(image.into_luma8()),
        other => DynamicImage::ImageRgb8(other.into_rgb8()),
    }
}

fn encode_jpeg(
    image: &DynamicImage,
    spec: ConversionSpec,
    path: &Path,
) -> Result<(), ConvertError> {
    let too_large = || ConvertError::TooLarge {
        width: image.width(),
        height: image.height(),
    };
    let width = u16::try_from(image.width()).map_err(|_| too_large())?;
    let height = u16::try_from(image.height()).map_err(|_| too_large())?;

    let mut encoder = Encoder::new_file(path, spec.quality).map_err(encode_error)?;
    encoder.set_sampling_factor(sampling_factor(spec.subsampling));
    encoder.set_optimized_huffman_tables(true);
    // Baseline output for maximum decoder compatibility.
    encoder.set_progressive(false);

    match image {
        DynamicImage::ImageLuma8(gray) => encoder
            .encode(gray.as_raw(), width, height, ColorType::Luma)
            .map_err(encode_error),
        DynamicImage::ImageRgb8(rgb) => encoder
            .encode(rgb.as_raw(), width, height, ColorType::Rgb)
            .map_err(encode_error),
        other => {
            let rgb = other.to_rgb8();
            encoder
                .encode(rgb.as_raw(), width, height, ColorType::Rgb)
                .map_err(encode_error)
        }
    }
}

fn encode_png(image: &DynamicImage, spec: ConversionSpec, path: &Path) -> Result<(), ConvertError> {
    let writer = BufWriter::new(File::create(path)?);
    let encoder = PngEncoder::new_with_quality(
        writer,
        png_compression(spec.png_compression_level()),
        FilterType::Adaptive,
    );

    image.write_with_encoder(encoder).map_err(encode_error)
}

fn encode_webp(
    image: &DynamicImage,
    spec: ConversionSpec,
    path: &Path,
) -> Result<(), ConvertError> {
    // libwebp only takes RGB/RGBA input; normalized grayscale widens here.
    let rgb = image.to_rgb8();
    let encoder = webp::Encoder::from_rgb(rgb.as_raw(), rgb.width(), rgb.height());

    let mut config = webp::WebPConfig::new().map_err(|_| ConvertError::Encode {
        message: "Failed to initialize WebP encoder config".to_string(),
    })?;
    config.quality = f32::from(spec.quality);
    // Slowest, highest-quality effort; lossy is the only mode, quality is the
    // sole control.
    config.method = 6;
    config.lossless = 0;

    let memory = encoder
        .encode_advanced(&config)
        .map_err(|error| ConvertError::Encode {
            message: format!("{error:?}"),
        })?;

    std::fs::write(path, &*memory)?;
    Ok(())
}

fn encode_error(error: impl std::fmt::Display) -> ConvertError {
    ConvertError::Encode {
        message: error.to_string(),
    }
}

const fn sampling_factor(subsampling: ChromaSubsampling) -> SamplingFactor {
    match subsampling {
        ChromaSubsampling::Best => SamplingFactor::F_1_1,
        ChromaSubsampling::Medium => SamplingFactor::F_2_1,
        ChromaSubsampling::Worst => SamplingFactor::F_2_2,
    }
}

/// Buckets the exact 0-9 level onto the tiers the encoder understands.
/// Level 0 is the fastest/least compressed end of the scale.
const fn png_compression(level: u8) -> CompressionType {
    match level {
        0..=2 => CompressionType::Fast,
        3..=6 => CompressionType::Default,
        _ => CompressionType::Best,
    }
}
