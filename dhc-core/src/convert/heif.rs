//! HEIF container sniffing and decoding.
//!
//! The `image` crate has no HEIF support, so blobs carrying a HEIF brand in
//! their `ftyp` box are routed through libheif and rebuilt as a
//! [`DynamicImage`] before joining the normal pipeline.
use image::DynamicImage;
use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};
use once_cell::sync::OnceCell;

use super::ConvertError;

/// Brands accepted inside the `ftyp` box.
const HEIF_BRANDS: [&[u8; 4]; 6] = [b"heic", b"heix", b"heif", b"hevc", b"mif1", b"msf1"];

/// Returns the process-wide decoder handle, initializing it on first use.
/// Repeated calls are a no-op.
fn lib_heif() -> &'static LibHeif {
    static LIB_HEIF: OnceCell<LibHeif> = OnceCell::new();
    LIB_HEIF.get_or_init(LibHeif::new)
}

/// Checks the `ftyp` box for a HEIF brand.
pub(crate) fn is_heif(data: &[u8]) -> bool {
    if data.len() < 12 || &data[4..8] != b"ftyp" {
        return false;
    }

    let brand = &data[8..12];
    HEIF_BRANDS.iter().any(|known| &known[..] == brand)
}

/// Decodes the primary image of a HEIF container into interleaved 8-bit
/// RGB(A) pixels.
pub(crate) fn decode(data: &[u8]) -> Result<DynamicImage, ConvertError> {
    let context = HeifContext::read_from_bytes(data).map_err(decode_error)?;
    let handle = context.primary_image_handle().map_err(decode_error)?;
    let has_alpha = handle.has_alpha_channel();

    let chroma = if has_alpha {
        RgbChroma::Rgba
    } else {
        RgbChroma::Rgb
    };
    let decoded = lib_heif()
        .decode(&handle, ColorSpace::Rgb(chroma), None)
        .map_err(decode_error)?;

    let planes = decoded.planes();
    let plane = planes.interleaved.ok_or_else(|| ConvertError::Decode {
        message: "HEIF decoder returned no interleaved plane".to_string(),
    })?;

    let width = plane.width;
    let height = plane.height;
    let channels: usize = if has_alpha { 4 } else { 3 };
    let row_len = width as usize * channels;

    // Decoded rows may carry stride padding; copy them out without it.
    let mut pixels = Vec::with_capacity(row_len * height as usize);
    for row in plane.data.chunks_exact(plane.stride).take(height as usize) {
        pixels.extend_from_slice(&row[..row_len]);
    }

    let image = if has_alpha {
        image::RgbaImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgba8)
    } else {
        image::RgbImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8)
    };

    image.ok_or_else(|| ConvertError::Decode {
        message: "HEIF plane size does not match the reported dimensions".to_string(),
    })
}

fn decode_error(error: libheif_rs::HeifError) -> ConvertError {
    ConvertError::Decode {
        message: error.to_string(),
    }
}

#[cfg(test)]
mod test {
    use super::is_heif;

    fn ftyp(brand: &[u8; 4]) -> Vec<u8> {
        let mut data = vec![0x00, 0x00, 0x00, 0x18];
        data.extend_from_slice(b"ftyp");
        data.extend_from_slice(brand);
        data.extend_from_slice(&[0u8; 8]);
        data
    }

    #[test]
    fn recognizes_heif_brands() {
        assert!(is_heif(&ftyp(b"heic")));
        assert!(is_heif(&ftyp(b"heif")));
        assert!(is_heif(&ftyp(b"mif1")));
    }

    #[test]
    fn rejects_other_containers() {
        assert!(!is_heif(&ftyp(b"isom"))); // plain MP4
        assert!(!is_heif(b"\x89PNG\r\n\x1a\n\x00\x00\x00\x0dIHDR"));
        assert!(!is_heif(b"short"));
    }
}
