//! RGBA-facing entry points that tie the picture format, the palette and the
//! quantizers together.

use log::{error, info};
use thiserror::Error;

use crate::image::encoder::header_dimensions;
use crate::image::{decode, encode, EncodingError, FormatError, Header};
use crate::palette::Palette;
use crate::quantize::{quantize, ColorApproximationMode};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Format error: {0}")]
    Format(#[from] FormatError),
    #[error("Encoding error: {0}")]
    Encoding(#[from] EncodingError),
    #[error("RGBA buffer holds {actual} bytes, expected {expected}")]
    RgbaBufferSize { expected: usize, actual: usize },
}

/// A decoded picture expanded to RGBA, with the header it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaImage {
    pub header: Header,
    pub rgba: Vec<u8>,
}

impl RgbaImage {
    pub fn width(&self) -> usize {
        self.header.dimensions().0
    }

    pub fn height(&self) -> usize {
        self.header.dimensions().1
    }
}

/// Decodes a picture lump straight to RGBA.
///
/// # Errors
/// - Returns `CodecError::Format` if the header is unusable
pub fn decode_to_rgba(data: &[u8], palette: &Palette) -> Result<RgbaImage, CodecError> {
    let image = decode(data)?;
    let rgba = image.to_rgba(palette);
    Ok(RgbaImage {
        header: image.header,
        rgba,
    })
}

/// Quantizes an RGBA image with `mode` and encodes the result.
///
/// # Parameters
/// - `rgba`: row-major RGBA, exactly `width * height * 4` bytes
/// - `offset`: left and top offset written to the header
///
/// # Errors
/// - Returns `CodecError::Encoding` if the dimensions cannot be encoded
/// - Returns `CodecError::RgbaBufferSize` if `rgba` has the wrong length
pub fn encode_from_rgba(
    rgba: &[u8],
    width: usize,
    height: usize,
    palette: &Palette,
    offset: (i16, i16),
    mode: ColorApproximationMode,
) -> Result<Vec<u8>, CodecError> {
    // Bounds the buffer size below, so the product cannot overflow
    header_dimensions(width, height)?;

    let expected = width * height * 4;
    if rgba.len() != expected {
        error!(
            "RGBA buffer of {} bytes does not match {}x{}",
            rgba.len(),
            width,
            height
        );
        return Err(CodecError::RgbaBufferSize {
            expected,
            actual: rgba.len(),
        });
    }

    info!("Converting {}x{} RGBA image using {}", width, height, mode);
    let indices = quantize(rgba, width, height, palette, mode);
    let (offset_x, offset_y) = offset;

    Ok(encode(&indices, width, height, offset_x, offset_y)?)
}
