//! RGBA to palette index conversion.
//!
//! Every algorithm implements [`Quantize`]; [`ColorApproximationMode`] picks
//! one per call. All of them share two rules:
//!
//! - a pixel with alpha below [`ALPHA_THRESHOLD`] becomes
//!   [`TRANSPARENT_INDEX`] and takes no part in dithering
//! - an opaque pixel never becomes [`TRANSPARENT_INDEX`], even when that
//!   palette entry is the closest color

mod diffusion;
mod nearest;
mod ordered;

use std::fmt;
use std::str::FromStr;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{ALPHA_THRESHOLD, TRANSPARENT_INDEX};
use crate::palette::Palette;

pub use diffusion::{ErrorDiffusion, Kernel, ATKINSON, FLOYD_STEINBERG};
pub use nearest::NearestColor;
pub use ordered::{BayerMatrix, OrderedDither, BAYER_2X2, BAYER_4X4, BAYER_8X8};

/// Strategy used to approximate RGBA colors with palette entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ColorApproximationMode {
    /// Closest palette color per pixel.
    #[default]
    #[serde(rename = "nearest")]
    NearestColor,
    /// Error diffusion, 7/16 3/16 5/16 1/16.
    #[serde(rename = "floyd-steinberg")]
    FloydSteinberg,
    /// Error diffusion of 6/8 of the error to six neighbors.
    #[serde(rename = "atkinson")]
    Atkinson,
    #[serde(rename = "bayer-2x2")]
    Bayer2x2,
    #[serde(rename = "bayer-4x4")]
    Bayer4x4,
    #[serde(rename = "bayer-8x8")]
    Bayer8x8,
}

impl ColorApproximationMode {
    pub const ALL: [ColorApproximationMode; 6] = [
        ColorApproximationMode::NearestColor,
        ColorApproximationMode::FloydSteinberg,
        ColorApproximationMode::Atkinson,
        ColorApproximationMode::Bayer2x2,
        ColorApproximationMode::Bayer4x4,
        ColorApproximationMode::Bayer8x8,
    ];

    pub fn id(self) -> &'static str {
        match self {
            ColorApproximationMode::NearestColor => "nearest",
            ColorApproximationMode::FloydSteinberg => "floyd-steinberg",
            ColorApproximationMode::Atkinson => "atkinson",
            ColorApproximationMode::Bayer2x2 => "bayer-2x2",
            ColorApproximationMode::Bayer4x4 => "bayer-4x4",
            ColorApproximationMode::Bayer8x8 => "bayer-8x8",
        }
    }

    /// The algorithm behind this mode.
    pub fn quantizer(self) -> Box<dyn Quantize + Send + Sync> {
        match self {
            ColorApproximationMode::NearestColor => Box::new(NearestColor),
            ColorApproximationMode::FloydSteinberg => {
                Box::new(ErrorDiffusion::new(FLOYD_STEINBERG))
            }
            ColorApproximationMode::Atkinson => Box::new(ErrorDiffusion::new(ATKINSON)),
            ColorApproximationMode::Bayer2x2 => Box::new(OrderedDither::new(BAYER_2X2)),
            ColorApproximationMode::Bayer4x4 => Box::new(OrderedDither::new(BAYER_4X4)),
            ColorApproximationMode::Bayer8x8 => Box::new(OrderedDither::new(BAYER_8X8)),
        }
    }
}

impl fmt::Display for ColorApproximationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown color approximation mode '{0}'")]
pub struct ParseModeError(pub String);

impl FromStr for ColorApproximationMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColorApproximationMode::ALL
            .into_iter()
            .find(|mode| mode.id() == s)
            .ok_or_else(|| ParseModeError(s.to_string()))
    }
}

/// Converts an RGBA image into palette indices.
pub trait Quantize {
    /// Quantizes `rgba` (row-major, 4 bytes per pixel) to one index per
    /// pixel. Pixels missing from a short buffer count as transparent.
    /// Dimensions whose pixel count overflows `usize` yield no indices.
    fn quantize(&self, rgba: &[u8], width: usize, height: usize, palette: &Palette) -> Vec<u8>;
}

/// Quantizes `rgba` against `palette` with the algorithm selected by `mode`.
///
/// Never fails: every input yields `width * height` indices, or none when
/// that product overflows.
pub fn quantize(
    rgba: &[u8],
    width: usize,
    height: usize,
    palette: &Palette,
    mode: ColorApproximationMode,
) -> Vec<u8> {
    debug!("Quantizing {}x{} pixels with {}", width, height, mode);

    let indices = mode.quantizer().quantize(rgba, width, height, palette);

    let transparent = indices
        .iter()
        .filter(|&&index| index == TRANSPARENT_INDEX)
        .count();
    debug!(
        "Quantization done: {} of {} pixels transparent",
        transparent,
        indices.len()
    );

    indices
}

/// `width * height`, or 0 when the product overflows.
pub(crate) fn pixel_count(width: usize, height: usize) -> usize {
    width.checked_mul(height).unwrap_or_else(|| {
        warn!("Pixel count of {}x{} overflows, quantizing nothing", width, height);
        0
    })
}

/// RGBA of pixel `index`, or fully transparent black past the buffer end.
pub(crate) fn source_pixel(rgba: &[u8], index: usize) -> [u8; 4] {
    index
        .checked_mul(4)
        .and_then(|start| rgba.get(start..start.checked_add(4)?))
        .and_then(|pixel| pixel.try_into().ok())
        .unwrap_or([0; 4])
}

pub(crate) fn is_transparent(pixel: [u8; 4]) -> bool {
    pixel[3] < ALPHA_THRESHOLD
}

/// Palette index closest to `rgb` by Euclidean RGB distance, lowest index on
/// ties. [`TRANSPARENT_INDEX`] is never returned.
pub(crate) fn nearest_index(palette: &Palette, rgb: [f32; 3]) -> u8 {
    let mut best_index = 0u8;
    let mut best_distance = f32::INFINITY;

    for (index, color) in palette.colors().iter().enumerate() {
        if index == TRANSPARENT_INDEX as usize {
            continue;
        }
        let distance: f32 = rgb
            .iter()
            .zip(color)
            .map(|(&value, &channel)| {
                let diff = value - f32::from(channel);
                diff * diff
            })
            .sum();
        if distance < best_distance {
            best_distance = distance;
            best_index = index as u8;
        }
    }

    best_index
}

/// Packs an RGB triple into the memoization key used by the cached modes.
pub(crate) fn color_key(rgb: [u8; 3]) -> u32 {
    (u32::from(rgb[0]) << 16) | (u32::from(rgb[1]) << 8) | u32::from(rgb[2])
}
