use std::collections::HashMap;

use super::{color_key, is_transparent, nearest_index, pixel_count, source_pixel, Quantize};
use crate::constants::TRANSPARENT_INDEX;
use crate::palette::Palette;

/// A square Bayer threshold matrix, row-major, holding each of
/// `0..size * size` exactly once.
#[derive(Debug, Clone, Copy)]
pub struct BayerMatrix {
    pub size: usize,
    pub values: &'static [u8],
}

impl BayerMatrix {
    /// Offset added to every channel of the pixel at (`x`, `y`).
    ///
    /// Spans roughly one palette step around zero:
    /// `(M / n² - 0.5) * 255 / n²`.
    pub fn threshold(&self, x: usize, y: usize) -> f32 {
        let cells = (self.size * self.size) as f32;
        let value = f32::from(self.values[(y % self.size) * self.size + x % self.size]);
        (value / cells - 0.5) * (255.0 / cells)
    }
}

pub const BAYER_2X2: BayerMatrix = BayerMatrix {
    size: 2,
    values: &[
        0, 2, //
        3, 1,
    ],
};

pub const BAYER_4X4: BayerMatrix = BayerMatrix {
    size: 4,
    values: &[
        0, 8, 2, 10, //
        12, 4, 14, 6, //
        3, 11, 1, 9, //
        15, 7, 13, 5,
    ],
};

pub const BAYER_8X8: BayerMatrix = BayerMatrix {
    size: 8,
    values: &[
        0, 32, 8, 40, 2, 34, 10, 42, //
        48, 16, 56, 24, 50, 18, 58, 26, //
        12, 44, 4, 36, 14, 46, 6, 38, //
        60, 28, 52, 20, 62, 30, 54, 22, //
        3, 35, 11, 43, 1, 33, 9, 41, //
        51, 19, 59, 27, 49, 17, 57, 25, //
        15, 47, 7, 39, 13, 45, 5, 37, //
        63, 31, 55, 23, 61, 29, 53, 21,
    ],
};

/// Ordered dithering: each pixel is nudged by a position-dependent threshold
/// and then matched like [`NearestColor`](super::NearestColor).
///
/// Pixels are independent of each other, so lookups of the adjusted colors
/// are memoized for the duration of one call.
#[derive(Debug, Clone, Copy)]
pub struct OrderedDither {
    matrix: BayerMatrix,
}

impl OrderedDither {
    pub fn new(matrix: BayerMatrix) -> Self {
        Self { matrix }
    }
}

impl Quantize for OrderedDither {
    fn quantize(&self, rgba: &[u8], width: usize, height: usize, palette: &Palette) -> Vec<u8> {
        let count = pixel_count(width, height);
        if count == 0 {
            return Vec::new();
        }

        let mut cache: HashMap<u32, u8> = HashMap::new();
        let mut indices = Vec::with_capacity(count);

        for y in 0..height {
            for x in 0..width {
                let pixel = source_pixel(rgba, y * width + x);
                if is_transparent(pixel) {
                    indices.push(TRANSPARENT_INDEX);
                    continue;
                }

                let threshold = self.matrix.threshold(x, y);
                let adjusted: [u8; 3] = std::array::from_fn(|c| {
                    (f32::from(pixel[c]) + threshold).round().clamp(0.0, 255.0) as u8
                });
                let index = *cache
                    .entry(color_key(adjusted))
                    .or_insert_with(|| nearest_index(palette, adjusted.map(f32::from)));
                indices.push(index);
            }
        }

        indices
    }
}
