use std::collections::HashMap;

use super::{color_key, is_transparent, nearest_index, pixel_count, source_pixel, Quantize};
use crate::constants::TRANSPARENT_INDEX;
use crate::palette::Palette;

/// Maps every pixel to its closest palette entry, independently of its
/// neighbors.
///
/// Lookups are memoized per distinct RGB value for the duration of one call.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestColor;

impl Quantize for NearestColor {
    fn quantize(&self, rgba: &[u8], width: usize, height: usize, palette: &Palette) -> Vec<u8> {
        let mut cache: HashMap<u32, u8> = HashMap::new();

        (0..pixel_count(width, height))
            .map(|i| {
                let pixel = source_pixel(rgba, i);
                if is_transparent(pixel) {
                    return TRANSPARENT_INDEX;
                }
                let rgb = [pixel[0], pixel[1], pixel[2]];
                *cache
                    .entry(color_key(rgb))
                    .or_insert_with(|| nearest_index(palette, rgb.map(f32::from)))
            })
            .collect()
    }
}
