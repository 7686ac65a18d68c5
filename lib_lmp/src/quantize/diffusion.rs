//! Error diffusion quantizers.
//!
//! Pixels are visited in raster order. Each opaque pixel is matched to its
//! nearest palette color and the difference is pushed forward to unvisited
//! neighbors according to a [`Kernel`]. Transparent pixels neither receive
//! nor spread error.

use super::{is_transparent, nearest_index, pixel_count, source_pixel, Quantize};
use crate::constants::TRANSPARENT_INDEX;
use crate::palette::Palette;

/// An error diffusion kernel.
///
/// Each neighbor at (`dx`, `dy`) receives `error * weight / divisor`.
/// `max_dy` is how many rows ahead the kernel reaches, so the error buffer
/// holds `max_dy + 1` rows.
#[derive(Debug, Clone, Copy)]
pub struct Kernel {
    pub entries: &'static [(i32, i32, u8)],
    pub divisor: u8,
    pub max_dy: usize,
    /// Round the error-adjusted value to a whole channel value before
    /// matching.
    pub round: bool,
}

/// Floyd-Steinberg: 16/16 of the error over four neighbors, unrounded.
///
/// ```text
///        X   7
///    3   5   1
/// ```
pub const FLOYD_STEINBERG: Kernel = Kernel {
    entries: &[
        (1, 0, 7),  // right
        (-1, 1, 3), // bottom-left
        (0, 1, 5),  // bottom
        (1, 1, 1),  // bottom-right
    ],
    divisor: 16,
    max_dy: 1,
    round: false,
};

/// Atkinson: 6/8 of the error over six neighbors, the rest is dropped.
///
/// ```text
///        X   1   1
///    1   1   1
///        1
/// ```
pub const ATKINSON: Kernel = Kernel {
    entries: &[
        (1, 0, 1),  // right
        (2, 0, 1),  // two right
        (-1, 1, 1), // bottom-left
        (0, 1, 1),  // bottom
        (1, 1, 1),  // bottom-right
        (0, 2, 1),  // two below
    ],
    divisor: 8,
    max_dy: 2,
    round: true,
};

#[derive(Debug, Clone, Copy)]
pub struct ErrorDiffusion {
    kernel: Kernel,
}

impl ErrorDiffusion {
    pub fn new(kernel: Kernel) -> Self {
        Self { kernel }
    }
}

/// Rolling per-row error accumulators, `max_dy + 1` rows deep.
struct ErrorRows {
    rows: Vec<Vec<[f32; 3]>>,
}

impl ErrorRows {
    fn new(width: usize, max_dy: usize) -> Self {
        Self {
            rows: vec![vec![[0.0; 3]; width]; max_dy + 1],
        }
    }

    fn get(&self, x: usize, y: usize) -> [f32; 3] {
        self.rows[y % self.rows.len()][x]
    }

    fn add(&mut self, x: usize, y: usize, error: [f32; 3]) {
        let depth = self.rows.len();
        let slot = &mut self.rows[y % depth][x];
        for (acc, e) in slot.iter_mut().zip(error) {
            *acc += e;
        }
    }

    /// Zeroes row `y` so its slot can serve row `y + depth`.
    fn recycle(&mut self, y: usize) {
        let depth = self.rows.len();
        self.rows[y % depth].fill([0.0; 3]);
    }
}

impl Quantize for ErrorDiffusion {
    fn quantize(&self, rgba: &[u8], width: usize, height: usize, palette: &Palette) -> Vec<u8> {
        let count = pixel_count(width, height);
        if count == 0 {
            return Vec::new();
        }

        let kernel = &self.kernel;
        let divisor = f32::from(kernel.divisor);
        let mut indices = vec![TRANSPARENT_INDEX; count];
        let mut errors = ErrorRows::new(width, kernel.max_dy);

        for y in 0..height {
            for x in 0..width {
                let i = y * width + x;
                let pixel = source_pixel(rgba, i);
                if is_transparent(pixel) {
                    continue;
                }

                let carried = errors.get(x, y);
                let value: [f32; 3] = std::array::from_fn(|c| {
                    let v = f32::from(pixel[c]) + carried[c];
                    let v = if kernel.round { v.round() } else { v };
                    v.clamp(0.0, 255.0)
                });

                let index = nearest_index(palette, value);
                indices[i] = index;

                let chosen = palette.color(index);
                let error: [f32; 3] = std::array::from_fn(|c| value[c] - f32::from(chosen[c]));

                for &(dx, dy, weight) in kernel.entries {
                    let nx = x as i64 + i64::from(dx);
                    let ny = y + dy as usize;
                    if nx < 0 || nx >= width as i64 || ny >= height {
                        continue;
                    }
                    let share = error.map(|e| e * f32::from(weight) / divisor);
                    errors.add(nx as usize, ny, share);
                }
            }
            errors.recycle(y);
        }

        indices
    }
}
