#![allow(dead_code)]

use lib_lmp::Palette;

pub const TRANSPARENT: u8 = 247;

pub const GRADIENT_WIDTH: usize = 16;
pub const GRADIENT_HEIGHT: usize = 16;

/// Palette with 256 pairwise distinct colors, so every opaque index maps
/// back to itself through RGBA.
pub fn distinct_palette() -> Palette {
    let mut colors = [[0u8; 3]; 256];
    for (i, color) in colors.iter_mut().enumerate() {
        let i = i as u8;
        *color = [i, 255 - i, i.wrapping_mul(37)];
    }
    Palette::new(colors)
}

/// Black everywhere except index 1, which is white.
pub fn black_and_white() -> Palette {
    let mut colors = [[0u8; 3]; 256];
    colors[1] = [255, 255, 255];
    Palette::new(colors)
}

/// Opaque RGBA gradient: red grows along x, green along y.
pub fn gradient_rgba() -> Vec<u8> {
    let mut rgba = Vec::with_capacity(GRADIENT_WIDTH * GRADIENT_HEIGHT * 4);
    for y in 0..GRADIENT_HEIGHT {
        for x in 0..GRADIENT_WIDTH {
            rgba.extend_from_slice(&[(x * 17) as u8, (y * 17) as u8, 128, 255]);
        }
    }
    rgba
}

/// Index buffer with scattered transparent holes and no opaque 247.
pub fn holey_indices(width: usize, height: usize) -> Vec<u8> {
    (0..width * height)
        .map(|i| {
            if i % 7 == 3 || i % 11 == 0 {
                TRANSPARENT
            } else {
                (i % 240) as u8
            }
        })
        .collect()
}
