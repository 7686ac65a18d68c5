use serde::{Deserialize, Serialize};

use crate::palette::Palette;

/// Fixed 8-byte picture header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Header {
    pub width: i16,
    pub height: i16,
    pub left_offset: i16,
    pub top_offset: i16,
}

impl Header {
    pub const SIZE: usize = 4 * std::mem::size_of::<i16>();
    pub const COLUMN_OFFSET_SIZE: usize = std::mem::size_of::<i32>();

    pub fn new(width: i16, height: i16, left_offset: i16, top_offset: i16) -> Self {
        Self {
            width,
            height,
            left_offset,
            top_offset,
        }
    }

    pub fn has_valid_dimensions(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..2].copy_from_slice(&self.width.to_le_bytes());
        bytes[2..4].copy_from_slice(&self.height.to_le_bytes());
        bytes[4..6].copy_from_slice(&self.left_offset.to_le_bytes());
        bytes[6..8].copy_from_slice(&self.top_offset.to_le_bytes());
        bytes
    }

    /// Width and height as buffer dimensions. Non-positive values map to 0.
    pub fn dimensions(&self) -> (usize, usize) {
        (
            usize::try_from(self.width).unwrap_or(0),
            usize::try_from(self.height).unwrap_or(0),
        )
    }
}

/// A decoded picture: palette indices plus an explicit transparency mask,
/// both row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub header: Header,
    pub pixels: Vec<u8>,
    pub transparency: Vec<bool>,
}

impl Image {
    /// Fully transparent canvas for `header`.
    pub fn blank(header: Header) -> Self {
        let (width, height) = header.dimensions();
        let pixel_count = width * height;
        Self {
            header,
            pixels: vec![0; pixel_count],
            transparency: vec![true; pixel_count],
        }
    }

    pub fn width(&self) -> usize {
        self.header.dimensions().0
    }

    pub fn height(&self) -> usize {
        self.header.dimensions().1
    }

    /// Palette index at (`col`, `row`), or `None` when the pixel is
    /// transparent or out of bounds.
    pub fn pixel(&self, col: usize, row: usize) -> Option<u8> {
        if col >= self.width() || row >= self.height() {
            return None;
        }
        let index = row * self.width() + col;
        (!self.transparency[index]).then(|| self.pixels[index])
    }

    /// Marks (`col`, `row`) opaque with `value`. Returns false and leaves the
    /// image untouched when the position lies outside the canvas.
    pub fn set_opaque(&mut self, col: usize, row: usize, value: u8) -> bool {
        if col >= self.width() || row >= self.height() {
            return false;
        }
        let index = row * self.width() + col;
        self.pixels[index] = value;
        self.transparency[index] = false;
        true
    }

    pub fn opaque_count(&self) -> usize {
        self.transparency.iter().filter(|&&t| !t).count()
    }

    /// Expands the picture into RGBA bytes using `palette`.
    pub fn to_rgba(&self, palette: &Palette) -> Vec<u8> {
        to_rgba(self, palette)
    }
}

/// Expands `image` into RGBA bytes: palette color for every pixel, alpha 0
/// where the mask is transparent and 255 elsewhere.
pub fn to_rgba(image: &Image, palette: &Palette) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(image.pixels.len() * 4);
    for (&index, &transparent) in image.pixels.iter().zip(&image.transparency) {
        rgba.extend_from_slice(&palette.rgba(index, transparent));
    }
    rgba
}

/// One run of pixels inside a column as it appears on the wire.
///
/// `top_delta` is the raw byte: absolute row for ordinary pictures, or an
/// offset from the previous post for the tall patch convention. A post
/// without pixels only moves the delta base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub top_delta: u8,
    pub pixels: Vec<u8>,
}

impl Post {
    pub fn new(top_delta: u8, pixels: Vec<u8>) -> Self {
        Self { top_delta, pixels }
    }

    pub fn anchor(top_delta: u8) -> Self {
        Self::new(top_delta, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Bytes this post occupies: delta, length, pad, pixels, pad.
    pub fn encoded_len(&self) -> usize {
        self.pixels.len() + 4
    }
}
