mod default;

use std::fmt;

use log::{debug, error};
use thiserror::Error;

use crate::constants::{PALETTE_BYTES, PALETTE_COLORS};
use default::DEFAULT_COLORS;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaletteError {
    #[error("Palette data too short: expected at least {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },
    #[error("Palette page {page} out of range: resource holds {pages} page(s)")]
    PageOutOfRange { page: usize, pages: usize },
}

/// The built-in palette, used until a caller supplies another one.
pub static DEFAULT_PALETTE: Palette = Palette {
    colors: DEFAULT_COLORS,
};

/// A 256-entry RGB color table.
///
/// Palettes are immutable values: switching palettes means replacing the
/// whole value, see [`PaletteSelection`].
#[derive(Clone, PartialEq, Eq)]
pub struct Palette {
    colors: [[u8; 3]; PALETTE_COLORS],
}

impl Palette {
    pub fn new(colors: [[u8; 3]; PALETTE_COLORS]) -> Self {
        Self { colors }
    }

    /// Reads a palette from the first 768 bytes of `data`.
    ///
    /// # Errors
    /// - Returns `PaletteError::TooShort` if `data` holds fewer than 768 bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self, PaletteError> {
        Self::from_resource(data, 0)
    }

    /// Number of whole palettes stored back to back in `data`.
    pub fn page_count(data: &[u8]) -> usize {
        data.len() / PALETTE_BYTES
    }

    /// Reads page `page` of a resource holding several 768-byte palettes
    /// (PLAYPAL carries 14 of them).
    ///
    /// # Errors
    /// - Returns `PaletteError::TooShort` if `data` holds no complete page
    /// - Returns `PaletteError::PageOutOfRange` if `page` is past the last page
    pub fn from_resource(data: &[u8], page: usize) -> Result<Self, PaletteError> {
        let pages = Self::page_count(data);
        if pages == 0 {
            error!("Palette resource of {} bytes holds no page", data.len());
            return Err(PaletteError::TooShort {
                expected: PALETTE_BYTES,
                actual: data.len(),
            });
        }
        if page >= pages {
            error!("Palette page {} requested, resource has {}", page, pages);
            return Err(PaletteError::PageOutOfRange { page, pages });
        }

        let start = page * PALETTE_BYTES;
        let mut colors = [[0u8; 3]; PALETTE_COLORS];
        for (color, rgb) in colors
            .iter_mut()
            .zip(data[start..start + PALETTE_BYTES].chunks_exact(3))
        {
            color.copy_from_slice(rgb);
        }
        debug!("Loaded palette page {} of {}", page + 1, pages);

        Ok(Self { colors })
    }

    pub fn colors(&self) -> &[[u8; 3]; PALETTE_COLORS] {
        &self.colors
    }

    pub fn color(&self, index: u8) -> [u8; 3] {
        self.colors[index as usize]
    }

    /// RGBA for `index`, with alpha 0 when `transparent`.
    pub fn rgba(&self, index: u8, transparent: bool) -> [u8; 4] {
        let [r, g, b] = self.color(index);
        [r, g, b, if transparent { 0 } else { 255 }]
    }

    pub fn to_bytes(&self) -> [u8; PALETTE_BYTES] {
        let mut bytes = [0u8; PALETTE_BYTES];
        for (chunk, color) in bytes.chunks_exact_mut(3).zip(self.colors.iter()) {
            chunk.copy_from_slice(color);
        }
        bytes
    }
}

impl Default for Palette {
    fn default() -> Self {
        DEFAULT_PALETTE.clone()
    }
}

impl fmt::Debug for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Palette")
            .field("first", &self.colors[0])
            .field("last", &self.colors[PALETTE_COLORS - 1])
            .finish_non_exhaustive()
    }
}

/// The palette a front-end currently works with: a user-supplied table, or
/// the built-in one after a reset.
///
/// Core functions never look this up themselves; callers resolve
/// [`current`](Self::current) once and pass the palette in.
#[derive(Debug, Clone, Default)]
pub struct PaletteSelection {
    custom: Option<Palette>,
}

impl PaletteSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_custom(&mut self, palette: Palette) {
        self.custom = Some(palette);
    }

    /// Drops any custom palette and falls back to the built-in one.
    pub fn reset(&mut self) {
        self.custom = None;
    }

    pub fn is_custom(&self) -> bool {
        self.custom.is_some()
    }

    pub fn current(&self) -> &Palette {
        self.custom.as_ref().unwrap_or(&DEFAULT_PALETTE)
    }
}
