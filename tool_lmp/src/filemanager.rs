use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::{ImageError, ImageFormat};
use lib_lmp::constants::{FILE_EXT, FORMAT_NAME};
use lib_lmp::{
    decode, decode_to_rgba, encode_from_rgba, read_posts, CodecError, ColorApproximationMode,
    FormatError, Palette, PaletteError, PaletteSelection,
};
use log::{debug, info};
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),

    #[error("Picture codec error: {0}")]
    CodecError(#[from] CodecError),

    #[error("Palette error: {0}")]
    PaletteError(#[from] PaletteError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Picture of {width}x{height} pixels does not fit a PNG")]
    TooLarge { width: usize, height: usize },
}

impl From<FormatError> for ToolError {
    fn from(err: FormatError) -> Self {
        ToolError::CodecError(err.into())
    }
}

/// Resolves the palette for one command: page `page` of the resource at
/// `path`, or the built-in palette when no path is given.
pub fn load_palette(path: Option<&Path>, page: usize) -> Result<Palette, ToolError> {
    let mut selection = PaletteSelection::new();
    if let Some(path) = path {
        let data = fs::read(path)?;
        selection.set_custom(Palette::from_resource(&data, page)?);
        info!("Using palette page {} from {}", page, path.display());
    } else {
        debug!("Using built-in palette");
    }
    Ok(selection.current().clone())
}

/// `input` with its extension replaced, used when no output path is given.
pub fn default_output(input: &Path, extension: &str) -> PathBuf {
    input.with_extension(extension)
}

pub fn lmp_to_png(input: &Path, output: &Path, palette: &Palette) -> Result<(), ToolError> {
    let data = fs::read(input)?;
    let decoded = decode_to_rgba(&data, palette)?;
    let (width, height) = (decoded.width(), decoded.height());

    // Dimensions come from a positive i16, so they always fit a u32
    let buffer = image::RgbaImage::from_raw(width as u32, height as u32, decoded.rgba)
        .ok_or(ToolError::TooLarge { width, height })?;
    buffer.save_with_format(output, ImageFormat::Png)?;

    info!("Wrote {}x{} PNG to {}", width, height, output.display());
    Ok(())
}

pub fn png_to_lmp(
    input: &Path,
    output: &Path,
    palette: &Palette,
    offset: (i16, i16),
    mode: ColorApproximationMode,
) -> Result<(), ToolError> {
    let rgba = image::open(input)?.to_rgba8();
    let (width, height) = (rgba.width() as usize, rgba.height() as usize);

    let encoded = encode_from_rgba(rgba.as_raw(), width, height, palette, offset, mode)?;
    fs::write(output, &encoded)?;

    info!(
        "Wrote {} bytes of .{} data to {}",
        encoded.len(),
        FILE_EXT,
        output.display()
    );
    Ok(())
}

/// Header, per-column post counts and opaque pixel count of a picture lump.
pub fn describe_lmp(input: &Path) -> Result<Value, ToolError> {
    let data = fs::read(input)?;
    let image = decode(&data)?;
    let columns = read_posts(&data)?;

    let posts: Vec<usize> = columns.iter().map(Vec::len).collect();
    let anchors: usize = columns
        .iter()
        .flatten()
        .filter(|post| post.is_empty())
        .count();

    Ok(json!({
        "format": FORMAT_NAME,
        "header": image.header,
        "bytes": data.len(),
        "opaque_pixels": image.opaque_count(),
        "posts_per_column": posts,
        "anchor_posts": anchors,
    }))
}

/// One line per palette page in the resource at `path`, with the first few
/// colors as hex.
pub fn list_palettes(path: &Path) -> Result<Vec<String>, ToolError> {
    let data = fs::read(path)?;
    let pages = Palette::page_count(&data);
    if pages == 0 {
        // Surfaces the "too short" error for the caller
        Palette::from_bytes(&data)?;
    }

    (0..pages)
        .map(|page| -> Result<String, ToolError> {
            let palette = Palette::from_resource(&data, page)?;
            let preview: Vec<String> = palette.colors()[..4]
                .iter()
                .map(|[r, g, b]| format!("#{:02x}{:02x}{:02x}", r, g, b))
                .collect();
            Ok(format!("page {}: {} ...", page, preview.join(" ")))
        })
        .collect()
}
