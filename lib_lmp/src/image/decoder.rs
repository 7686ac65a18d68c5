use log::{debug, error, info, warn};
use thiserror::Error;

use super::cursor::Cursor;
use super::format::{Header, Image, Post};
use crate::constants::POST_TERMINATOR;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Invalid picture: {len} bytes is too short for the 8-byte header")]
    TooShort { len: usize },
    #[error("Invalid picture dimensions: {width}x{height}")]
    InvalidDimensions { width: i16, height: i16 },
}

/// Decodes a picture lump into indices plus a transparency mask.
///
/// Only the header is validated. Post data is read defensively: truncated
/// chains, bad column offsets and rows past the bottom edge are clipped, and
/// whatever could be read is returned.
///
/// The canvas is sized from the header alone: an 8-byte input claiming
/// 32767x32767 still allocates two buffers of about 1 GiB each.
///
/// # Errors
/// - `FormatError::TooShort` if `data` cannot hold a header
/// - `FormatError::InvalidDimensions` if width or height is not positive
pub fn decode(data: &[u8]) -> Result<Image, FormatError> {
    let header = read_header(data)?;
    let (width, height) = header.dimensions();
    debug!(
        "Allocating {}x{} canvas: {} bytes of indices plus mask for {} bytes of input",
        width,
        height,
        width * height,
        data.len()
    );
    let mut image = Image::blank(header);

    let mut clipped = 0usize;
    for (col, offset) in column_offsets(data, width).into_iter().enumerate() {
        let Some(offset) = offset else {
            continue;
        };
        walk_column(data, offset, |row, post| {
            for (i, &value) in post.pixels.iter().enumerate() {
                if !image.set_opaque(col, row + i, value) {
                    clipped += 1;
                }
            }
        });
    }

    if clipped > 0 {
        warn!("Clipped {} pixels lying below row {}", clipped, height);
    }
    info!(
        "Decoded {}x{} picture, {} opaque pixels",
        width,
        height,
        image.opaque_count()
    );

    Ok(image)
}

/// Reads the raw post chain of every column without resolving rows.
///
/// Follows the same defensive rules as [`decode`].
pub fn read_posts(data: &[u8]) -> Result<Vec<Vec<Post>>, FormatError> {
    let header = read_header(data)?;
    let (width, _) = header.dimensions();

    let columns = column_offsets(data, width)
        .into_iter()
        .map(|offset| {
            let mut posts = Vec::new();
            if let Some(offset) = offset {
                walk_column(data, offset, |_, post| posts.push(post));
            }
            posts
        })
        .collect();

    Ok(columns)
}

pub(crate) fn read_header(data: &[u8]) -> Result<Header, FormatError> {
    let mut cursor = Cursor::new(data);

    let (Some(width), Some(height), Some(left_offset), Some(top_offset)) = (
        cursor.read_i16_le(),
        cursor.read_i16_le(),
        cursor.read_i16_le(),
        cursor.read_i16_le(),
    ) else {
        error!("Picture data too short: {} bytes", data.len());
        return Err(FormatError::TooShort { len: data.len() });
    };

    let header = Header::new(width, height, left_offset, top_offset);
    if !header.has_valid_dimensions() {
        error!("Invalid picture dimensions: {}x{}", width, height);
        return Err(FormatError::InvalidDimensions { width, height });
    }
    debug!("Header read: {:?}", header);

    Ok(header)
}

/// Column offsets that point inside `data`; `None` for entries that are
/// missing, negative, or past the end.
fn column_offsets(data: &[u8], width: usize) -> Vec<Option<usize>> {
    let mut cursor = Cursor::at(data, Header::SIZE);
    let offsets: Vec<Option<usize>> = (0..width)
        .map(|_| {
            cursor
                .read_i32_le()
                .and_then(|offset| usize::try_from(offset).ok())
                .filter(|&offset| offset < data.len())
        })
        .collect();

    let unusable = offsets.iter().filter(|offset| offset.is_none()).count();
    if unusable > 0 {
        warn!("{} of {} column offsets are unusable", unusable, width);
    }

    offsets
}

/// Walks one post chain, handing each post to `visit` with the row its
/// first pixel lands on.
///
/// A `top_delta` not greater than the previous post's row continues from
/// that row; anything else is an absolute row.
fn walk_column<F>(data: &[u8], offset: usize, mut visit: F)
where
    F: FnMut(usize, Post),
{
    let mut cursor = Cursor::at(data, offset);
    let mut top_row: i64 = -1;

    loop {
        let Some(top_delta) = cursor.read_u8() else {
            debug!("Column at offset {} ends without terminator", offset);
            break;
        };
        if top_delta == POST_TERMINATOR {
            break;
        }

        let delta = i64::from(top_delta);
        let row = if delta <= top_row {
            top_row + delta
        } else {
            delta
        };
        top_row = row;

        let Some(length) = cursor.read_u8() else {
            break;
        };
        if cursor.skip(1).is_none() {
            break;
        }

        let pixels = cursor.read_clipped(length as usize);
        let truncated = pixels.len() < length as usize;

        // row is never negative: it starts from an absolute delta
        visit(row as usize, Post::new(top_delta, pixels.to_vec()));

        if truncated || cursor.skip(1).is_none() {
            break;
        }
    }
}
