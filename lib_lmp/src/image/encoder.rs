use log::{debug, error, info};
use thiserror::Error;

use super::format::{Header, Post};
use crate::constants::{
    MAX_POST_LENGTH, POST_TERMINATOR, TALL_PATCH_MIN_HEIGHT, TALL_PATCH_ROW, TRANSPARENT_INDEX,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("Invalid picture dimensions {width}x{height}: both must be in 1..=32767")]
    InvalidDimensions { width: usize, height: usize },
    #[error("Index buffer holds {actual} pixels, expected {expected}")]
    IndexBufferSize { expected: usize, actual: usize },
    #[error("Encoded picture exceeds the 32-bit column offset range")]
    TooLarge,
}

/// Serializes an index buffer into a picture lump.
///
/// Every index except [`TRANSPARENT_INDEX`] becomes an opaque pixel. The
/// output is fully determined by the arguments.
///
/// # Parameters
/// - `indices`: row-major palette indices, `width * height` of them
/// - `offset_x`, `offset_y`: anchor written to the header as left/top offset
///
/// # Errors
/// - `EncodingError::InvalidDimensions` if a dimension is 0 or above `i16::MAX`
/// - `EncodingError::IndexBufferSize` if `indices` has the wrong length
pub fn encode(
    indices: &[u8],
    width: usize,
    height: usize,
    offset_x: i16,
    offset_y: i16,
) -> Result<Vec<u8>, EncodingError> {
    info!("Starting encoding of {}x{} picture", width, height);

    let (header_width, header_height) = header_dimensions(width, height)?;
    if indices.len() != width * height {
        error!(
            "Index buffer length {} does not match {}x{}",
            indices.len(),
            width,
            height
        );
        return Err(EncodingError::IndexBufferSize {
            expected: width * height,
            actual: indices.len(),
        });
    }

    // Step 1: Header and a placeholder offset table
    let header = Header::new(header_width, header_height, offset_x, offset_y);
    let table_end = Header::SIZE + width * Header::COLUMN_OFFSET_SIZE;
    let mut encoded_data = Vec::with_capacity(table_end + indices.len() + width * 8);
    encoded_data.extend_from_slice(&header.to_bytes());
    encoded_data.resize(table_end, 0);
    debug!("Header written: {:?}", header);

    // Step 2: Post streams, patching each column's offset as we go
    let mut anchors = 0usize;
    for col in 0..width {
        let offset = i32::try_from(encoded_data.len()).map_err(|_| {
            error!("Column {} starts beyond the 32-bit offset range", col);
            EncodingError::TooLarge
        })?;
        let entry = Header::SIZE + col * Header::COLUMN_OFFSET_SIZE;
        encoded_data[entry..entry + Header::COLUMN_OFFSET_SIZE]
            .copy_from_slice(&offset.to_le_bytes());

        let posts = column_posts(indices, width, height, col);
        anchors += posts.iter().filter(|post| post.is_empty()).count();
        write_column(&mut encoded_data, &posts);
    }
    debug!("Column streams written with {} re-anchor posts", anchors);

    info!(
        "Encoding completed successfully: {} bytes",
        encoded_data.len()
    );
    Ok(encoded_data)
}

/// Checks that `width` and `height` fit the header, i.e. lie in
/// `1..=i16::MAX`.
pub(crate) fn header_dimensions(width: usize, height: usize) -> Result<(i16, i16), EncodingError> {
    let (Ok(header_width), Ok(header_height)) = (i16::try_from(width), i16::try_from(height))
    else {
        error!("Dimensions {}x{} do not fit the header", width, height);
        return Err(EncodingError::InvalidDimensions { width, height });
    };
    if width == 0 || height == 0 {
        error!("Dimensions {}x{} are empty", width, height);
        return Err(EncodingError::InvalidDimensions { width, height });
    }
    Ok((header_width, header_height))
}

/// Builds the wire posts for one column, tall patch anchors included.
pub fn column_posts(indices: &[u8], width: usize, height: usize, col: usize) -> Vec<Post> {
    let tall = height >= TALL_PATCH_MIN_HEIGHT;
    let anchor_row = TALL_PATCH_ROW as i64;
    let max_delta = MAX_POST_LENGTH as i64;

    let mut posts = Vec::new();
    // Row the decoder measures relative deltas from; -1 before the first post
    let mut top_row: i64 = -1;

    for (start, pixels) in column_runs(indices, width, height, col) {
        let start = start as i64;

        if top_row < anchor_row {
            if start < anchor_row || (start == anchor_row && !tall) {
                posts.push(Post::new(start as u8, pixels));
                top_row = start;
                continue;
            }
            posts.push(Post::anchor(TALL_PATCH_ROW as u8));
            top_row = anchor_row;
        }

        while start - top_row > max_delta {
            posts.push(Post::anchor(MAX_POST_LENGTH as u8));
            top_row += max_delta;
        }
        posts.push(Post::new((start - top_row) as u8, pixels));
        top_row = start;
    }

    posts
}

/// Splits one column into runs of opaque pixels as (start row, indices).
///
/// A run ends at a transparent pixel, when it reaches [`MAX_POST_LENGTH`],
/// or, in tall pictures, where it would cross [`TALL_PATCH_ROW`].
fn column_runs(indices: &[u8], width: usize, height: usize, col: usize) -> Vec<(usize, Vec<u8>)> {
    let tall = height >= TALL_PATCH_MIN_HEIGHT;
    let mut runs = Vec::new();
    let mut current: Option<(usize, Vec<u8>)> = None;

    for row in 0..height {
        let value = indices[row * width + col];
        if value == TRANSPARENT_INDEX {
            runs.extend(current.take());
            continue;
        }

        let split = matches!(
            &current,
            Some((start, pixels)) if pixels.len() >= MAX_POST_LENGTH
                || (tall && *start < TALL_PATCH_ROW && row >= TALL_PATCH_ROW)
        );
        if split {
            runs.extend(current.take());
        }

        current.get_or_insert_with(|| (row, Vec::new())).1.push(value);
    }
    runs.extend(current);

    runs
}

fn write_column(out: &mut Vec<u8>, posts: &[Post]) {
    out.reserve(posts.iter().map(Post::encoded_len).sum::<usize>() + 1);
    for post in posts {
        out.push(post.top_delta);
        out.push(post.len() as u8);
        out.push(0);
        out.extend_from_slice(&post.pixels);
        out.push(0);
    }
    out.push(POST_TERMINATOR);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::decoder::{decode, read_posts};

    #[test]
    fn test_encode_rejects_bad_dimensions() {
        assert_eq!(
            encode(&[], 0, 4, 0, 0),
            Err(EncodingError::InvalidDimensions {
                width: 0,
                height: 4
            })
        );
        assert!(matches!(
            encode(&[], 40_000, 1, 0, 0),
            Err(EncodingError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_encode_rejects_wrong_buffer_size() {
        assert_eq!(
            encode(&[1, 2, 3], 2, 2, 0, 0),
            Err(EncodingError::IndexBufferSize {
                expected: 4,
                actual: 3
            })
        );
    }

    #[test]
    fn test_encode_single_pixel_layout() {
        let encoded = encode(&[42], 1, 1, -2, 7).unwrap();
        assert_eq!(
            encoded,
            vec![
                1, 0, 1, 0, 0xFE, 0xFF, 7, 0, // header
                12, 0, 0, 0, // column offset
                0, 1, 0, 42, 0, // post
                0xFF,
            ]
        );
    }

    #[test]
    fn test_column_runs_split_on_transparency() {
        let indices = [1, 247, 2, 3, 247];
        let runs = column_runs(&indices, 1, 5, 0);
        assert_eq!(runs, vec![(0, vec![1]), (2, vec![2, 3])]);
    }

    #[test]
    fn test_column_runs_cap_length() {
        let indices = vec![9u8; 255];
        let runs = column_runs(&indices, 1, 255, 0);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].1.len(), MAX_POST_LENGTH);
        assert_eq!(runs[1], (254, vec![9]));
    }

    #[test]
    fn test_short_picture_uses_absolute_deltas() {
        // 255 rows is not a tall patch: the second post is absolute row 254
        let indices = vec![9u8; 255];
        let posts = column_posts(&indices, 1, 255, 0);
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].top_delta, 0);
        assert_eq!(posts[1].top_delta, 254);
        assert_eq!(posts[1].len(), 1);
    }

    #[test]
    fn test_later_posts_stay_absolute_below_anchor_row() {
        let mut indices = vec![TRANSPARENT_INDEX; 20];
        indices[3] = 1;
        indices[10] = 2;
        indices[11] = 3;
        let posts = column_posts(&indices, 1, 20, 0);
        assert_eq!(posts, vec![Post::new(3, vec![1]), Post::new(10, vec![2, 3])]);
    }

    #[test]
    fn test_tall_column_splits_and_reanchors() {
        let indices = vec![5u8; 300];
        let posts = column_posts(&indices, 1, 300, 0);
        assert_eq!(
            posts,
            vec![
                Post::new(0, vec![5; 254]),
                Post::anchor(254),
                Post::new(0, vec![5; 46]),
            ]
        );
    }

    #[test]
    fn test_tall_run_crossing_row_254_is_split_there() {
        let mut indices = vec![TRANSPARENT_INDEX; 260];
        for value in &mut indices[250..258] {
            *value = 7;
        }
        let posts = column_posts(&indices, 1, 260, 0);
        assert_eq!(
            posts,
            vec![
                Post::new(250, vec![7; 4]),
                Post::anchor(254),
                Post::new(0, vec![7; 4]),
            ]
        );
    }

    #[test]
    fn test_tall_gap_past_anchor_row() {
        let mut indices = vec![TRANSPARENT_INDEX; 400];
        indices[100] = 1;
        indices[300] = 2;
        let posts = column_posts(&indices, 1, 400, 0);
        assert_eq!(
            posts,
            vec![Post::new(100, vec![1]), Post::anchor(254), Post::new(46, vec![2])]
        );

        let image = decode(&encode(&indices, 1, 400, 0, 0).unwrap()).unwrap();
        assert_eq!(image.pixel(0, 100), Some(1));
        assert_eq!(image.pixel(0, 300), Some(2));
        assert_eq!(image.opaque_count(), 2);
    }

    #[test]
    fn test_very_tall_gap_chains_anchors() {
        let mut indices = vec![TRANSPARENT_INDEX; 1000];
        indices[900] = 8;
        let posts = column_posts(&indices, 1, 1000, 0);
        // 254 -> 508 -> 762, then 138 to reach 900
        assert_eq!(
            posts,
            vec![
                Post::anchor(254),
                Post::anchor(254),
                Post::anchor(254),
                Post::new(138, vec![8]),
            ]
        );

        let image = decode(&encode(&indices, 1, 1000, 0, 0).unwrap()).unwrap();
        assert_eq!(image.pixel(0, 900), Some(8));
        assert_eq!(image.opaque_count(), 1);
    }

    #[test]
    fn test_encoded_posts_never_exceed_cap() {
        let indices = vec![3u8; 2 * 700];
        let encoded = encode(&indices, 2, 700, 0, 0).unwrap();
        for column in read_posts(&encoded).unwrap() {
            assert!(column.iter().all(|post| post.len() <= MAX_POST_LENGTH));
            assert_eq!(column.iter().map(Post::len).sum::<usize>(), 700);
        }
    }
}
