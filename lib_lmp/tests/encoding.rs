mod common;

use common::{distinct_palette, holey_indices, TRANSPARENT};
use lib_lmp::{
    decode, encode, encode_from_rgba, quantize, read_posts, to_rgba, ColorApproximationMode,
    FormatError, Header, Post,
};
use pretty_assertions::assert_eq;

#[test]
fn test_encode_solid_4x4_layout() {
    let encoded = encode(&[5; 16], 4, 4, 0, 0).unwrap();

    let mut expected = vec![4, 0, 4, 0, 0, 0, 0, 0];
    for offset in [24i32, 33, 42, 51] {
        expected.extend_from_slice(&offset.to_le_bytes());
    }
    for _ in 0..4 {
        expected.extend_from_slice(&[0, 4, 0, 5, 5, 5, 5, 0, 0xFF]);
    }

    assert_eq!(encoded, expected);
}

#[test]
fn test_encode_fully_transparent_rgba() {
    let encoded = encode_from_rgba(
        &[0; 2 * 2 * 4],
        2,
        2,
        &distinct_palette(),
        (0, 0),
        ColorApproximationMode::FloydSteinberg,
    )
    .unwrap();

    assert_eq!(
        encoded,
        vec![2, 0, 2, 0, 0, 0, 0, 0, 16, 0, 0, 0, 17, 0, 0, 0, 0xFF, 0xFF]
    );
}

#[test]
fn test_header_survives_roundtrip() {
    let headers = [
        Header::new(1, 1, 0, 0),
        Header::new(3, 7, -12, 40),
        Header::new(64, 2, i16::MIN, i16::MAX),
    ];
    for header in headers {
        let (width, height) = header.dimensions();
        let indices = vec![TRANSPARENT; width * height];
        let encoded = encode(
            &indices,
            width,
            height,
            header.left_offset,
            header.top_offset,
        )
        .unwrap();
        assert_eq!(decode(&encoded).unwrap().header, header);
    }
}

#[test]
fn test_nearest_roundtrip_is_byte_identical() {
    let (width, height) = (13, 9);
    let palette = distinct_palette();
    let original = encode(&holey_indices(width, height), width, height, 3, -1).unwrap();

    let image = decode(&original).unwrap();
    let rgba = to_rgba(&image, &palette);
    let indices = quantize(
        &rgba,
        width,
        height,
        &palette,
        ColorApproximationMode::NearestColor,
    );
    let reencoded = encode(&indices, width, height, 3, -1).unwrap();

    assert_eq!(indices, holey_indices(width, height));
    assert_eq!(reencoded, original);
}

#[test]
fn test_tall_picture_roundtrip() {
    let (width, height) = (2, 600);
    let mut indices = vec![TRANSPARENT; width * height];
    for row in 200..560 {
        indices[row * width] = (row % 200) as u8;
    }
    indices[599 * width + 1] = 9;

    let encoded = encode(&indices, width, height, 0, 0).unwrap();
    let columns = read_posts(&encoded).unwrap();
    assert!(columns[0].contains(&Post::anchor(254)));
    assert!(columns
        .iter()
        .flatten()
        .all(|post| post.len() <= lib_lmp::constants::MAX_POST_LENGTH));

    let image = decode(&encoded).unwrap();
    for row in 0..height {
        for col in 0..width {
            let value = indices[row * width + col];
            let expected = (value != TRANSPARENT).then_some(value);
            assert_eq!(image.pixel(col, row), expected, "pixel ({}, {})", col, row);
        }
    }
}

#[test]
fn test_truncated_lump_decodes_partially() {
    let encoded = encode(&holey_indices(8, 8), 8, 8, 0, 0).unwrap();
    let cut = &encoded[..encoded.len() / 2];

    let image = decode(cut).unwrap();
    assert_eq!(image.header, Header::new(8, 8, 0, 0));
    assert!(image.opaque_count() > 0);

    let full = decode(&encoded).unwrap();
    assert!(image.opaque_count() < full.opaque_count());
}

#[test]
fn test_bad_headers_fail() {
    assert_eq!(decode(&[0; 5]), Err(FormatError::TooShort { len: 5 }));
    assert_eq!(
        decode(&Header::new(-2, 3, 0, 0).to_bytes()),
        Err(FormatError::InvalidDimensions {
            width: -2,
            height: 3
        })
    );
}
