mod common;

use common::{black_and_white, gradient_rgba, GRADIENT_HEIGHT, GRADIENT_WIDTH, TRANSPARENT};
use lib_lmp::{quantize, ColorApproximationMode, Palette};
use pretty_assertions::assert_eq;

#[test]
fn test_opaque_pixels_never_become_transparent_index() {
    let palette = Palette::default();
    let rgba = gradient_rgba();

    for mode in ColorApproximationMode::ALL {
        let indices = quantize(&rgba, GRADIENT_WIDTH, GRADIENT_HEIGHT, &palette, mode);
        assert_eq!(indices.len(), GRADIENT_WIDTH * GRADIENT_HEIGHT);
        assert!(
            indices.iter().all(|&i| i != TRANSPARENT),
            "{} produced index 247",
            mode
        );
    }
}

#[test]
fn test_low_alpha_always_maps_to_transparent_index() {
    let palette = Palette::default();
    let mut rgba = gradient_rgba();
    // Alpha ramps 0..=255 over the 256 pixels
    for (i, pixel) in rgba.chunks_exact_mut(4).enumerate() {
        pixel[3] = i as u8;
    }

    for mode in ColorApproximationMode::ALL {
        let indices = quantize(&rgba, GRADIENT_WIDTH, GRADIENT_HEIGHT, &palette, mode);
        for (i, &index) in indices.iter().enumerate() {
            assert_eq!(index == TRANSPARENT, i < 128, "{} pixel {}", mode, i);
        }
    }
}

#[test]
fn test_bayer_2x2_checkerboard() {
    let rgba = [128, 128, 128, 255].repeat(8 * 8);

    let indices = quantize(
        &rgba,
        8,
        8,
        &black_and_white(),
        ColorApproximationMode::Bayer2x2,
    );
    for y in 0..8 {
        for x in 0..8 {
            assert_eq!(indices[y * 8 + x], ((x + y) % 2) as u8, "pixel ({}, {})", x, y);
        }
    }

    let indices = quantize(
        &rgba,
        8,
        8,
        &Palette::default(),
        ColorApproximationMode::Bayer2x2,
    );
    assert_ne!(indices[0], indices[1]);
    assert_eq!(indices[0], indices[18]);
}

#[test]
fn test_dithering_differs_from_nearest_on_gradient() {
    let palette = black_and_white();
    let rgba = gradient_rgba();

    let nearest = quantize(
        &rgba,
        GRADIENT_WIDTH,
        GRADIENT_HEIGHT,
        &palette,
        ColorApproximationMode::NearestColor,
    );
    for mode in [
        ColorApproximationMode::FloydSteinberg,
        ColorApproximationMode::Atkinson,
        ColorApproximationMode::Bayer4x4,
    ] {
        let dithered = quantize(&rgba, GRADIENT_WIDTH, GRADIENT_HEIGHT, &palette, mode);
        assert_ne!(dithered, nearest, "{}", mode);
    }
}

#[test]
fn test_mode_from_config_string() {
    let mode: ColorApproximationMode = "bayer-8x8".parse().unwrap();
    assert_eq!(mode, ColorApproximationMode::Bayer8x8);
    assert!("floyd".parse::<ColorApproximationMode>().is_err());
}
