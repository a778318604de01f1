use anomaly::{AnomalyError, preprocess};
use base::Tensor;
use image::Image;

fn noisy_frame(width: usize, height: usize, seed: u32) -> Image {
    let mut state = seed.wrapping_mul(2_654_435_761).wrapping_add(1);
    let data = (0..width * height * 3)
        .map(|_| {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (state >> 24) as u8
        })
        .collect();
    Image::from_rgb8(width, height, data).unwrap()
}

#[test]
fn test_preprocess_output_shape_and_range() {
    let frame = noisy_frame(64, 48, 7);
    let out = preprocess(&frame, 35, 35).unwrap();
    assert_eq!(out.shape, vec![35, 35]);
    assert_eq!(out.data.len(), 35 * 35);
    assert!(out.data.iter().all(|v| v.is_finite() && (0.0..=1.0).contains(v)));
}

#[test]
fn test_preprocess_upscales_small_frames() {
    let frame = noisy_frame(10, 12, 3);
    let out = preprocess(&frame, 40, 36).unwrap();
    assert_eq!(out.shape, vec![40, 36]);
}

#[test]
fn test_preprocess_standardizes_then_clips() {
    // 17 dark columns, 18 bright columns; no resize at 35x35
    let (w, h) = (35, 35);
    let mut data = Vec::with_capacity(w * h * 3);
    for _ in 0..h {
        for x in 0..w {
            let v = if x < 17 { 0 } else { 255 };
            data.extend([v, v, v]);
        }
    }
    let frame = Image::from_rgb8(w, h, data).unwrap();
    let out = preprocess(&frame, h, w).unwrap();

    // dark pixels standardize below zero and clip to 0
    assert_eq!(out.data[0], 0.0);
    // bright pixels land just under one standard deviation above the mean
    let bright = out.data[w - 1];
    assert!(bright > 0.9 && bright <= 1.0, "bright = {bright}");
}

#[test]
fn test_preprocess_constant_frame_is_invalid() {
    let frame = Image::from_rgb8(20, 20, vec![128; 20 * 20 * 3]).unwrap();
    let result = preprocess(&frame, 35, 35);
    assert!(matches!(result, Err(AnomalyError::InvalidFrame(_))));
}

#[test]
fn test_preprocess_empty_frame_is_invalid() {
    let frame = Image::U8(Tensor::new(vec![0, 0, 3], vec![]).unwrap());
    assert!(matches!(preprocess(&frame, 35, 35), Err(AnomalyError::InvalidFrame(_))));
}

#[test]
fn test_preprocess_single_channel_is_invalid() {
    let data: Vec<u8> = (0..16).map(|i| i * 10).collect();
    let frame = Image::U8(Tensor::new(vec![4, 4, 1], data).unwrap());
    assert!(matches!(preprocess(&frame, 35, 35), Err(AnomalyError::InvalidFrame(_))));
}

#[test]
fn test_preprocess_ignores_alpha() {
    let rgb = noisy_frame(30, 30, 11);
    let Image::U8(t) = &rgb else { unreachable!() };
    let mut rgba = Vec::with_capacity(30 * 30 * 4);
    for pixel in t.data.chunks_exact(3) {
        rgba.extend_from_slice(pixel);
        rgba.push(255);
    }
    let rgba = Image::U8(Tensor::new(vec![30, 30, 4], rgba).unwrap());

    let a = preprocess(&rgb, 35, 35).unwrap();
    let b = preprocess(&rgba, 35, 35).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_preprocess_float_image() {
    let data: Vec<f32> = (0..28 * 28 * 3).map(|i| (i % 97) as f32 / 97.0).collect();
    let frame = Image::F32(Tensor::new(vec![28, 28, 3], data).unwrap());
    let out = preprocess(&frame, 35, 35).unwrap();
    assert!(out.data.iter().all(|v| (0.0..=1.0).contains(v)));
}

// gray f32 frame with luminance in [1.5, 3.0]
fn bright_float_frame(side: usize) -> Image {
    let data = (0..side * side)
        .flat_map(|i| {
            let v = 1.5 + 1.5 * ((i * 37) % 101) as f32 / 100.0;
            [v, v, v]
        })
        .collect();
    Image::F32(Tensor::new(vec![side, side, 3], data).unwrap())
}

#[test]
fn test_preprocess_float_values_above_one_at_any_input_size() {
    for side in [35, 64, 20] {
        let out = preprocess(&bright_float_frame(side), 35, 35).unwrap();
        assert_eq!(out.shape, vec![35, 35]);
        assert!(out.data.iter().all(|v| (0.0..=1.0).contains(v)));
        assert!(out.data.iter().any(|&v| v > 0.0), "side {side} collapsed");
    }
}

#[test]
fn test_preprocess_float_non_finite_is_invalid() {
    let mut data = vec![0.5f32; 40 * 40 * 3];
    data[7] = f32::INFINITY;
    let frame = Image::F32(Tensor::new(vec![40, 40, 3], data).unwrap());
    for side in [40, 35] {
        assert!(matches!(preprocess(&frame, side, side), Err(AnomalyError::InvalidFrame(_))));
    }
}
