use base::Tensor;
use image::{Image, ImageError, LUMA_WEIGHTS, luminance, resize_bilinear};

#[test]
fn test_luminance_weights_rgb() {
    let image = Image::from_rgb8(1, 1, vec![100, 50, 200]).unwrap();
    let plane = luminance(&image).unwrap();
    assert_eq!(plane.shape, vec![1, 1]);
    let expected =
        (100.0 * LUMA_WEIGHTS[0] + 50.0 * LUMA_WEIGHTS[1] + 200.0 * LUMA_WEIGHTS[2]) / 255.0;
    assert!((plane.data[0] - expected).abs() < 1e-6);
}

#[test]
fn test_luminance_ignores_alpha() {
    let rgba = Image::U8(Tensor::new(vec![1, 2, 4], vec![10, 20, 30, 0, 10, 20, 30, 255]).unwrap());
    let plane = luminance(&rgba).unwrap();
    assert_eq!(plane.shape, vec![1, 2]);
    assert_eq!(plane.data[0], plane.data[1]);
}

#[test]
fn test_luminance_rejects_two_channels() {
    let image = Image::U8(Tensor::new(vec![1, 1, 2], vec![1, 2]).unwrap());
    assert!(matches!(luminance(&image), Err(ImageError::Shape(_))));
}

#[test]
fn test_luminance_rejects_empty() {
    let image = Image::U8(Tensor::new(vec![0, 4, 3], vec![]).unwrap());
    assert!(image.is_empty());
    assert!(matches!(luminance(&image), Err(ImageError::Shape(_))));
}

#[test]
fn test_resize_bilinear_output_shape() {
    let plane = Tensor::new(vec![4, 6], (0..24).map(|v| v as f32 / 24.0).collect()).unwrap();
    let resized = resize_bilinear(&plane, 8, 3).unwrap();
    assert_eq!(resized.shape, vec![8, 3]);
    assert_eq!(resized.data.len(), 24);
}

#[test]
fn test_resize_bilinear_constant_plane_stays_constant() {
    let plane = Tensor::new(vec![5, 5], vec![0.25f32; 25]).unwrap();
    let resized = resize_bilinear(&plane, 9, 7).unwrap();
    assert!(resized.data.iter().all(|&v| (v - 0.25).abs() < 1e-5));
}

#[test]
fn test_resize_bilinear_same_size_is_identity() {
    let plane = Tensor::new(vec![2, 2], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
    assert_eq!(resize_bilinear(&plane, 2, 2).unwrap(), plane);
}

#[test]
fn test_resize_bilinear_rejects_zero_target() {
    let plane = Tensor::new(vec![2, 2], vec![0.0; 4]).unwrap();
    assert!(resize_bilinear(&plane, 0, 2).is_err());
}

#[test]
fn test_luminance_u16_scaled_to_unit_range() {
    let image = Image::U16(Tensor::new(vec![1, 1, 3], vec![u16::MAX; 3]).unwrap());
    let plane = luminance(&image).unwrap();
    let total: f32 = LUMA_WEIGHTS.iter().sum();
    assert!((plane.data[0] - total).abs() < 1e-6);
}

#[test]
fn test_resize_bilinear_keeps_range_above_one() {
    let data: Vec<f32> = (0..64).map(|v| 1.5 + v as f32 * 1.5 / 63.0).collect();
    let plane = Tensor::new(vec![8, 8], data).unwrap();
    let resized = resize_bilinear(&plane, 5, 3).unwrap();
    let (min, max) = resized
        .data
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    assert!(min >= 1.5 - 1e-4 && max <= 3.0 + 1e-4, "range {min}..{max}");
    assert!(max - min > 0.5);
}

#[test]
fn test_resize_bilinear_constant_plane_above_one() {
    let plane = Tensor::new(vec![4, 4], vec![7.5f32; 16]).unwrap();
    let resized = resize_bilinear(&plane, 6, 6).unwrap();
    assert!(resized.data.iter().all(|&v| v == 7.5));
}

#[test]
fn test_resize_bilinear_rejects_non_finite() {
    let plane = Tensor::new(vec![2, 2], vec![0.0, f32::NAN, 0.5, 1.0]).unwrap();
    assert!(matches!(resize_bilinear(&plane, 2, 2), Err(ImageError::Value(_))));
    assert!(matches!(resize_bilinear(&plane, 3, 3), Err(ImageError::Value(_))));
}
