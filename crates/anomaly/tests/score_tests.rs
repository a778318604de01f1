use anomaly::{AnomalyError, reconstruction_error};
use candle_core::{DType, Device, Tensor as CanTensor};

fn clip(dims: (usize, usize, usize, usize, usize)) -> CanTensor {
    CanTensor::rand(0f32, 1f32, dims, &Device::Cpu).unwrap()
}

#[test]
fn test_identical_clips_score_zero() {
    let x = clip((1, 35, 35, 4, 1));
    assert_eq!(reconstruction_error(&x, &x).unwrap(), 0.0);
}

#[test]
fn test_score_is_symmetric() {
    let a = clip((2, 30, 30, 3, 1));
    let b = clip((2, 30, 30, 3, 1));
    let ab = reconstruction_error(&a, &b).unwrap();
    let ba = reconstruction_error(&b, &a).unwrap();
    assert_eq!(ab, ba);
    assert!(ab > 0.0);
}

#[test]
fn test_score_is_norm_over_element_count() {
    // difference of 1 in every one of 16 elements: sqrt(16) / 16
    let ones = CanTensor::ones((1, 2, 2, 2, 2), DType::F32, &Device::Cpu).unwrap();
    let zeros = ones.zeros_like().unwrap();
    let score = reconstruction_error(&ones, &zeros).unwrap();
    assert!((score - 0.25).abs() < 1e-7);
}

#[test]
fn test_shape_mismatch_is_rejected() {
    let a = clip((1, 35, 35, 4, 1));
    let b = clip((1, 35, 35, 5, 1));
    assert!(matches!(reconstruction_error(&a, &b), Err(AnomalyError::InvalidShape(_))));
}

#[test]
fn test_non_clip_rank_is_rejected() {
    let a = CanTensor::zeros((35, 35), DType::F32, &Device::Cpu).unwrap();
    assert!(matches!(reconstruction_error(&a, &a), Err(AnomalyError::InvalidShape(_))));
}
