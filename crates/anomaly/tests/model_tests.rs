use anomaly::{AnomalyError, Autoencoder, CanonicalShape, Inference, model::stored_shape};
use candle_core::{DType, Device, Tensor as CanTensor};
use std::collections::HashMap;

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir()
        .join(format!("vigil-model-test-{}-{}.safetensors", std::process::id(), name))
}

fn random_clip(shape: &CanonicalShape, batch: usize) -> CanTensor {
    CanTensor::rand(0f32, 1f32, shape.clip_dims(batch).to_vec(), &Device::Cpu).unwrap()
}

fn values(t: &CanTensor) -> Vec<f32> {
    t.flatten_all().unwrap().to_vec1::<f32>().unwrap()
}

#[test]
fn test_reconstruct_preserves_shape() {
    let shape = CanonicalShape::new(35, 35, 4, 1).unwrap();
    let model = Autoencoder::new(shape, &Device::Cpu).unwrap();
    let clip = random_clip(&shape, 1);
    let out = model.reconstruct(&clip).unwrap();
    assert_eq!(out.dims(), clip.dims());
    assert_eq!(out.dtype(), DType::F32);
}

#[test]
fn test_reconstruct_uneven_spatial_size() {
    // strides do not divide 40x36 evenly
    let shape = CanonicalShape::new(40, 36, 3, 1).unwrap();
    let model = Autoencoder::new(shape, &Device::Cpu).unwrap();
    let clip = random_clip(&shape, 2);
    assert_eq!(model.reconstruct(&clip).unwrap().dims(), &[2, 40, 36, 3, 1]);
}

#[test]
fn test_reconstruct_is_bounded_by_tanh() {
    let shape = CanonicalShape::new(35, 35, 2, 1).unwrap();
    let model = Autoencoder::new(shape, &Device::Cpu).unwrap();
    let out = model.reconstruct(&random_clip(&shape, 1)).unwrap();
    assert!(values(&out).iter().all(|v| v.is_finite() && (-1.0..=1.0).contains(v)));
}

#[test]
fn test_reconstruct_is_deterministic() {
    let shape = CanonicalShape::new(35, 35, 3, 1).unwrap();
    let model = Autoencoder::new(shape, &Device::Cpu).unwrap();
    let clip = random_clip(&shape, 1);
    let a = values(&model.reconstruct(&clip).unwrap());
    let b = values(&model.reconstruct(&clip).unwrap());
    assert_eq!(a, b);
}

#[test]
fn test_training_mode_keeps_shape() {
    let shape = CanonicalShape::new(35, 35, 3, 1).unwrap();
    let model = Autoencoder::new(shape, &Device::Cpu).unwrap();
    let clip = random_clip(&shape, 1);
    assert_eq!(model.forward_t(&clip, true).unwrap().dims(), clip.dims());
}

#[test]
fn test_encode_decode_shapes() {
    let shape = CanonicalShape::new(35, 35, 4, 1).unwrap();
    let model = Autoencoder::new(shape, &Device::Cpu).unwrap();
    let latent = model.encode(&random_clip(&shape, 1), false).unwrap();
    assert_eq!(latent.dims(), &[1, 4, 32, 2, 2]);
    assert_eq!(model.decode(&latent, false).unwrap().dims(), &[1, 35, 35, 4, 1]);

    let wrong = CanTensor::zeros((1, 4, 64, 2, 2), DType::F32, &Device::Cpu).unwrap();
    assert!(matches!(model.decode(&wrong, false), Err(AnomalyError::InvalidShape(_))));
}

#[test]
fn test_rank_three_shape_is_rejected() {
    let inference = Inference::cpu();
    let result = inference.use_autoencoder(&[35, 35, 10]);
    assert!(matches!(result, Err(AnomalyError::InvalidShape(_))));
}

#[test]
fn test_too_small_shape_is_rejected() {
    let inference = Inference::cpu();
    let result = inference.use_autoencoder(&[20, 64, 10, 1]);
    assert!(matches!(result, Err(AnomalyError::InvalidShape(_))));
}

#[test]
fn test_clip_shape_mismatch_is_rejected() {
    let shape = CanonicalShape::new(35, 35, 4, 1).unwrap();
    let model = Autoencoder::new(shape, &Device::Cpu).unwrap();

    let other = CanonicalShape::new(35, 35, 5, 1).unwrap();
    let result = model.reconstruct(&random_clip(&other, 1));
    assert!(matches!(result, Err(AnomalyError::InvalidShape(_))));

    let rank4 = CanTensor::zeros((35, 35, 4, 1), DType::F32, &Device::Cpu).unwrap();
    assert!(matches!(model.reconstruct(&rank4), Err(AnomalyError::InvalidShape(_))));
}

#[test]
fn test_save_load_round_trip() {
    let shape = CanonicalShape::new(35, 35, 3, 1).unwrap();
    let model = Autoencoder::new(shape, &Device::Cpu).unwrap();
    let path = temp_path("round-trip");
    model.save(&path).unwrap();

    assert_eq!(stored_shape(&path).unwrap(), shape);

    let restored = Inference::cpu().load_autoencoder(&shape.dims(), &path).unwrap();
    assert_eq!(restored.parameter_count(), model.parameter_count());

    let clip = random_clip(&shape, 1);
    let a = values(&model.reconstruct(&clip).unwrap());
    let b = values(&restored.reconstruct(&clip).unwrap());
    assert_eq!(a, b);

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_load_with_other_shape_fails() {
    let shape = CanonicalShape::new(35, 35, 3, 1).unwrap();
    let path = temp_path("mismatch");
    Autoencoder::new(shape, &Device::Cpu).unwrap().save(&path).unwrap();

    let other = CanonicalShape::new(35, 35, 4, 1).unwrap();
    let result = Autoencoder::load(other, &Device::Cpu, &path);
    assert!(matches!(result, Err(AnomalyError::InvalidShape(_))));

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_load_without_shape_record_fails() {
    let path = temp_path("no-meta");
    let mut tensors = HashMap::new();
    tensors.insert("weight".to_string(), CanTensor::zeros(4, DType::F32, &Device::Cpu).unwrap());
    candle_core::safetensors::save(&tensors, &path).unwrap();

    let shape = CanonicalShape::new(35, 35, 3, 1).unwrap();
    let result = Autoencoder::load(shape, &Device::Cpu, &path);
    assert!(matches!(result, Err(AnomalyError::InvalidShape(_))));

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_load_missing_file_fails() {
    let shape = CanonicalShape::new(35, 35, 3, 1).unwrap();
    let result = Autoencoder::load(shape, &Device::Cpu, temp_path("missing"));
    assert!(matches!(result, Err(AnomalyError::Io(_))));
}

#[test]
fn test_parameter_count_depends_only_on_channels() {
    let a = Autoencoder::new(CanonicalShape::new(35, 35, 3, 1).unwrap(), &Device::Cpu).unwrap();
    let b = Autoencoder::new(CanonicalShape::new(40, 36, 6, 1).unwrap(), &Device::Cpu).unwrap();
    assert!(a.parameter_count() > 0);
    assert_eq!(a.parameter_count(), b.parameter_count());
}
