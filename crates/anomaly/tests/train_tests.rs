use anomaly::{Autoencoder, CanonicalShape, Trainer};
use candle_core::{Device, Tensor as CanTensor};

fn setup() -> (Autoencoder, CanTensor) {
    let shape = CanonicalShape::new(35, 35, 3, 1).unwrap();
    let model = Autoencoder::new(shape, &Device::Cpu).unwrap();
    let clips = CanTensor::rand(0f32, 1f32, shape.clip_dims(2).to_vec(), &Device::Cpu).unwrap();
    (model, clips)
}

fn values(t: &CanTensor) -> Vec<f32> {
    t.flatten_all().unwrap().to_vec1::<f32>().unwrap()
}

#[test]
fn test_step_reports_loss_and_accuracy() {
    let (model, clips) = setup();
    let mut trainer = Trainer::new(&model).unwrap();
    assert_eq!(trainer.learning_rate(), 1e-3);

    let step = trainer.step(&clips).unwrap();
    assert!(step.loss.is_finite() && step.loss >= 0.0);
    assert!((0.0..=1.0).contains(&step.accuracy));
}

#[test]
fn test_step_updates_parameters() {
    let (model, clips) = setup();
    let before = values(&model.reconstruct(&clips).unwrap());

    let mut trainer = Trainer::new(&model).unwrap();
    trainer.step(&clips).unwrap();

    let after = values(&model.reconstruct(&clips).unwrap());
    assert_ne!(before, after);
}

#[test]
fn test_evaluate_leaves_parameters_alone() {
    let (model, clips) = setup();
    let trainer = Trainer::new(&model).unwrap();
    let first = trainer.evaluate(&clips).unwrap();
    let second = trainer.evaluate(&clips).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_fit_records_one_step_per_epoch() {
    let (model, clips) = setup();
    let mut trainer = Trainer::with_learning_rate(&model, 1e-4).unwrap();
    let history = trainer.fit(&[clips.clone(), clips], 2).unwrap();
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|s| s.loss.is_finite()));
}

#[test]
fn test_step_rejects_wrong_clip_shape() {
    let (model, _) = setup();
    let mut trainer = Trainer::new(&model).unwrap();
    let wrong = CanTensor::zeros((1, 35, 35, 4, 1), candle_core::DType::F32, &Device::Cpu).unwrap();
    assert!(trainer.step(&wrong).is_err());
}
