use {
    crate::{
        AnomalyConfig, AnomalyDetector, Autoencoder, CanonicalShape, Result, StreamingClassifier,
    },
    candle_core::Device,
    std::{path::Path, sync::Arc},
};

/// Device context that every model and classifier is built from.
#[derive(Debug, Clone)]
pub struct Inference {
    device: Device,
}

impl Inference {
    pub fn cpu() -> Self {
        log::info!("Inference device: CPU");
        Self { device: Device::Cpu }
    }

    #[cfg(feature = "cuda")]
    pub fn cuda(ordinal: usize) -> Result<Self> {
        let device = Device::new_cuda(ordinal)?;
        if device.is_cuda() {
            log::info!("Inference device: CUDA (ordinal {ordinal})");
        } else {
            log::warn!(
                "Inference device: requested CUDA ordinal {ordinal} but device reports non-CUDA"
            );
        }
        Ok(Self { device })
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Fresh autoencoder for `[height, width, frames, channels]`.
    pub fn use_autoencoder(&self, dims: &[usize]) -> Result<Autoencoder> {
        let shape = CanonicalShape::from_dims(dims)?;
        Autoencoder::new(shape, &self.device)
    }

    /// Autoencoder restored from a blob written by `Autoencoder::save`.
    pub fn load_autoencoder(&self, dims: &[usize], path: impl AsRef<Path>) -> Result<Autoencoder> {
        let shape = CanonicalShape::from_dims(dims)?;
        Autoencoder::load(shape, &self.device, path)
    }

    /// Build the model for `config.shape`, restoring it from `model_path`
    /// when given, and wrap it in a streaming classifier.
    pub fn use_classifier(
        &self,
        config: &AnomalyConfig,
        model_path: Option<&Path>,
    ) -> Result<StreamingClassifier> {
        let model = match model_path {
            Some(path) => Autoencoder::load(config.shape, &self.device, path)?,
            None => {
                log::warn!("no model parameters given, scoring with an untrained autoencoder");
                Autoencoder::new(config.shape, &self.device)?
            }
        };
        StreamingClassifier::new(Arc::new(model), config)
    }

    pub fn use_detector(
        &self,
        config: &AnomalyConfig,
        model_path: Option<&Path>,
    ) -> Result<AnomalyDetector> {
        Ok(AnomalyDetector::new(self.use_classifier(config, model_path)?))
    }
}
