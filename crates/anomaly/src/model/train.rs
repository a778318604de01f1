use {
    super::Autoencoder,
    crate::Result,
    candle_core::{DType, Tensor as CanTensor},
    candle_nn::{AdamW, Optimizer, ParamsAdamW},
};

pub const DEFAULT_LEARNING_RATE: f64 = 1e-3;

/// Loss and accuracy of one batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainStep {
    pub loss: f32,
    /// Share of elements where reconstruction and input fall on the same
    /// side of 0.5.
    pub accuracy: f32,
}

/// Fits an `Autoencoder` to reproduce its input with Adam and MSE loss.
pub struct Trainer<'a> {
    model: &'a Autoencoder,
    optimizer: AdamW,
}

impl<'a> Trainer<'a> {
    pub fn new(model: &'a Autoencoder) -> Result<Self> {
        Self::with_learning_rate(model, DEFAULT_LEARNING_RATE)
    }

    pub fn with_learning_rate(model: &'a Autoencoder, learning_rate: f64) -> Result<Self> {
        let params = ParamsAdamW {
            lr: learning_rate,
            weight_decay: 0.0,
            ..Default::default()
        };
        let optimizer = AdamW::new(model.varmap().all_vars(), params)?;
        Ok(Self { model, optimizer })
    }

    pub fn learning_rate(&self) -> f64 {
        self.optimizer.learning_rate()
    }

    /// One optimizer step on a `(N, H, W, T, C)` batch, with dropout active.
    pub fn step(&mut self, clips: &CanTensor) -> Result<TrainStep> {
        let target = clips.to_device(self.model.device())?.to_dtype(DType::F32)?;
        let reconstruction = self.model.forward_t(&target, true)?;
        let loss = candle_nn::loss::mse(&reconstruction, &target)?;
        self.optimizer.backward_step(&loss)?;
        Ok(TrainStep {
            loss: loss.to_scalar::<f32>()?,
            accuracy: binary_accuracy(&reconstruction, &target)?,
        })
    }

    /// Loss and accuracy without dropout and without updating parameters.
    pub fn evaluate(&self, clips: &CanTensor) -> Result<TrainStep> {
        let target = clips.to_device(self.model.device())?.to_dtype(DType::F32)?;
        let reconstruction = self.model.reconstruct(&target)?;
        let loss = candle_nn::loss::mse(&reconstruction, &target)?;
        Ok(TrainStep {
            loss: loss.to_scalar::<f32>()?,
            accuracy: binary_accuracy(&reconstruction, &target)?,
        })
    }

    /// Run `epochs` passes over `batches`, returning the last step of each.
    pub fn fit(&mut self, batches: &[CanTensor], epochs: usize) -> Result<Vec<TrainStep>> {
        let mut history = Vec::with_capacity(epochs);
        for epoch in 0..epochs {
            let mut last = None;
            for batch in batches {
                last = Some(self.step(batch)?);
            }
            if let Some(step) = last {
                log::info!(
                    "epoch {}/{epochs}: loss {:.6} accuracy {:.4}",
                    epoch + 1,
                    step.loss,
                    step.accuracy
                );
                history.push(step);
            }
        }
        Ok(history)
    }
}

fn binary_accuracy(prediction: &CanTensor, target: &CanTensor) -> Result<f32> {
    let prediction = prediction.ge(0.5f32)?;
    let target = target.ge(0.5f32)?;
    Ok(prediction
        .eq(&target)?
        .to_dtype(DType::F32)?
        .mean_all()?
        .to_scalar::<f32>()?)
}
