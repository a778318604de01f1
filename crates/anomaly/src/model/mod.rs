mod convlstm;
pub use convlstm::ConvLstm2d;

mod spatial;
pub use spatial::{Geometry, SpatialDecoder, SpatialEncoder};

mod train;
pub use train::{DEFAULT_LEARNING_RATE, TrainStep, Trainer};

use {
    crate::{AnomalyError, CanonicalShape, Result},
    candle_core::{DType, Device, Tensor as CanTensor},
    candle_nn::{Module, VarBuilder, VarMap},
    std::{collections::HashMap, fmt, path::Path},
};

/// Name of the tensor recording the canonical shape inside a parameter blob.
pub const SHAPE_KEY: &str = "meta.canonical_shape";

const BOTTLENECK_FILTERS: usize = 32;

/// Spatiotemporal convolutional autoencoder.
///
/// Clips are `(N, height, width, frames, channels)`; `forward_t` returns a
/// reconstruction of the same shape. Each frame is encoded spatially on its
/// own, then the sequence of feature maps runs through three ConvLSTM
/// layers (64, 32, 64 filters) before being decoded back frame by frame.
///
/// Parameters live in a `VarMap`, so a model is trainable right after
/// construction and can be written to and restored from a safetensors blob.
pub struct Autoencoder {
    shape: CanonicalShape,
    geometry: Geometry,
    device: Device,
    varmap: VarMap,
    spatial_encoder: SpatialEncoder,
    temporal_encoder: ConvLstm2d,
    bottleneck: ConvLstm2d,
    temporal_decoder: ConvLstm2d,
    spatial_decoder: SpatialDecoder,
}

impl fmt::Debug for Autoencoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Autoencoder")
            .field("shape", &self.shape)
            .field("geometry", &self.geometry)
            .field("device", &self.device)
            .field("parameters", &self.parameter_count())
            .finish()
    }
}

impl Autoencoder {
    /// Build a freshly initialized model for `shape` on `device`.
    pub fn new(shape: CanonicalShape, device: &Device) -> Result<Self> {
        shape.validate()?;
        let geometry = Geometry::new(shape.height, shape.width);
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);

        let spatial_encoder = SpatialEncoder::load(vb.pp("spatial_encoder"), shape.channels)?;
        let temporal_encoder = ConvLstm2d::load(vb.pp("temporal_encoder"), 64, 64, 0.4, 0.3)?;
        let bottleneck = ConvLstm2d::load(vb.pp("bottleneck"), 64, BOTTLENECK_FILTERS, 0.3, 0.0)?;
        let temporal_decoder =
            ConvLstm2d::load(vb.pp("temporal_decoder"), BOTTLENECK_FILTERS, 64, 0.5, 0.0)?;
        let spatial_decoder =
            SpatialDecoder::load(vb.pp("spatial_decoder"), shape.channels, geometry)?;

        log::debug!(
            "autoencoder for {:?}: latent {}x{}x{}",
            shape.dims(),
            geometry.stage2.0,
            geometry.stage2.1,
            BOTTLENECK_FILTERS
        );

        Ok(Self {
            shape,
            geometry,
            device: device.clone(),
            varmap,
            spatial_encoder,
            temporal_encoder,
            bottleneck,
            temporal_decoder,
            spatial_decoder,
        })
    }

    /// Restore a model previously written with `save`.
    ///
    /// Fails with `InvalidShape` if the blob was saved for a different
    /// canonical shape, or does not record one.
    pub fn load(shape: CanonicalShape, device: &Device, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let stored = stored_shape(path)?;
        if stored != shape {
            return Err(AnomalyError::InvalidShape(format!(
                "{} holds parameters for {:?}, expected {:?}",
                path.display(),
                stored.dims(),
                shape.dims()
            )));
        }
        let mut model = Self::new(shape, device)?;
        model.varmap.load(path)?;
        log::info!("loaded autoencoder parameters from {}", path.display());
        Ok(model)
    }

    /// Write all parameters plus the canonical shape to a safetensors file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut tensors: HashMap<String, CanTensor> = {
            let vars = self.varmap.data().lock().unwrap_or_else(|e| e.into_inner());
            vars.iter()
                .map(|(name, var)| (name.clone(), var.as_tensor().clone()))
                .collect()
        };
        let dims: Vec<u32> = self.shape.dims().iter().map(|&d| d as u32).collect();
        tensors.insert(SHAPE_KEY.to_string(), CanTensor::new(dims.as_slice(), &Device::Cpu)?);
        candle_core::safetensors::save(&tensors, path)?;
        log::info!("saved {} tensors to {}", tensors.len(), path.display());
        Ok(())
    }

    pub fn shape(&self) -> &CanonicalShape {
        &self.shape
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn varmap(&self) -> &VarMap {
        &self.varmap
    }

    /// Total number of scalar parameters.
    pub fn parameter_count(&self) -> usize {
        self.varmap
            .all_vars()
            .iter()
            .map(|var| var.as_tensor().elem_count())
            .sum()
    }

    fn check_clip(&self, clip: &CanTensor) -> Result<usize> {
        let dims = clip.dims();
        if dims.len() != 5 || dims[1..] != self.shape.dims()[..] {
            return Err(AnomalyError::InvalidShape(format!(
                "clip must be (N, {}, {}, {}, {}), got {dims:?}",
                self.shape.height, self.shape.width, self.shape.frames, self.shape.channels
            )));
        }
        Ok(dims[0])
    }

    /// Encode a clip batch into the `(N, frames, 32, h2, w2)` latent sequence.
    pub fn encode(&self, clip: &CanTensor, train: bool) -> Result<CanTensor> {
        let n = self.check_clip(clip)?;
        let s = self.shape;
        let xs = clip
            .to_device(&self.device)?
            .to_dtype(DType::F32)?
            .permute((0, 3, 4, 1, 2))?
            .contiguous()?
            .reshape((n * s.frames, s.channels, s.height, s.width))?;
        let xs = self.spatial_encoder.forward(&xs)?;
        let (_, c, h, w) = xs.dims4()?;
        let xs = xs.reshape((n, s.frames, c, h, w))?;
        let xs = self.temporal_encoder.forward_t(&xs, train)?;
        Ok(self.bottleneck.forward_t(&xs, train)?)
    }

    /// Decode a latent sequence back to `(N, height, width, frames, channels)`.
    pub fn decode(&self, latent: &CanTensor, train: bool) -> Result<CanTensor> {
        let s = self.shape;
        let (h2, w2) = self.geometry.stage2;
        let dims = latent.dims();
        if dims.len() != 5 || dims[1..] != [s.frames, BOTTLENECK_FILTERS, h2, w2] {
            return Err(AnomalyError::InvalidShape(format!(
                "latent must be (N, {}, {BOTTLENECK_FILTERS}, {h2}, {w2}), got {dims:?}",
                s.frames
            )));
        }
        let n = dims[0];
        let xs = self.temporal_decoder.forward_t(latent, train)?;
        let xs = xs.reshape((n * s.frames, self.temporal_decoder.filters(), h2, w2))?;
        let xs = self.spatial_decoder.forward(&xs)?;
        Ok(xs
            .reshape((n, s.frames, s.channels, s.height, s.width))?
            .permute((0, 3, 4, 1, 2))?
            .contiguous()?)
    }

    /// Full encode/decode pass. Dropout is active only when `train` is set.
    pub fn forward_t(&self, clip: &CanTensor, train: bool) -> Result<CanTensor> {
        let latent = self.encode(clip, train)?;
        self.decode(&latent, train)
    }

    /// Deterministic reconstruction used for scoring.
    pub fn reconstruct(&self, clip: &CanTensor) -> Result<CanTensor> {
        self.forward_t(clip, false)
    }
}

/// Read the canonical shape recorded in a parameter blob without loading it.
pub fn stored_shape(path: impl AsRef<Path>) -> Result<CanonicalShape> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let mmap = unsafe { memmap2::Mmap::map(&file)? };
    let tensors = safetensors::SafeTensors::deserialize(&mmap)?;
    let view = tensors.tensor(SHAPE_KEY).map_err(|_| {
        AnomalyError::InvalidShape(format!("{} does not record a canonical shape", path.display()))
    })?;
    if view.dtype() != safetensors::Dtype::U32 || view.shape() != [4] {
        return Err(AnomalyError::InvalidShape(format!(
            "{SHAPE_KEY} must be 4 u32 values, got {:?} {:?}",
            view.dtype(),
            view.shape()
        )));
    }
    let dims: Vec<usize> = view
        .data()
        .chunks_exact(4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]) as usize)
        .collect();
    CanonicalShape::from_dims(&dims)
}
