use {
    crate::{AnomalyError, Result},
    serde::{Deserialize, Serialize},
    std::path::Path,
};

/// Smallest height/width that survives both valid spatial convolutions
/// (11×11 stride 4, then 5×5 stride 2).
pub const MIN_SPATIAL_SIZE: usize = 27;

/// The fixed (height, width, frames, channels) a model instance is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct CanonicalShape {
    pub height: usize,
    pub width: usize,
    pub frames: usize,
    pub channels: usize,
}

impl CanonicalShape {
    pub fn new(height: usize, width: usize, frames: usize, channels: usize) -> Result<Self> {
        let shape = Self {
            height,
            width,
            frames,
            channels,
        };
        shape.validate()?;
        Ok(shape)
    }

    /// Build from `[height, width, frames, channels]`.
    ///
    /// Any other rank fails with `InvalidShape`.
    pub fn from_dims(dims: &[usize]) -> Result<Self> {
        match *dims {
            [height, width, frames, channels] => Self::new(height, width, frames, channels),
            _ => Err(AnomalyError::InvalidShape(format!(
                "input shape must have 4 values (height, width, frames, channels), got {dims:?}"
            ))),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.height < MIN_SPATIAL_SIZE || self.width < MIN_SPATIAL_SIZE {
            return Err(AnomalyError::InvalidShape(format!(
                "spatial size {}x{} is below the minimum {MIN_SPATIAL_SIZE}x{MIN_SPATIAL_SIZE}",
                self.height, self.width
            )));
        }
        if self.frames == 0 || self.channels == 0 {
            return Err(AnomalyError::InvalidShape(format!(
                "frames and channels must be non-zero, got frames={} channels={}",
                self.frames, self.channels
            )));
        }
        Ok(())
    }

    pub fn dims(&self) -> [usize; 4] {
        [self.height, self.width, self.frames, self.channels]
    }

    /// Full 5-D clip shape `(batch, height, width, frames, channels)`.
    pub fn clip_dims(&self, batch: usize) -> [usize; 5] {
        [batch, self.height, self.width, self.frames, self.channels]
    }

    pub fn clip_elements(&self, batch: usize) -> usize {
        self.clip_dims(batch).iter().product()
    }

    /// Shape alone, e.g. `{"height":227,"width":227,"frames":10,"channels":1}`.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let shape: Self = serde_json::from_str(json)?;
        shape.validate()?;
        Ok(shape)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

fn default_stride() -> usize {
    1
}

/// Deployment settings for the streaming classifier.
///
/// The threshold is in reconstruction-error units and has no default; it has
/// to be calibrated per deployment.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AnomalyConfig {
    pub shape: CanonicalShape,
    pub threshold: f32,
    /// Score every `stride`-th frame once the window is full.
    #[serde(default = "default_stride")]
    pub stride: usize,
}

impl AnomalyConfig {
    pub fn new(shape: CanonicalShape, threshold: f32) -> Result<Self> {
        let config = Self {
            shape,
            threshold,
            stride: default_stride(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_threshold(mut self, threshold: f32) -> Result<Self> {
        self.threshold = threshold;
        self.validate()?;
        Ok(self)
    }

    pub fn with_stride(mut self, stride: usize) -> Result<Self> {
        self.stride = stride;
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        self.shape.validate()?;
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(AnomalyError::InvalidConfig(format!(
                "threshold must be a non-negative finite number, got {}",
                self.threshold
            )));
        }
        if self.stride == 0 {
            return Err(AnomalyError::InvalidConfig("stride must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}
