use {
    crate::{AnomalyError, CanonicalShape, Result},
    base::Tensor,
    candle_core::{DType, Device, Tensor as CanTensor},
    std::collections::VecDeque,
};

fn require_single_channel(shape: &CanonicalShape) -> Result<()> {
    if shape.channels != 1 {
        return Err(AnomalyError::InvalidShape(format!(
            "clip windows carry grayscale frames (1 channel), model expects {}",
            shape.channels
        )));
    }
    Ok(())
}

/// Splits one source video `(height, width, total_frames)` into
/// non-overlapping clips of `frames` frames.
///
/// Trailing frames that do not fill a whole clip are dropped.
#[derive(Debug, Clone)]
pub struct ClipWindower {
    shape: CanonicalShape,
}

impl ClipWindower {
    pub fn new(shape: CanonicalShape) -> Result<Self> {
        shape.validate()?;
        require_single_channel(&shape)?;
        Ok(Self { shape })
    }

    pub fn shape(&self) -> &CanonicalShape {
        &self.shape
    }

    /// Number of whole clips in a video with `total_frames` frames.
    pub fn clip_count(&self, total_frames: usize) -> usize {
        total_frames / self.shape.frames
    }

    // (k, H, W, T, 1), or None when not even one clip fits
    fn windows(&self, raw: &CanTensor) -> Result<Option<CanTensor>> {
        let (h, w, total) = raw.dims3().map_err(|_| {
            AnomalyError::InvalidShape(format!(
                "source video must be (height, width, frames), got {:?}",
                raw.dims()
            ))
        })?;
        if h != self.shape.height || w != self.shape.width {
            return Err(AnomalyError::InvalidShape(format!(
                "source video frames are {h}x{w}, expected {}x{}",
                self.shape.height, self.shape.width
            )));
        }

        let t = self.shape.frames;
        let k = self.clip_count(total);
        if k == 0 {
            return Ok(None);
        }
        if total % t != 0 {
            log::debug!("dropping {} trailing frames of {total}", total % t);
        }

        let clips = raw
            .to_dtype(DType::F32)?
            .narrow(2, 0, k * t)?
            .contiguous()?
            .reshape((h, w, k, t))?
            .permute((2, 0, 1, 3))?
            .unsqueeze(4)?
            .contiguous()?;
        Ok(Some(clips))
    }

    /// One `(1, H, W, T, 1)` clip per whole window, in temporal order.
    pub fn split(&self, raw: &CanTensor) -> Result<Vec<CanTensor>> {
        let Some(clips) = self.windows(raw)? else {
            return Ok(Vec::new());
        };
        let k = clips.dim(0)?;
        (0..k)
            .map(|i| clips.narrow(0, i, 1).map_err(AnomalyError::from))
            .collect()
    }

    /// All whole windows stacked into one `(k, H, W, T, 1)` training batch.
    ///
    /// Fails with `InvalidShape` when the video is shorter than one clip.
    pub fn batch(&self, raw: &CanTensor) -> Result<CanTensor> {
        self.windows(raw)?.ok_or_else(|| {
            AnomalyError::InvalidShape(format!(
                "source video has {} frames, fewer than one clip of {}",
                raw.dims().last().copied().unwrap_or(0),
                self.shape.frames
            ))
        })
    }
}

/// Bounded buffer of the most recent preprocessed frames.
///
/// Holds at most `frames` frames; once full, each push evicts the oldest.
#[derive(Debug)]
pub struct SlidingWindow {
    frames: VecDeque<Tensor<f32>>,
    shape: CanonicalShape,
    device: Device,
}

impl SlidingWindow {
    pub fn new(shape: CanonicalShape, device: &Device) -> Result<Self> {
        shape.validate()?;
        require_single_channel(&shape)?;
        Ok(Self {
            frames: VecDeque::with_capacity(shape.frames),
            shape,
            device: device.clone(),
        })
    }

    pub fn capacity(&self) -> usize {
        self.shape.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn is_ready(&self) -> bool {
        self.frames.len() == self.shape.frames
    }

    /// Buffered frames, oldest first.
    pub fn frames(&self) -> impl Iterator<Item = &Tensor<f32>> {
        self.frames.iter()
    }

    /// Append a `[height, width]` frame, evicting the oldest when full.
    pub fn push(&mut self, frame: Tensor<f32>) -> Result<()> {
        if frame.shape != [self.shape.height, self.shape.width] {
            return Err(AnomalyError::InvalidShape(format!(
                "window frame must be [{}, {}], got {:?}",
                self.shape.height, self.shape.width, frame.shape
            )));
        }
        if self.is_ready() {
            self.frames.pop_front();
        }
        self.frames.push_back(frame);
        Ok(())
    }

    /// Assemble the current frames into a `(1, H, W, T, 1)` clip.
    ///
    /// `None` until the window holds exactly `frames` frames.
    pub fn clip(&self) -> Result<Option<CanTensor>> {
        if !self.is_ready() {
            return Ok(None);
        }
        let (h, w, t) = (self.shape.height, self.shape.width, self.shape.frames);
        let mut data = Vec::with_capacity(h * w * t);
        for pixel in 0..h * w {
            data.extend(self.frames.iter().map(|frame| frame.data[pixel]));
        }
        Ok(Some(CanTensor::from_vec(data, (1, h, w, t, 1), &self.device)?))
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}
