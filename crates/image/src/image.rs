use {crate::ImageError, base::Tensor};

/// A decoded image in HWC layout `[height, width, channels]`.
///
/// The variant keeps the source precision; color order is RGB(A).
#[derive(Debug, Clone, PartialEq)]
pub enum Image {
    U8(Tensor<u8>),
    U16(Tensor<u16>),
    F32(Tensor<f32>),
}

impl Image {
    /// Wrap packed RGB8 bytes.
    pub fn from_rgb8(width: usize, height: usize, data: Vec<u8>) -> Result<Self, ImageError> {
        Ok(Image::U8(Tensor::new(vec![height, width, 3], data)?))
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            Image::U8(t) => &t.shape,
            Image::U16(t) => &t.shape,
            Image::F32(t) => &t.shape,
        }
    }

    fn dim(&self, index: usize) -> usize {
        self.shape().get(index).copied().unwrap_or(0)
    }

    pub fn height(&self) -> usize {
        self.dim(0)
    }

    pub fn width(&self) -> usize {
        self.dim(1)
    }

    pub fn channels(&self) -> usize {
        self.dim(2)
    }

    /// True when the image has no pixels or is not HWC.
    pub fn is_empty(&self) -> bool {
        self.shape().len() != 3 || self.height() == 0 || self.width() == 0 || self.channels() == 0
    }

    /// Sample at a flat HWC index, scaled to [0, 1] by the sample type's range.
    pub(crate) fn unit_sample(&self, index: usize) -> f32 {
        match self {
            Image::U8(t) => t.data[index] as f32 / u8::MAX as f32,
            Image::U16(t) => t.data[index] as f32 / u16::MAX as f32,
            Image::F32(t) => t.data[index],
        }
    }
}
