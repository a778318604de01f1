use {
    candle_core::{Result, Tensor},
    candle_nn::{
        Conv2d, Conv2dConfig, ConvTranspose2d, ConvTranspose2dConfig, Module, VarBuilder,
        conv_transpose2d, conv2d,
    },
};

pub(crate) const CONV1_FILTERS: usize = 128;
pub(crate) const CONV1_KERNEL: usize = 11;
pub(crate) const CONV1_STRIDE: usize = 4;
pub(crate) const CONV2_FILTERS: usize = 64;
pub(crate) const CONV2_KERNEL: usize = 5;
pub(crate) const CONV2_STRIDE: usize = 2;

// unpadded convolution: (output size, rows the floor division dropped)
fn valid_conv(size: usize, kernel: usize, stride: usize) -> (usize, usize) {
    ((size - kernel) / stride + 1, (size - kernel) % stride)
}

/// Spatial sizes through the encoder, and the padding the decoder needs to
/// land back on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub input: (usize, usize),
    pub stage1: (usize, usize),
    pub stage2: (usize, usize),
    remainder1: (usize, usize),
    remainder2: (usize, usize),
}

impl Geometry {
    /// Callers validate `height`/`width` against the minimum spatial size.
    pub fn new(height: usize, width: usize) -> Self {
        let (h1, rh1) = valid_conv(height, CONV1_KERNEL, CONV1_STRIDE);
        let (w1, rw1) = valid_conv(width, CONV1_KERNEL, CONV1_STRIDE);
        let (h2, rh2) = valid_conv(h1, CONV2_KERNEL, CONV2_STRIDE);
        let (w2, rw2) = valid_conv(w1, CONV2_KERNEL, CONV2_STRIDE);
        Self {
            input: (height, width),
            stage1: (h1, w1),
            stage2: (h2, w2),
            remainder1: (rh1, rw1),
            remainder2: (rh2, rw2),
        }
    }

    // both axes share one output_padding; the larger remainder covers both
    // and the surplus is cropped
    fn output_padding1(&self) -> usize {
        self.remainder2.0.max(self.remainder2.1)
    }

    fn output_padding2(&self) -> usize {
        self.remainder1.0.max(self.remainder1.1)
    }
}

/// Two strided convolutions with tanh: `(B, C, H, W)` to `(B, 64, h2, w2)`.
#[derive(Debug)]
pub struct SpatialEncoder {
    conv1: Conv2d,
    conv2: Conv2d,
}

impl SpatialEncoder {
    pub fn load(vb: VarBuilder, channels: usize) -> Result<Self> {
        let conv1 = conv2d(
            channels,
            CONV1_FILTERS,
            CONV1_KERNEL,
            Conv2dConfig {
                stride: CONV1_STRIDE,
                ..Default::default()
            },
            vb.pp("conv1"),
        )?;
        let conv2 = conv2d(
            CONV1_FILTERS,
            CONV2_FILTERS,
            CONV2_KERNEL,
            Conv2dConfig {
                stride: CONV2_STRIDE,
                ..Default::default()
            },
            vb.pp("conv2"),
        )?;
        Ok(Self { conv1, conv2 })
    }
}

impl Module for SpatialEncoder {
    fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        xs.apply(&self.conv1)?.tanh()?.apply(&self.conv2)?.tanh()
    }
}

/// Mirror of `SpatialEncoder`: `(B, 64, h2, w2)` back to `(B, C, H, W)`.
#[derive(Debug)]
pub struct SpatialDecoder {
    deconv1: ConvTranspose2d,
    deconv2: ConvTranspose2d,
    geometry: Geometry,
}

impl SpatialDecoder {
    pub fn load(vb: VarBuilder, channels: usize, geometry: Geometry) -> Result<Self> {
        let deconv1 = conv_transpose2d(
            CONV2_FILTERS,
            CONV1_FILTERS,
            CONV2_KERNEL,
            ConvTranspose2dConfig {
                stride: CONV2_STRIDE,
                output_padding: geometry.output_padding1(),
                ..Default::default()
            },
            vb.pp("deconv1"),
        )?;
        let deconv2 = conv_transpose2d(
            CONV1_FILTERS,
            channels,
            CONV1_KERNEL,
            ConvTranspose2dConfig {
                stride: CONV1_STRIDE,
                output_padding: geometry.output_padding2(),
                ..Default::default()
            },
            vb.pp("deconv2"),
        )?;
        Ok(Self {
            deconv1,
            deconv2,
            geometry,
        })
    }
}

fn crop(xs: &Tensor, (height, width): (usize, usize)) -> Result<Tensor> {
    xs.narrow(2, 0, height)?.narrow(3, 0, width)
}

impl Module for SpatialDecoder {
    fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        let xs = crop(&xs.apply(&self.deconv1)?, self.geometry.stage1)?.tanh()?;
        crop(&xs.apply(&self.deconv2)?, self.geometry.input)?
            .tanh()?
            .contiguous()
    }
}
