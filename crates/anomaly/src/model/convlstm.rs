use {
    candle_core::{DType, Device, IndexOp, Result, Shape, Tensor},
    candle_nn::{Conv2d, Conv2dConfig, Module, VarBuilder, conv2d, conv2d_no_bias},
};

// clamp(0.2 x + 0.5, 0, 1)
fn hard_sigmoid(xs: &Tensor) -> Result<Tensor> {
    xs.affine(0.2, 0.5)?.clamp(0f32, 1f32)
}

// inverted dropout: kept entries are scaled by 1 / (1 - rate)
fn dropout_mask(shape: impl Into<Shape>, rate: f32, device: &Device) -> Result<Tensor> {
    let keep = Tensor::rand(0f32, 1f32, shape, device)?.ge(rate)?;
    keep.to_dtype(DType::F32)?.affine(1.0 / (1.0 - rate as f64), 0.0)
}

/// Convolutional LSTM over `(N, T, C, H, W)` sequences.
///
/// Gates are computed with 3×3 same-padded convolutions, hard-sigmoid for the
/// input/forget/output gates and tanh for the candidate and cell output.
/// Returns the full hidden sequence `(N, T, filters, H, W)`.
///
/// Dropout masks are sampled once per sequence and shared by every timestep.
#[derive(Debug)]
pub struct ConvLstm2d {
    input_conv: Conv2d,
    recurrent_conv: Conv2d,
    filters: usize,
    dropout: f32,
    recurrent_dropout: f32,
}

impl ConvLstm2d {
    pub fn load(
        vb: VarBuilder,
        in_channels: usize,
        filters: usize,
        dropout: f32,
        recurrent_dropout: f32,
    ) -> Result<Self> {
        let config = Conv2dConfig {
            padding: 1,
            ..Default::default()
        };
        let input_conv = conv2d(in_channels, 4 * filters, 3, config, vb.pp("input"))?;
        let recurrent_conv = conv2d_no_bias(filters, 4 * filters, 3, config, vb.pp("recurrent"))?;
        Ok(Self {
            input_conv,
            recurrent_conv,
            filters,
            dropout,
            recurrent_dropout,
        })
    }

    pub fn filters(&self) -> usize {
        self.filters
    }

    pub fn forward_t(&self, xs: &Tensor, train: bool) -> Result<Tensor> {
        let (n, t, c, h, w) = xs.dims5()?;
        let f = self.filters;
        let device = xs.device();

        let xs = if train && self.dropout > 0.0 {
            xs.broadcast_mul(&dropout_mask((n, 1, c, h, w), self.dropout, device)?)?
        } else {
            xs.clone()
        };
        let recurrent_mask = if train && self.recurrent_dropout > 0.0 {
            Some(dropout_mask((n, f, h, w), self.recurrent_dropout, device)?)
        } else {
            None
        };

        // input contribution for all timesteps in one convolution
        let input_gates = xs
            .reshape((n * t, c, h, w))?
            .apply(&self.input_conv)?
            .reshape((n, t, 4 * f, h, w))?;

        let mut hidden = Tensor::zeros((n, f, h, w), DType::F32, device)?;
        let mut cell = hidden.clone();
        let mut outputs = Vec::with_capacity(t);
        for step in 0..t {
            let recurrent_in = match &recurrent_mask {
                Some(mask) => hidden.mul(mask)?,
                None => hidden.clone(),
            };
            let recurrent_gates = self.recurrent_conv.forward(&recurrent_in)?;
            let gates = input_gates.i((.., step))?.add(&recurrent_gates)?;
            let chunks = gates.chunk(4, 1)?;

            let input_gate = hard_sigmoid(&chunks[0])?;
            let forget_gate = hard_sigmoid(&chunks[1])?;
            let candidate = chunks[2].tanh()?;
            let output_gate = hard_sigmoid(&chunks[3])?;

            cell = forget_gate.mul(&cell)?.add(&input_gate.mul(&candidate)?)?;
            hidden = output_gate.mul(&cell.tanh()?)?;
            outputs.push(hidden.clone());
        }
        Tensor::stack(&outputs, 1)
    }
}
