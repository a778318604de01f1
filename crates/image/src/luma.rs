use {
    crate::{Image, ImageError},
    base::Tensor,
    crates_image::{ImageBuffer, Luma, imageops::FilterType},
};

/// ITU-R BT.601 luma weights for R, G, B.
pub const LUMA_WEIGHTS: [f32; 3] = [0.2989, 0.5870, 0.1140];

/// Collapse an RGB(A) image into a single luminance plane `[height, width]`.
///
/// Channels past the third (alpha) are ignored. Integer samples are scaled to
/// [0, 1] first, so the plane is in [0, 1] for any source precision.
pub fn luminance(image: &Image) -> Result<Tensor<f32>, ImageError> {
    if image.is_empty() {
        return Err(ImageError::Shape(format!(
            "expected non-empty HWC image, got shape {:?}",
            image.shape()
        )));
    }
    let (h, w, c) = (image.height(), image.width(), image.channels());
    if c < 3 {
        return Err(ImageError::Shape(format!(
            "expected at least 3 channels (RGB), got {c}"
        )));
    }

    let mut plane = Vec::with_capacity(h * w);
    for pixel in 0..h * w {
        let base = pixel * c;
        let luma = LUMA_WEIGHTS
            .iter()
            .enumerate()
            .map(|(ch, weight)| image.unit_sample(base + ch) * weight)
            .sum::<f32>();
        plane.push(luma);
    }
    Ok(Tensor::new(vec![h, w], plane)?)
}

/// Resize a `[height, width]` plane with bilinear (triangle) filtering.
///
/// Values keep their range. The `image` crate clamps f32 pixels to [0, 1], so
/// the plane is mapped onto [0, 1] by its own min/max for the filter and
/// mapped back afterwards.
///
/// # Errors
///
/// `Shape` for an empty or non-2D plane or a zero target size, `Value` if the plane
/// holds NaN or infinite samples.
pub fn resize_bilinear(
    plane: &Tensor<f32>,
    height: usize,
    width: usize,
) -> Result<Tensor<f32>, ImageError> {
    if plane.shape.len() != 2 || plane.data.is_empty() || height == 0 || width == 0 {
        return Err(ImageError::Shape(format!(
            "cannot resize plane of shape {:?} to {height}x{width}",
            plane.shape
        )));
    }
    if plane.data.iter().any(|v| !v.is_finite()) {
        return Err(ImageError::Value("plane contains non-finite values".to_string()));
    }
    let (src_h, src_w) = (plane.shape[0], plane.shape[1]);
    if src_h == height && src_w == width {
        return Ok(plane.clone());
    }

    let (min, max) = plane
        .data
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let span = max - min;
    if span <= 0.0 {
        return Ok(Tensor::new(vec![height, width], vec![min; height * width])?);
    }

    let unit = plane.data.iter().map(|&v| (v - min) / span).collect();
    let buffer: ImageBuffer<Luma<f32>, Vec<f32>> =
        ImageBuffer::from_raw(src_w as u32, src_h as u32, unit).ok_or_else(|| {
            ImageError::Shape(format!("plane data does not match {src_h}x{src_w}"))
        })?;
    let resized =
        crates_image::imageops::resize(&buffer, width as u32, height as u32, FilterType::Triangle);
    let data = resized.into_raw().into_iter().map(|v| v * span + min).collect();
    Ok(Tensor::new(vec![height, width], data)?)
}
