use {
    crate::{AnomalyError, Result},
    base::Tensor,
    image::Image,
};

// below this the frame is treated as constant; luminance planes are in [0, 1]
const MIN_STD: f32 = 1e-6;

/// Normalize a raw color frame into a model-ready grayscale frame.
///
/// Collapses RGB to luminance, resizes to `height`×`width` with bilinear
/// filtering, standardizes with the frame's own mean and standard deviation,
/// and clips the result to [0, 1]. Luminance is linear, so collapsing before
/// resizing matches resize-then-collapse up to rounding.
///
/// Returns `Tensor<f32>` with shape `[height, width]`.
///
/// # Errors
///
/// `InvalidFrame` if the image is empty, has fewer than 3 channels, or has
/// (near-)zero or non-finite variance.
pub fn preprocess(image: &Image, height: usize, width: usize) -> Result<Tensor<f32>> {
    if image.is_empty() {
        return Err(AnomalyError::InvalidFrame(format!(
            "empty frame with shape {:?}",
            image.shape()
        )));
    }
    if height == 0 || width == 0 {
        return Err(AnomalyError::InvalidShape(format!(
            "target size must be non-zero, got {height}x{width}"
        )));
    }

    let luma = image::luminance(image).map_err(|e| AnomalyError::InvalidFrame(e.to_string()))?;
    let resized = image::resize_bilinear(&luma, height, width)
        .map_err(|e| AnomalyError::InvalidFrame(e.to_string()))?;

    let Some((mean, std)) = resized.mean_std() else {
        return Err(AnomalyError::InvalidFrame("frame has no pixels".to_string()));
    };
    if !mean.is_finite() || !std.is_finite() {
        return Err(AnomalyError::InvalidFrame(
            "frame contains non-finite values".to_string(),
        ));
    }
    if std < MIN_STD {
        return Err(AnomalyError::InvalidFrame(format!(
            "frame has zero variance (mean {mean})"
        )));
    }

    Ok(resized.map(|&v| ((v - mean) / std).clamp(0.0, 1.0)))
}
