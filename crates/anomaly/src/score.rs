use {
    crate::{AnomalyError, Result},
    candle_core::{DType, Tensor as CanTensor},
};

/// Euclidean distance between a clip and its reconstruction, divided by the
/// number of elements.
///
/// Both tensors must be 5-D with identical shapes. The result is
/// non-negative, symmetric, and 0 for identical inputs.
pub fn reconstruction_error(clip: &CanTensor, reconstruction: &CanTensor) -> Result<f32> {
    if clip.dims() != reconstruction.dims() {
        return Err(AnomalyError::InvalidShape(format!(
            "clip {:?} and reconstruction {:?} differ in shape",
            clip.dims(),
            reconstruction.dims()
        )));
    }
    if clip.rank() != 5 {
        return Err(AnomalyError::InvalidShape(format!(
            "expected a 5-D clip, got {:?}",
            clip.dims()
        )));
    }
    let elements = clip.elem_count();
    if elements == 0 {
        return Err(AnomalyError::InvalidShape("clip has no elements".to_string()));
    }

    let distance = clip
        .to_dtype(DType::F32)?
        .sub(&reconstruction.to_device(clip.device())?.to_dtype(DType::F32)?)?
        .sqr()?
        .sum_all()?
        .sqrt()?
        .to_scalar::<f32>()?;
    Ok(distance / elements as f32)
}
