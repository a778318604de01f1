use {
    crate::{AnomalyError, ClipWindower, Result},
    candle_core::{DType, Device, Tensor as CanTensor},
    std::path::{Path, PathBuf},
};

pub const DATASET_EXTENSION: &str = "npy";

/// Resolve a dataset name to an existing `.npy` file.
///
/// A name without an extension gets `.npy` appended. Empty names, other
/// extensions, and names that do not resolve to a file fail with
/// `InvalidSourceName`.
pub fn resolve_source_name(name: &str) -> Result<PathBuf> {
    if name.trim().is_empty() {
        return Err(AnomalyError::InvalidSourceName("empty dataset name".to_string()));
    }
    let mut path = PathBuf::from(name);
    match path.extension().and_then(|ext| ext.to_str()) {
        None => {
            path.set_extension(DATASET_EXTENSION);
        }
        Some(ext) if ext.eq_ignore_ascii_case(DATASET_EXTENSION) => {}
        Some(ext) => {
            return Err(AnomalyError::InvalidSourceName(format!(
                "{name}: expected a .{DATASET_EXTENSION} file, got .{ext}"
            )));
        }
    }
    if !path.is_file() {
        return Err(AnomalyError::InvalidSourceName(format!(
            "{} does not exist",
            path.display()
        )));
    }
    Ok(path)
}

/// Load one source video as an `(H, W, total_frames)` f32 tensor.
pub fn load_source(name: &str, device: &Device) -> Result<CanTensor> {
    let path = resolve_source_name(name)?;
    let raw = CanTensor::read_npy(&path)?;
    log::debug!("loaded {} with shape {:?}", path.display(), raw.dims());
    Ok(raw.to_dtype(DType::F32)?.to_device(device)?)
}

/// Load one source video and window it into a `(k, H, W, T, 1)` batch.
pub fn load_clips(name: &str, windower: &ClipWindower, device: &Device) -> Result<CanTensor> {
    windower.batch(&load_source(name, device)?)
}

/// Load every source, window each one, and concatenate all clips into one
/// `(N, H, W, T, 1)` training tensor.
///
/// Sources shorter than one clip are skipped with a warning; it is an error
/// if no source contributes a clip.
pub fn load_training_set<S: AsRef<str>>(
    names: &[S],
    windower: &ClipWindower,
    device: &Device,
) -> Result<CanTensor> {
    let mut batches = Vec::with_capacity(names.len());
    for name in names {
        let name = name.as_ref();
        let raw = load_source(name, device)?;
        let clips = windower.split(&raw)?;
        if clips.is_empty() {
            log::warn!("{name}: shorter than one clip, skipped");
            continue;
        }
        batches.extend(clips);
    }
    if batches.is_empty() {
        return Err(AnomalyError::InvalidShape(
            "no source video holds a whole clip".to_string(),
        ));
    }
    let training_set = CanTensor::cat(&batches, 0)?;
    log::info!(
        "training set: {} clips from {} sources",
        training_set.dim(0)?,
        names.len()
    );
    Ok(training_set)
}

/// Flatten one level of nesting, keeping order.
pub fn flatten<T, I>(nested: I) -> Vec<T>
where
    I: IntoIterator,
    I::Item: IntoIterator<Item = T>,
{
    nested.into_iter().flatten().collect()
}

/// Dataset names for every `.npy` file directly inside `dir`, sorted.
pub fn list_sources(dir: impl AsRef<Path>) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir.as_ref())? {
        let path = entry?.path();
        let is_npy = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(DATASET_EXTENSION));
        if is_npy && path.is_file() {
            names.push(path.to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}
