//! Image decoding and pixel-plane helpers.
//!
//! Wraps the `image` crate: decoded images are `Image` tensors in HWC layout
//! `[height, width, channels]`, and luminance planes are `Tensor<f32>` in
//! `[height, width]`.

pub mod error;
pub mod image;
pub mod luma;

pub use error::ImageError;
pub use image::Image;
pub use luma::{LUMA_WEIGHTS, luminance, resize_bilinear};

use base::Tensor;
use crates_image::DynamicImage;

fn to_tensor<T>(
    width: u32,
    height: u32,
    channels: usize,
    data: Vec<T>,
) -> Result<Tensor<T>, ImageError> {
    Ok(Tensor::new(vec![height as usize, width as usize, channels], data)?)
}

/// Decodes an image from raw bytes on the calling thread.
///
/// The format is auto-detected. 8-bit and 16-bit RGB(A) keep their precision,
/// float images stay f32, grayscale and other layouts are expanded to RGB8 so
/// every result has at least 3 channels.
pub fn decode(data: &[u8]) -> Result<Image, ImageError> {
    let img = crates_image::load_from_memory(data)?;

    match img {
        DynamicImage::ImageRgb8(buf) => {
            let (w, h) = buf.dimensions();
            Ok(Image::U8(to_tensor(w, h, 3, buf.into_raw())?))
        }
        DynamicImage::ImageRgba8(buf) => {
            let (w, h) = buf.dimensions();
            Ok(Image::U8(to_tensor(w, h, 4, buf.into_raw())?))
        }
        DynamicImage::ImageRgb16(buf) => {
            let (w, h) = buf.dimensions();
            Ok(Image::U16(to_tensor(w, h, 3, buf.into_raw())?))
        }
        DynamicImage::ImageRgba16(buf) => {
            let (w, h) = buf.dimensions();
            Ok(Image::U16(to_tensor(w, h, 4, buf.into_raw())?))
        }
        DynamicImage::ImageRgb32F(buf) => {
            let (w, h) = buf.dimensions();
            Ok(Image::F32(to_tensor(w, h, 3, buf.into_raw())?))
        }
        DynamicImage::ImageRgba32F(buf) => {
            let (w, h) = buf.dimensions();
            Ok(Image::F32(to_tensor(w, h, 4, buf.into_raw())?))
        }
        _ => {
            let rgb = img.to_rgb8();
            let (w, h) = rgb.dimensions();
            Ok(Image::U8(to_tensor(w, h, 3, rgb.into_raw())?))
        }
    }
}

/// Decodes an image from raw bytes on tokio's blocking thread pool.
pub async fn decode_image(data: &[u8]) -> Result<Image, ImageError> {
    let owned = data.to_vec();
    tokio::task::spawn_blocking(move || decode(&owned))
        .await
        .map_err(|e| ImageError::Decode(e.to_string()))?
}
