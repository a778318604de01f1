use image::Image;

#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Zero-based position of the frame in its source.
    pub index: u64,
    pub color: Image,
}
