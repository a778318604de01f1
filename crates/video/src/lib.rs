//! Frame sources for the anomaly pipeline.
//!
//! A `FrameSource` is pulled one frame at a time on the calling thread and
//! released when the consumer is done with it.

pub mod error;
pub mod memory;
pub mod sequence;
pub mod source;
pub mod videoframe;

pub use error::VideoError;
pub use memory::MemorySource;
pub use sequence::ImageSequence;
pub use source::FrameSource;
pub use videoframe::VideoFrame;
