use crate::{VideoError, VideoFrame};

/// A blocking, pull-based source of color frames.
pub trait FrameSource: Send {
    /// Block until the next frame is available.
    ///
    /// Returns `Ok(None)` once the source is exhausted.
    fn pull(&mut self) -> Result<Option<VideoFrame>, VideoError>;

    /// Release the underlying resource. Further pulls fail with
    /// `VideoError::Released`. Idempotent.
    fn release(&mut self);
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn pull(&mut self) -> Result<Option<VideoFrame>, VideoError> {
        (**self).pull()
    }

    fn release(&mut self) {
        (**self).release()
    }
}
