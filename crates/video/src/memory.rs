use {
    crate::{FrameSource, VideoError, VideoFrame},
    image::Image,
    std::collections::VecDeque,
};

/// Frame source over frames already held in memory.
#[derive(Debug, Default)]
pub struct MemorySource {
    frames: VecDeque<Image>,
    next_index: u64,
    released: bool,
}

impl MemorySource {
    pub fn new(frames: impl IntoIterator<Item = Image>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            next_index: 0,
            released: false,
        }
    }

    /// Frames not yet pulled.
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl FrameSource for MemorySource {
    fn pull(&mut self) -> Result<Option<VideoFrame>, VideoError> {
        if self.released {
            return Err(VideoError::Released);
        }
        Ok(self.frames.pop_front().map(|color| {
            let index = self.next_index;
            self.next_index += 1;
            VideoFrame { index, color }
        }))
    }

    fn release(&mut self) {
        if !self.released {
            log::debug!("memory source released with {} frames left", self.frames.len());
        }
        self.frames.clear();
        self.released = true;
    }
}
