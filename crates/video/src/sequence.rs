use {
    crate::{FrameSource, VideoError, VideoFrame},
    std::{
        collections::VecDeque,
        path::{Path, PathBuf},
    },
};

const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "tif", "tiff", "webp"];

/// Frame source over a directory of still images, read in file-name order.
#[derive(Debug)]
pub struct ImageSequence {
    dir: PathBuf,
    paths: VecDeque<PathBuf>,
    next_index: u64,
    released: bool,
}

fn is_frame_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| FRAME_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false)
}

impl ImageSequence {
    /// Scan `dir` for image files. Fails if the directory cannot be read or
    /// holds no frames.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, VideoError> {
        let dir = dir.as_ref().to_path_buf();
        let mut paths = std::fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| is_frame_file(path))
            .collect::<Vec<_>>();
        if paths.is_empty() {
            return Err(VideoError::Device(format!(
                "no image frames found in {}",
                dir.display()
            )));
        }
        paths.sort();
        log::info!("image sequence: {} frames in {}", paths.len(), dir.display());
        Ok(Self {
            dir,
            paths: paths.into(),
            next_index: 0,
            released: false,
        })
    }

    pub fn remaining(&self) -> usize {
        self.paths.len()
    }
}

impl FrameSource for ImageSequence {
    fn pull(&mut self) -> Result<Option<VideoFrame>, VideoError> {
        if self.released {
            return Err(VideoError::Released);
        }
        let Some(path) = self.paths.pop_front() else {
            return Ok(None);
        };
        let bytes = std::fs::read(&path)?;
        let color = image::decode(&bytes)?;
        let index = self.next_index;
        self.next_index += 1;
        Ok(Some(VideoFrame { index, color }))
    }

    fn release(&mut self) {
        if !self.released {
            log::info!("image sequence: released {}", self.dir.display());
        }
        self.paths.clear();
        self.released = true;
    }
}
