use {
    crate::{
        AnomalyConfig, AnomalyError, Autoencoder, Result, SlidingWindow, preprocess,
        reconstruction_error,
    },
    base::CancelToken,
    candle_core::Tensor as CanTensor,
    image::Image,
    std::{fmt, sync::Arc},
    video::{FrameSource, VideoFrame},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Fewer than `frames` frames buffered; nothing is scored yet.
    Filling,
    Ready,
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Normal,
    Anomalous,
}

impl Verdict {
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Normal => "Normal",
            Verdict::Anomalous => "Anomalous",
        }
    }

    pub fn is_anomalous(&self) -> bool {
        matches!(self, Verdict::Anomalous)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Verdict for the window ending at `frame_index`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    /// Zero-based position of the newest frame in the window.
    pub frame_index: u64,
    pub verdict: Verdict,
    pub score: f32,
}

impl Decision {
    pub fn annotation(&self) -> Annotation {
        Annotation {
            label: self.verdict.label().to_string(),
            highlight: self.verdict.is_anomalous(),
            score: self.score,
        }
    }
}

/// Outcome of pushing one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Window still filling.
    NotReady,
    /// Window full, but this frame falls between strides.
    Skipped,
    Scored(Decision),
}

/// What a display collaborator needs to mark a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub label: String,
    pub highlight: bool,
    pub score: f32,
}

/// Receives one annotation per scored frame.
pub trait AnnotationSink {
    fn annotate(&mut self, frame: &VideoFrame, annotation: &Annotation);
}

impl<F: FnMut(&VideoFrame, &Annotation)> AnnotationSink for F {
    fn annotate(&mut self, frame: &VideoFrame, annotation: &Annotation) {
        self(frame, annotation)
    }
}

/// Writes annotations to the global logger.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl AnnotationSink for LogSink {
    fn annotate(&mut self, frame: &VideoFrame, annotation: &Annotation) {
        let (index, label, score) = (frame.index, &annotation.label, annotation.score);
        if annotation.highlight {
            log::warn!("frame {index}: {label} (score {score:.6})");
        } else {
            log::info!("frame {index}: {label} (score {score:.6})");
        }
    }
}

/// Counters for one `run`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Frames pulled from the source.
    pub frames: u64,
    pub scored: u64,
    pub anomalous: u64,
    /// Frames dropped as `InvalidFrame`.
    pub rejected: u64,
    pub canceled: bool,
}

/// One-frame-at-a-time anomaly classifier.
///
/// Keeps the most recent `frames` preprocessed frames and, once the window is
/// full, scores every `stride`-th frame by the reconstruction error of the
/// window. A score strictly above the threshold is `Anomalous`.
pub struct StreamingClassifier {
    model: Arc<Autoencoder>,
    window: SlidingWindow,
    threshold: f32,
    stride: usize,
    state: StreamState,
    position: u64,
    since_ready: u64,
}

impl fmt::Debug for StreamingClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamingClassifier")
            .field("shape", self.model.shape())
            .field("threshold", &self.threshold)
            .field("stride", &self.stride)
            .field("state", &self.state)
            .field("window", &self.window.len())
            .field("position", &self.position)
            .finish()
    }
}

impl StreamingClassifier {
    pub fn new(model: Arc<Autoencoder>, config: &AnomalyConfig) -> Result<Self> {
        config.validate()?;
        if config.shape != *model.shape() {
            return Err(AnomalyError::InvalidShape(format!(
                "config shape {:?} does not match model shape {:?}",
                config.shape.dims(),
                model.shape().dims()
            )));
        }
        let window = SlidingWindow::new(config.shape, model.device())?;
        Ok(Self {
            model,
            window,
            threshold: config.threshold,
            stride: config.stride,
            state: StreamState::Filling,
            position: 0,
            since_ready: 0,
        })
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn window(&self) -> &SlidingWindow {
        &self.window
    }

    pub fn model(&self) -> &Arc<Autoencoder> {
        &self.model
    }

    /// Preprocess one color frame, slide the window, and score if due.
    ///
    /// Frames rejected with `InvalidFrame` never enter the window but still
    /// advance the frame position.
    pub fn push_frame(&mut self, image: &Image) -> Result<Step> {
        if self.state == StreamState::Terminated {
            return Err(AnomalyError::Terminated);
        }
        let frame_index = self.position;
        self.position += 1;

        let shape = self.model.shape();
        let frame = preprocess(image, shape.height, shape.width)?;
        self.window.push(frame)?;
        if !self.window.is_ready() {
            return Ok(Step::NotReady);
        }
        if self.state == StreamState::Filling {
            log::info!(
                "window filled at frame {frame_index}, scoring every {} frame(s)",
                self.stride
            );
            self.state = StreamState::Ready;
            self.since_ready = 0;
        }

        let due = self.since_ready % self.stride as u64 == 0;
        self.since_ready += 1;
        if !due {
            return Ok(Step::Skipped);
        }

        let clip = self
            .window
            .clip()?
            .ok_or_else(|| AnomalyError::Runtime("full window produced no clip".to_string()))?;
        let score = self.score_clip(&clip)?;
        let verdict = if score > self.threshold {
            Verdict::Anomalous
        } else {
            Verdict::Normal
        };
        log::debug!("frame {frame_index}: score {score:.6} -> {verdict}");
        Ok(Step::Scored(Decision {
            frame_index,
            verdict,
            score,
        }))
    }

    fn score_clip(&self, clip: &CanTensor) -> Result<f32> {
        let reconstruction = self.model.reconstruct(clip)?;
        reconstruction_error(clip, &reconstruction)
    }

    /// Stop scoring and drop the buffered frames. Idempotent.
    pub fn terminate(&mut self) {
        if self.state != StreamState::Terminated {
            log::debug!("classifier terminated after {} frames", self.position);
        }
        self.state = StreamState::Terminated;
        self.window.clear();
    }

    /// Drive the classifier from `source` until it is exhausted, fails, or
    /// `cancel` is tripped.
    ///
    /// The source is released and the classifier terminated on every exit
    /// path. Cancellation is a normal return with `canceled` set.
    pub fn run<S, K>(
        &mut self,
        source: &mut S,
        sink: &mut K,
        cancel: &CancelToken,
    ) -> Result<RunSummary>
    where
        S: FrameSource + ?Sized,
        K: AnnotationSink + ?Sized,
    {
        let mut summary = RunSummary::default();
        log::info!("stream started (threshold {}, stride {})", self.threshold, self.stride);

        let outcome = loop {
            if cancel.is_canceled() {
                log::info!("stream canceled after {} frames", summary.frames);
                summary.canceled = true;
                break Ok(());
            }
            let frame = match source.pull() {
                Ok(Some(frame)) => frame,
                Ok(None) => break Ok(()),
                Err(e) => break Err(AnomalyError::from(e)),
            };
            summary.frames += 1;

            match self.push_frame(&frame.color) {
                Ok(Step::Scored(decision)) => {
                    summary.scored += 1;
                    if decision.verdict.is_anomalous() {
                        summary.anomalous += 1;
                    }
                    sink.annotate(&frame, &decision.annotation());
                }
                Ok(Step::NotReady | Step::Skipped) => {}
                Err(AnomalyError::InvalidFrame(msg)) => {
                    log::warn!("skipping frame {}: {msg}", frame.index);
                    summary.rejected += 1;
                }
                Err(e) => break Err(e),
            }
        };

        source.release();
        self.terminate();
        if let Err(e) = &outcome {
            log::error!("stream stopped: {e}");
        } else {
            log::info!(
                "stream ended: {} frames, {} scored, {} anomalous, {} rejected",
                summary.frames,
                summary.scored,
                summary.anomalous,
                summary.rejected
            );
        }
        outcome.map(|_| summary)
    }
}
