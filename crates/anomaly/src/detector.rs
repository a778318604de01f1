use {
    crate::{AnomalyError, Result, Step, StreamState, StreamingClassifier},
    futures_core::Stream,
    futures_sink::Sink,
    image::Image,
    std::{
        collections::VecDeque,
        fmt,
        future::Future,
        pin::Pin,
        sync::{Arc, Mutex},
        task::{Context, Poll, Waker},
    },
};

/// Async adapter around a `StreamingClassifier`.
///
/// Implements `Sink<Image>` to accept frames and
/// `Stream<Item = Result<Step>>` to yield the outcome of each one.
///
/// Each `Image` sent via the Sink maps 1:1 to a `Step` yielded from the
/// Stream, in arrival order. Closing the sink signals no more input; the
/// stream ends once all pending frames are processed, and the classifier is
/// then terminated.
pub struct AnomalyDetector {
    classifier: Arc<Mutex<StreamingClassifier>>,
    pending: VecDeque<Image>,
    closed: bool,
    inflight: Option<Pin<Box<dyn Future<Output = Result<Step>> + Send>>>,
    stream_waker: Option<Waker>,
}

impl fmt::Debug for AnomalyDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnomalyDetector")
            .field("pending", &self.pending.len())
            .field("closed", &self.closed)
            .field("inflight", &self.inflight.is_some())
            .finish()
    }
}

impl AnomalyDetector {
    pub fn new(classifier: StreamingClassifier) -> Self {
        Self {
            classifier: Arc::new(Mutex::new(classifier)),
            pending: VecDeque::new(),
            closed: false,
            inflight: None,
            stream_waker: None,
        }
    }

    pub fn state(&self) -> StreamState {
        self.classifier.lock().unwrap_or_else(|e| e.into_inner()).state()
    }

    /// Spawn processing of the given frame as an inflight future.
    fn start_step(&mut self, image: Image) {
        let classifier = Arc::clone(&self.classifier);
        self.inflight = Some(Box::pin(async move {
            tokio::task::spawn_blocking(move || {
                let mut classifier = classifier.lock().unwrap_or_else(|e| e.into_inner());
                classifier.push_frame(&image)
            })
            .await
            .map_err(|e| AnomalyError::Runtime(format!("classifier task failed: {e}")))?
        }));
    }

    fn poll_inflight(&mut self, cx: &mut Context<'_>) -> Poll<Option<Result<Step>>> {
        match self.inflight.as_mut() {
            Some(fut) => match fut.as_mut().poll(cx) {
                Poll::Ready(result) => {
                    self.inflight = None;
                    Poll::Ready(Some(result))
                }
                Poll::Pending => Poll::Pending,
            },
            None => Poll::Ready(None),
        }
    }
}

impl Sink<Image> for AnomalyDetector {
    type Error = AnomalyError;

    fn poll_ready(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        if self.closed {
            return Poll::Ready(Err(AnomalyError::Terminated));
        }
        Poll::Ready(Ok(()))
    }

    fn start_send(self: Pin<&mut Self>, item: Image) -> Result<()> {
        let this = self.get_mut();
        if this.closed {
            return Err(AnomalyError::Terminated);
        }
        this.pending.push_back(item);
        if let Some(waker) = this.stream_waker.take() {
            waker.wake();
        }
        Ok(())
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        let this = self.get_mut();
        this.closed = true;
        if let Some(waker) = this.stream_waker.take() {
            waker.wake();
        }
        Poll::Ready(Ok(()))
    }
}

impl Stream for AnomalyDetector {
    type Item = Result<Step>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if this.inflight.is_some() {
            return this.poll_inflight(cx);
        }

        if let Some(image) = this.pending.pop_front() {
            this.start_step(image);
            return this.poll_inflight(cx);
        }

        if this.closed {
            this.classifier.lock().unwrap_or_else(|e| e.into_inner()).terminate();
            return Poll::Ready(None);
        }

        this.stream_waker = Some(cx.waker().clone());
        Poll::Pending
    }
}
