//! Video anomaly detection by spatiotemporal autoencoder reconstruction error.
//!
//! Color frames are normalized to grayscale, buffered into fixed-length
//! clips, and reconstructed by a convolutional LSTM autoencoder. A clip whose
//! reconstruction error exceeds a calibrated threshold is anomalous.

pub mod classifier;
pub mod config;
pub mod dataset;
pub mod detector;
pub mod error;
pub mod inference;
pub mod model;
pub mod preprocess;
pub mod score;
pub mod window;

pub use classifier::{
    Annotation, AnnotationSink, Decision, LogSink, RunSummary, Step, StreamState,
    StreamingClassifier, Verdict,
};
pub use config::{AnomalyConfig, CanonicalShape, MIN_SPATIAL_SIZE};
pub use detector::AnomalyDetector;
pub use error::{AnomalyError, Result};
pub use inference::Inference;
pub use model::{Autoencoder, TrainStep, Trainer};
pub use preprocess::preprocess;
pub use score::reconstruction_error;
pub use window::{ClipWindower, SlidingWindow};
