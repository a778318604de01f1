use std::fmt;

#[derive(Debug)]
pub enum AnomalyError {
    /// Canonical shape, clip or stored parameter shape is not what the model expects.
    InvalidShape(String),
    /// Frame is empty or degenerate (zero variance) and cannot be normalized.
    InvalidFrame(String),
    /// Dataset name is empty, has the wrong extension, or does not resolve to a file.
    InvalidSourceName(String),
    InvalidConfig(String),
    /// The classifier already reached its terminal state.
    Terminated,
    Candle(String),
    Io(String),
    Source(video::VideoError),
    Runtime(String),
}

pub type Result<T> = std::result::Result<T, AnomalyError>;

impl fmt::Display for AnomalyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnomalyError::InvalidShape(msg) => write!(f, "invalid shape: {msg}"),
            AnomalyError::InvalidFrame(msg) => write!(f, "invalid frame: {msg}"),
            AnomalyError::InvalidSourceName(msg) => write!(f, "invalid source name: {msg}"),
            AnomalyError::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            AnomalyError::Terminated => write!(f, "classifier is terminated"),
            AnomalyError::Candle(msg) => write!(f, "candle error: {msg}"),
            AnomalyError::Io(msg) => write!(f, "io error: {msg}"),
            AnomalyError::Source(err) => write!(f, "frame source error: {err}"),
            AnomalyError::Runtime(msg) => write!(f, "runtime error: {msg}"),
        }
    }
}

impl std::error::Error for AnomalyError {}

impl From<candle_core::Error> for AnomalyError {
    fn from(err: candle_core::Error) -> Self {
        AnomalyError::Candle(err.to_string())
    }
}

impl From<std::io::Error> for AnomalyError {
    fn from(err: std::io::Error) -> Self {
        AnomalyError::Io(err.to_string())
    }
}

impl From<video::VideoError> for AnomalyError {
    fn from(err: video::VideoError) -> Self {
        AnomalyError::Source(err)
    }
}

impl From<base::TensorError> for AnomalyError {
    fn from(err: base::TensorError) -> Self {
        AnomalyError::InvalidShape(err.to_string())
    }
}

impl From<safetensors::SafeTensorError> for AnomalyError {
    fn from(err: safetensors::SafeTensorError) -> Self {
        AnomalyError::Io(format!("safetensors: {err}"))
    }
}

impl From<serde_json::Error> for AnomalyError {
    fn from(err: serde_json::Error) -> Self {
        AnomalyError::InvalidConfig(err.to_string())
    }
}
