mod cancel;
pub use cancel::*;

pub mod logging;
pub use logging::{FileLogger, StdoutLogger, init_file_logger, init_stdout_logger};

mod tensor;
pub use tensor::*;

// downstream crates can use base::log::* without their own dependency
pub use log;
