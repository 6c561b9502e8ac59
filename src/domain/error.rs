use thiserror::Error;

use crate::app::ConfigError;
use crate::app::logging_system::LoggingError;
use crate::runner::RunError;

/// Top-level error type for a rotator run.
///
/// Only configuration problems and the fatal-to-run proxy conditions reach
/// this type; per-song failures are absorbed by the processor.
#[derive(Error, Debug)]
pub enum RotatorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    #[error("Run error: {0}")]
    Run(#[from] RunError),
}
