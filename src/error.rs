//! Error types for the measurement pipeline

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while decoding or analysing audio
#[derive(Error, Debug, Clone)]
pub enum AnalysisError {
    /// Invalid input parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Audio decoding error (unreadable, unsupported or corrupt source)
    #[error("Decoding error: {0}")]
    DecodingError(String),

    /// Processing error during analysis
    #[error("Processing error: {0}")]
    ProcessingError(String),

    /// The detection worker crashed, vanished or returned a malformed payload
    #[error("Computation fault: {0}")]
    ComputationFault(String),

    /// The detection worker did not answer in time
    #[error("Detection timed out after {0:?}")]
    Timeout(Duration),
}

impl From<std::io::Error> for AnalysisError {
    fn from(err: std::io::Error) -> Self {
        Self::DecodingError(err.to_string())
    }
}

impl From<symphonia::core::errors::Error> for AnalysisError {
    fn from(err: symphonia::core::errors::Error) -> Self {
        Self::DecodingError(err.to_string())
    }
}

impl From<ebur128::Error> for AnalysisError {
    fn from(err: ebur128::Error) -> Self {
        Self::ProcessingError(format!("EBU R128 analysis failed: {:?}", err))
    }
}
