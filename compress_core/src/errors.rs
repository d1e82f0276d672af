//! Engine Error Types
//!
//! Fatal failures only. Remote-service and predictor failures degrade to
//! local fallbacks inside the engine and never surface here.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompressError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CompressError>;
