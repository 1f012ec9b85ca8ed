//! Error types for the panel probe library.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while preparing and encoding images.
#[derive(Error, Debug)]
pub enum Error {
    /// Source file could not be decoded as an image.
    #[error("Failed to decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// No input images were found and no test pattern could be written.
    #[error("No input images in {} and test pattern could not be written", .0.display())]
    EmptyInput(PathBuf),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Mode index outside 0-7 or unparsable.
    #[error("Invalid mode (must be 0-7): {0}")]
    InvalidMode(String),

    /// Zero target width or height.
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// RAW buffer size mismatch.
    #[error("RAW buffer size mismatch: expected {expected}, got {actual}")]
    BufferSize { expected: usize, actual: usize },
}
