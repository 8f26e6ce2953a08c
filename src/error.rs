//! Error types for the editor engine

use thiserror::Error;

/// Result type alias for editor operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the editor engine
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// The rasterizer rejected or failed the capture
    #[error("Capture failed: {0}")]
    CaptureError(String),

    /// Encoding the bitmap to PNG/JPEG failed
    #[error("Encoding failed: {0}")]
    EncodeError(String),

    /// The size-driven scale search exhausted its passes without
    /// producing an encoding under the ceiling
    #[error("Export of {bytes} bytes exceeds the {ceiling} byte ceiling at every tested scale")]
    ExportTooLarge { bytes: usize, ceiling: usize },

    /// A second export was requested while one is in flight
    #[error("An export is already in progress")]
    ExportInProgress,

    /// The export deadline elapsed before the capture settled
    #[error("Export timed out after {0}ms")]
    Timeout(u64),

    /// Background asset download failure
    #[cfg(feature = "fetch")]
    #[error("Asset fetch failed: {0}")]
    FetchError(String),

    /// Writing the exported artifact to disk failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
