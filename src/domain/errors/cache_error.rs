//! Cache error types.

/// Result type for cache operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Errors that can occur during cache operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    /// Failed to decode image.
    #[error("Decode error: {0}")]
    DecodeError(String),
    /// Failed to re-encode image for the disk tier.
    #[error("Encode error: {0}")]
    EncodeError(String),
    /// I/O error during cache operation.
    #[error("IO error: {0}")]
    IoError(String),
}
