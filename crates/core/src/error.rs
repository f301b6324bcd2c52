// Error handling for the media player adapter

/// Media player error types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MediaError {
    /// Caller supplied an empty or otherwise unusable argument
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A native library call returned a failure result
    #[error("Native call failed: {0}")]
    NativeCall(String),

    /// Operation not valid in the current player state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The native library could not be loaded or initialized
    #[error("Library error: {0}")]
    Library(String),
}

/// Result type alias for media operations
pub type Result<T> = std::result::Result<T, MediaError>;
