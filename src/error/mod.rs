use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Anthropic error: {0}")]
    Anthropic(#[from] AnthropicError),

    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Anthropic API errors
#[derive(Debug, Error)]
pub enum AnthropicError {
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Streaming session errors.
///
/// Surfaced exactly once per session as a terminal failure event; the core
/// never retries a failed stream (retry is the caller's decision).
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("Producer failed: {message}")]
    Producer { message: String },

    #[error("Stream transport error: {0}")]
    Transport(#[from] AnthropicError),
}

/// Snapshot import/export errors
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Invalid snapshot format: expected \"{expected}\", found \"{found}\"")]
    InvalidFormat { expected: String, found: String },

    #[error("Unsupported snapshot version: expected {expected}, found {found}")]
    UnsupportedVersion { expected: u32, found: u32 },

    #[error("Malformed snapshot: {message}")]
    Malformed { message: String },

    #[error("Snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for SnapshotError {
    fn from(err: serde_json::Error) -> Self {
        SnapshotError::Malformed {
            message: err.to_string(),
        }
    }
}

/// Phase-driver errors with structured details
#[derive(Debug, Error)]
pub enum PhaseError {
    #[error("Precondition failed: {message}")]
    Precondition { message: String },

    #[error("Unknown node: {node_id}")]
    UnknownNode { node_id: String },
}

impl From<PhaseError> for AppError {
    fn from(err: PhaseError) -> Self {
        AppError::Internal {
            message: err.to_string(),
        }
    }
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for Anthropic operations
pub type AnthropicResult<T> = Result<T, AnthropicError>;

/// Result type alias for streaming operations
pub type StreamResult<T> = Result<T, StreamError>;

/// Result type alias for snapshot operations
pub type SnapshotResult<T> = Result<T, SnapshotError>;
