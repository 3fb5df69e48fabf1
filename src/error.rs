//! Error types for the storage adapter.

use std::fmt;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the storage adapter.
///
/// All store operations return `Result<T>` where `Result` is defined as
/// `std::result::Result<T, Error>`. The enum is `Clone` because errors are
/// also broadcast as out-of-band events, and `PartialEq` so listeners can
/// assert they received an error unmodified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The underlying client reported a command failure.
    ///
    /// Common causes:
    /// - Connection lost or timed out inside the client
    /// - Protocol error returned by the server
    /// - A callback-style client dropped its reply without answering
    ///
    /// **Recovery:** Retry is the caller's decision; this layer never retries.
    ClientError(String),

    /// The operation relies on a capability the client does not expose.
    ///
    /// Raised when `has()` is used against a client without `sismember`.
    ///
    /// **Recovery:** Supply a client that implements the optional command,
    /// or avoid the operation.
    NotSupported(String),

    /// Configuration error during adapter construction.
    ///
    /// Common causes:
    /// - The supplied client implements none of the supported calling
    ///   conventions
    /// - Invalid connection string or pool configuration
    ///
    /// **Recovery:** Fix configuration and reconstruct.
    ConfigError(String),

    /// Generic error with custom message.
    ///
    /// Used for errors that don't fit into other variants.
    Other(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ClientError(msg) => write!(f, "Client error: {}", msg),
            Error::NotSupported(msg) => write!(f, "Not supported: {}", msg),
            Error::ConfigError(msg) => write!(f, "Config error: {}", msg),
            Error::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ============================================================================
// Conversions from other error types
// ============================================================================

#[cfg(feature = "redis")]
impl From<redis::RedisError> for Error {
    fn from(e: redis::RedisError) -> Self {
        Error::ClientError(format!("Redis error: {}", e))
    }
}
