//! Error types for pipelink transports.

use thiserror::Error;

/// Main error type for all transport operations.
///
/// OS-level failures (connect refused, bind conflicts, permission errors)
/// are carried verbatim in [`TransportError::Io`] so callers can inspect
/// the underlying [`std::io::ErrorKind`] and decide whether a failure is
/// transient. This crate never retries on its own.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Unrecognized option name, or a write to a read-only option.
    #[error("invalid or unsupported option")]
    BadOption,

    /// Recognized option, but the supplied value has the wrong type.
    #[error("invalid option value")]
    BadValue,

    /// Address scheme mismatch or malformed address string.
    #[error("invalid address")]
    BadAddress,

    /// Accept attempted on a listener with no live bound endpoint.
    #[error("listener is not listening")]
    NotListening,

    /// Listen on an already-listening listener, or a pre-listen option
    /// set after the endpoint was bound.
    #[error("listener is already listening")]
    AlreadyListening,

    /// The endpoint was closed while an operation was pending on it.
    #[error("endpoint is closed")]
    Closed,

    /// I/O error from the underlying byte-stream provider, unmodified.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using TransportError.
pub type Result<T> = std::result::Result<T, TransportError>;
