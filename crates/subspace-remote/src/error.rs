use thiserror::Error;

/// Errors raised by remote-service implementations.
///
/// The coordinator treats all of them as transient: a failed fetch or write
/// is logged and surfaced to the caller as `None` / `false`, and the cache
/// keeps its last known-good state.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// The entity does not exist on the remote service.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request never reached the service, or the response never came
    /// back (timeouts, connection resets, rate limiting).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service received the write and refused it.
    #[error("Rejected: {0}")]
    Rejected(String),

    /// The response could not be interpreted.
    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RemoteError>;
