use thiserror::Error;

/// Failures a transport can report into a session.
///
/// None of these originate inside the parsing core — malformed blocks and
/// invalid paths are skipped silently. A `StreamError` always marks the end
/// of a session; the registry keeps whatever was reconstructed before it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StreamError {
    #[error("stream transport failed: {0}")]
    Transport(String),
    #[error("idle timeout waiting for stream data")]
    IdleTimeout,
    #[error("stream closed before the completion signal")]
    ClosedBeforeComplete,
    #[error("backend reported an error: {0}")]
    Backend(String),
}
