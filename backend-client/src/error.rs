use reqwest::StatusCode;
use thiserror::Error;

/// Request-level failures raised before a stream starts flowing.
///
/// Failures after that point do not surface here: they drive the session
/// into its `error` state so partial results stay observable.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus { status: StatusCode, body: String },
    #[error("failed to read fixture: {0}")]
    Fixture(#[from] std::io::Error),
}
