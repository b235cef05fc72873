use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

/// Wait this long for the next stream event before treating the backend as
/// disconnected.
const DEFAULT_STREAM_IDLE_TIMEOUT_MS: u64 = 120_000;

/// Where and how to reach the generation backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendInfo {
    /// Base URL, e.g. `https://api.codepup.dev`. Trailing slashes are
    /// stripped for consistent URL building.
    pub base_url: String,
    /// Idle timeout in milliseconds while waiting for stream data.
    pub stream_idle_timeout_ms: Option<u64>,
}

impl BackendInfo {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            stream_idle_timeout_ms: None,
        }
    }

    #[must_use]
    pub fn stream_idle_timeout(&self) -> Duration {
        Duration::from_millis(
            self.stream_idle_timeout_ms
                .unwrap_or(DEFAULT_STREAM_IDLE_TIMEOUT_MS),
        )
    }

    #[must_use]
    pub fn generate_stream_url(&self) -> String {
        format!("{}/api/generate/stream", self.base_url)
    }
}
