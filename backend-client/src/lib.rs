//! HTTP transport for CodePup generation streams.
//!
//! Opens the backend's SSE endpoint, unwraps the event envelopes, and drives
//! a [`codepup_stream::StreamSession`] with the raw chunk payloads. All
//! SSE/JSON framing stops here — the parsing core only ever sees text.

mod client;
mod config;
mod error;
mod types;

pub use client::GenerationClient;
pub use client::GenerationHandle;
pub use client::stream_from_fixture;
pub use config::BackendInfo;
pub use error::BackendError;
pub use types::GenerateRequest;
