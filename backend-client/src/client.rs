use std::convert::Infallible;
use std::fmt::Display;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use codepup_protocol::StreamSnapshot;
use codepup_stream::StreamError;
use codepup_stream::StreamSession;
use eventsource_stream::Eventsource;
use futures::Stream;
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::trace;
use tracing::warn;

use crate::config::BackendInfo;
use crate::error::BackendError;
use crate::types::GenerateRequest;
use crate::types::StreamEnvelope;

/// Chunk size used when replaying a fixture file, deliberately small so the
/// replay exercises the same split-tag reassembly as a real network stream.
const FIXTURE_CHUNK_SIZE: usize = 64;

/// Client for the backend's streaming generation endpoint.
#[derive(Debug, Clone)]
pub struct GenerationClient {
    info: BackendInfo,
    client: reqwest::Client,
}

impl GenerationClient {
    pub fn new(info: BackendInfo) -> Self {
        Self {
            info,
            client: reqwest::Client::new(),
        }
    }

    /// Starts a generation and returns a handle to the running session.
    ///
    /// Request-level failures (connection refused, non-2xx) surface as
    /// `BackendError`; anything after the stream starts flowing instead
    /// drives the session into a terminal state.
    pub async fn stream_generation(
        &self,
        request: &GenerateRequest,
    ) -> Result<GenerationHandle, BackendError> {
        let response = self
            .client
            .post(self.info.generate_stream_url())
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::UnexpectedStatus { status, body });
        }

        Ok(spawn_session(
            response.bytes_stream(),
            self.info.stream_idle_timeout(),
        ))
    }
}

/// Replays a recorded SSE exchange from disk as if it were a live stream.
pub async fn stream_from_fixture(path: impl AsRef<Path>) -> Result<GenerationHandle, BackendError> {
    let text = tokio::fs::read_to_string(path).await?;
    let chunks: Vec<Result<Bytes, Infallible>> = text
        .as_bytes()
        .chunks(FIXTURE_CHUNK_SIZE)
        .map(|c| Ok(Bytes::copy_from_slice(c)))
        .collect();
    Ok(spawn_session(
        futures::stream::iter(chunks),
        Duration::from_secs(30),
    ))
}

/// A running generation session plus the means to observe and cancel it.
#[derive(Debug)]
pub struct GenerationHandle {
    session: Arc<Mutex<StreamSession>>,
    snapshots: watch::Receiver<StreamSnapshot>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl GenerationHandle {
    /// A watch receiver that observes every published snapshot.
    #[must_use]
    pub fn snapshots(&self) -> watch::Receiver<StreamSnapshot> {
        self.snapshots.clone()
    }

    /// The latest snapshot, without waiting.
    #[must_use]
    pub fn snapshot(&self) -> StreamSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Requests cancellation. Safe at any time; the session transitions to
    /// `stopped` and keeps whatever was reconstructed.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub async fn last_error(&self) -> Option<StreamError> {
        self.session.lock().await.last_error().cloned()
    }

    /// Waits for the stream to reach a terminal state and returns the final
    /// snapshot.
    pub async fn wait(self) -> StreamSnapshot {
        if let Err(e) = self.task.await {
            warn!("stream processing task failed: {e}");
        }
        self.snapshots.borrow().clone()
    }
}

fn spawn_session<S, E>(stream: S, idle_timeout: Duration) -> GenerationHandle
where
    S: Stream<Item = Result<Bytes, E>> + Unpin + Send + 'static,
    E: Display + Send + 'static,
{
    let session = StreamSession::new();
    let snapshots = session.subscribe();
    let session = Arc::new(Mutex::new(session));
    let cancel = CancellationToken::new();
    let task = tokio::spawn(process_generation(
        stream,
        Arc::clone(&session),
        idle_timeout,
        cancel.clone(),
    ));
    GenerationHandle {
        session,
        snapshots,
        cancel,
        task,
    }
}

/// Pull loop over the SSE stream.
///
/// Unwraps each event's JSON envelope and forwards only `chunk` payload text
/// into the session. Unparseable events are skipped and the stream
/// continues; transport-level trouble (stream error, silent disconnect,
/// close without a completion signal) finalizes the session instead.
async fn process_generation<S, E>(
    stream: S,
    session: Arc<Mutex<StreamSession>>,
    idle_timeout: Duration,
    cancel: CancellationToken,
) where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Display,
{
    let mut stream = stream.eventsource();

    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => {
                session.lock().await.stop();
                return;
            }
            next = timeout(idle_timeout, stream.next()) => next,
        };

        let sse = match next {
            Ok(Some(Ok(sse))) => sse,
            Ok(Some(Err(e))) => {
                debug!("SSE error: {e}");
                session
                    .lock()
                    .await
                    .fail(StreamError::Transport(e.to_string()));
                return;
            }
            Ok(None) => {
                session.lock().await.fail(StreamError::ClosedBeforeComplete);
                return;
            }
            Err(_) => {
                session.lock().await.fail(StreamError::IdleTimeout);
                return;
            }
        };

        trace!("stream event: {}", sse.data);
        let envelope: StreamEnvelope = match serde_json::from_str(&sse.data) {
            Ok(envelope) => envelope,
            Err(e) => {
                debug!("failed to parse stream envelope: {e}, data: {}", sse.data);
                continue;
            }
        };

        match envelope.kind.as_str() {
            "chunk" => {
                if let Some(content) = envelope.content {
                    session.lock().await.append(&content);
                }
            }
            "complete" => {
                session.lock().await.complete();
                return;
            }
            "error" => {
                let message = envelope
                    .message
                    .unwrap_or_else(|| "backend reported an unspecified error".to_string());
                session.lock().await.fail(StreamError::Backend(message));
                return;
            }
            other => {
                debug!(kind = other, "ignoring stream event");
            }
        }
    }
}
