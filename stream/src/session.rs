use codepup_protocol::SessionState;
use codepup_protocol::StreamSnapshot;
use tokio::sync::watch;
use tracing::debug;
use tracing::trace;
use tracing::warn;

use crate::buffer::StreamBuffer;
use crate::error::StreamError;
use crate::extract::ExtractOutcome;
use crate::extract::OpenBlock;
use crate::extract::extract;
use crate::memo::ExtractionMemo;
use crate::progress::estimate;
use crate::registry::FileRegistry;

/// One end-to-end streaming generation run.
///
/// Owns the rolling buffer, the file registry, and the extraction memo;
/// nothing is shared across sessions. Driven synchronously by a single
/// producer: `append` a chunk, read the resulting snapshot, repeat. A
/// terminal transition (`complete` / `fail` / `stop`) freezes the session —
/// later `append` calls are no-ops and the last state stays readable for
/// diagnostic display.
#[derive(Debug)]
pub struct StreamSession {
    state: SessionState,
    buffer: StreamBuffer,
    registry: FileRegistry,
    memo: ExtractionMemo,
    /// Last-known open block, latched across passes so its partial content
    /// survives even if buffer truncation later destroys the opening tag.
    open_block: Option<OpenBlock>,
    last_error: Option<StreamError>,
    snapshot_tx: watch::Sender<StreamSnapshot>,
}

impl Default for StreamSession {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamSession {
    pub fn new() -> Self {
        Self::with_buffer(StreamBuffer::new())
    }

    fn with_buffer(buffer: StreamBuffer) -> Self {
        let (snapshot_tx, _) = watch::channel(StreamSnapshot::idle());
        Self {
            state: SessionState::Idle,
            buffer,
            registry: FileRegistry::new(),
            memo: ExtractionMemo::new(),
            open_block: None,
            last_error: None,
            snapshot_tx,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Current byte length of the rolling buffer. Bounded regardless of how
    /// much total stream text has been appended.
    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn last_error(&self) -> Option<&StreamError> {
        self.last_error.as_ref()
    }

    /// Subscribes to snapshot updates. The receiver observes the latest
    /// snapshot after each processed chunk and each state transition.
    pub fn subscribe(&self) -> watch::Receiver<StreamSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> StreamSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    /// Feeds one chunk of stream text. Chunk boundaries are arbitrary; tags
    /// split across chunks are reassembled by the full-buffer re-scan.
    ///
    /// No-op after a terminal transition.
    pub fn append(&mut self, chunk: &str) {
        if self.state.is_terminal() {
            trace!(len = chunk.len(), "dropping chunk appended after terminal state");
            return;
        }
        if self.state == SessionState::Idle {
            debug!("session streaming");
            self.state = SessionState::Streaming;
        }
        self.buffer.append(chunk);
        self.process();
    }

    /// Marks the generation finished. Only the transport may decide this —
    /// stream content itself never does.
    pub fn complete(&mut self) {
        self.finalize(SessionState::Complete, None);
    }

    /// Records a transport failure. Reconstructed state stays readable.
    pub fn fail(&mut self, error: StreamError) {
        warn!(%error, "session failed");
        self.finalize(SessionState::Error, Some(error));
    }

    /// User cancellation. Safe to call at any time, including repeatedly.
    pub fn stop(&mut self) {
        self.finalize(SessionState::Stopped, None);
    }

    fn process(&mut self) {
        let outcome = match self.memo.lookup(self.buffer.contents()) {
            Some(cached) => cached,
            None => {
                let outcome = extract(self.buffer.contents());
                self.memo.store(self.buffer.contents(), &outcome);
                outcome
            }
        };

        self.registry.merge(&outcome.candidates);
        self.update_open_block(outcome.open_block.clone());
        self.buffer
            .enforce_cap(outcome.open_block.as_ref().map(|b| b.start));
        self.publish();
    }

    /// Latches the open block across passes.
    ///
    /// A pass reporting no open block means either the block just closed
    /// (its completed record now exists — drop the latch) or truncation ate
    /// the opening tag (keep the latch; its content is all that survives).
    fn update_open_block(&mut self, observed: Option<OpenBlock>) {
        if let Some(block) = observed {
            let supersedes = self.open_block.as_ref().is_none_or(|prev| {
                prev.path != block.path || block.content.len() >= prev.content.len()
            });
            if supersedes {
                self.open_block = Some(block);
            }
        }
        // A completed record always supersedes the in-progress designation.
        if let Some(prev) = &self.open_block
            && self.registry.is_complete(&prev.path)
        {
            self.open_block = None;
        }
    }

    fn finalize(&mut self, next: SessionState, error: Option<StreamError>) {
        if self.state.is_terminal() {
            trace!(?next, "ignoring transition after terminal state");
            return;
        }
        // Whatever never closed its tag is surfaced as an incomplete record
        // with its last-known content; remaining raw tail text is discarded.
        if let Some(block) = self.open_block.take()
            && !block.content.is_empty()
        {
            self.registry.commit_partial(&block.path, &block.content);
        }
        self.state = next;
        self.last_error = error;
        debug!(state = ?self.state, files = self.registry.len(), "session finalized");
        self.publish();
    }

    fn publish(&self) {
        let files = self.registry.records();
        let progress = if self.state == SessionState::Complete {
            100
        } else {
            estimate(&files, self.buffer.len())
        };
        let snapshot = StreamSnapshot {
            current_file: self
                .open_block
                .as_ref()
                .map(|b| b.path.clone())
                .filter(|_| !self.state.is_terminal()),
            total_size: self.registry.total_size(),
            progress,
            files,
            state: self.state,
        };
        self.snapshot_tx.send_replace(snapshot);
    }
}
