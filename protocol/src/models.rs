use serde::Deserialize;
use serde::Serialize;

/// Lifecycle of one streaming generation session.
///
/// `Complete`, `Error` and `Stopped` are terminal: once entered, the session
/// ignores further input. The transition into a terminal state is always
/// driven out-of-band (transport signal or user cancellation) — the stream
/// content itself never decides that the backend is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Streaming,
    Complete,
    Error,
    Stopped,
}

impl SessionState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionState::Complete | SessionState::Error | SessionState::Stopped
        )
    }
}

/// A closed `<file path="...">...</file>` block lifted out of the buffer by
/// one extraction pass. Not yet merged into the authoritative registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    /// Normalized forward-slash path relative to the project root.
    pub path: String,
    /// The raw text between the opening and closing tags.
    pub content: String,
}

/// The latest known state of one generated file.
///
/// Keyed by `filename` in the registry: there is exactly one record per
/// normalized path at any time, and its content only ever grows within a
/// session (longer candidates supersede shorter ones, never the reverse).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub filename: String,
    pub content: String,
    /// True once a matching closing tag has been observed for this path.
    pub is_complete: bool,
}

impl FileRecord {
    /// Character length of the reconstructed content. Derived, never stored.
    #[must_use]
    pub fn size(&self) -> usize {
        self.content.len()
    }
}

/// Immutable point-in-time readout of a session, produced after each
/// processed chunk. Consumers never mutate a snapshot in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamSnapshot {
    pub files: Vec<FileRecord>,
    /// Path of the file whose opening tag has been seen but not yet closed,
    /// if any. At most one at a time.
    pub current_file: Option<String>,
    /// Advisory completion estimate in `0..=100`.
    pub progress: u8,
    /// Total character count across all registry records.
    pub total_size: usize,
    pub state: SessionState,
}

impl StreamSnapshot {
    /// The empty snapshot of a session that has not seen any input.
    #[must_use]
    pub fn idle() -> Self {
        Self {
            files: Vec::new(),
            current_file: None,
            progress: 0,
            total_size: 0,
            state: SessionState::Idle,
        }
    }

    #[must_use]
    pub fn completed_file_count(&self) -> usize {
        self.files.iter().filter(|f| f.is_complete).count()
    }
}
