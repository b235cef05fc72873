use serde::Deserialize;
use serde::Serialize;

/// Top-level JSONL events emitted by `codepup-exec` while a generation
/// session runs. Derived by diffing successive snapshots, so consumers get
/// one event per observable change instead of full snapshots.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// Emitted once, when the first chunk arrives and the session leaves `idle`.
    #[serde(rename = "session.started")]
    SessionStarted(SessionStartedEvent),
    /// A file's opening tag was observed; its content is still streaming in.
    #[serde(rename = "file.started")]
    FileStarted(FileStartedEvent),
    /// A known file's reconstructed content grew.
    #[serde(rename = "file.updated")]
    FileUpdated(FileUpdatedEvent),
    /// A file's closing tag was observed; its record is final for this session.
    #[serde(rename = "file.completed")]
    FileCompleted(FileCompletedEvent),
    /// Terminal: the transport reported the generation finished.
    #[serde(rename = "session.completed")]
    SessionCompleted(SessionCompletedEvent),
    /// Terminal: the transport failed. Partial records remain valid.
    #[serde(rename = "session.failed")]
    SessionFailed(SessionFailedEvent),
    /// Terminal: the user cancelled. Partial records remain valid.
    #[serde(rename = "session.stopped")]
    SessionStopped(SessionStoppedEvent),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SessionStartedEvent {}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileStartedEvent {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileUpdatedEvent {
    pub path: String,
    /// Character length of the content reconstructed so far.
    pub size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileCompletedEvent {
    pub path: String,
    pub size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionCompletedEvent {
    pub file_count: usize,
    pub total_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionFailedEvent {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionStoppedEvent {
    pub file_count: usize,
    pub total_size: usize,
}
