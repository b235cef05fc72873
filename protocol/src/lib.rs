//! Shared data model for the CodePup streaming engine.
//!
//! Everything in this crate is plain data: the file records reconstructed
//! from a generation stream, the immutable snapshots handed to renderers,
//! and the JSONL event taxonomy emitted by the exec front-end.

mod events;
mod models;
mod path;

pub use events::FileCompletedEvent;
pub use events::FileStartedEvent;
pub use events::FileUpdatedEvent;
pub use events::SessionCompletedEvent;
pub use events::SessionEvent;
pub use events::SessionFailedEvent;
pub use events::SessionStartedEvent;
pub use events::SessionStoppedEvent;
pub use models::CandidateFile;
pub use models::FileRecord;
pub use models::SessionState;
pub use models::StreamSnapshot;
pub use path::MAX_PATH_LEN;
pub use path::normalize_path;
