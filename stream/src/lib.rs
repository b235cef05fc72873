//! Streaming code-ingestion and incremental file-state reconstruction.
//!
//! The engine consumes a continuous text stream containing XML-tagged
//! `<file path="...">...</file>` blocks and incrementally reconstructs a
//! de-duplicated, completion-tracked view of a multi-file project tree,
//! without knowing in advance how many files exist, how large they are, or
//! when a given file is done. Committed file state lives in the registry and
//! survives truncation of the raw rolling buffer.

// Prevent accidental direct writes to stdout/stderr in library code. All
// user-visible output must go through the tracing stack or the caller.
#![deny(clippy::print_stdout, clippy::print_stderr)]

mod buffer;
pub mod error;
mod extract;
mod memo;
mod progress;
mod registry;
pub mod session;
pub mod tree;

pub use codepup_protocol::FileRecord;
pub use codepup_protocol::SessionState;
pub use codepup_protocol::StreamSnapshot;
pub use error::StreamError;
pub use session::StreamSession;
pub use tree::FileCursor;
pub use tree::FileTree;
pub use tree::TreeNode;
pub use tree::TreeNodeKind;
