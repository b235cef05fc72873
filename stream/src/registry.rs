use codepup_protocol::CandidateFile;
use codepup_protocol::FileRecord;
use indexmap::IndexMap;
use tracing::trace;

/// Authoritative map from normalized filename to its latest known state.
///
/// Monotonic within a session: merging can only add records or grow their
/// content, never shrink or delete. Because the extractor re-scans the whole
/// buffer on every pass, `merge` must be idempotent — feeding it the same
/// candidate set twice is a no-op.
#[derive(Debug, Default)]
pub(crate) struct FileRegistry {
    records: IndexMap<String, FileRecord>,
}

impl FileRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Merges one extraction pass's closed blocks. Returns true if anything
    /// changed.
    pub(crate) fn merge(&mut self, candidates: &[CandidateFile]) -> bool {
        let mut changed = false;
        for candidate in candidates {
            match self.records.get_mut(&candidate.path) {
                None => {
                    trace!(path = %candidate.path, size = candidate.content.len(), "file completed");
                    self.records.insert(
                        candidate.path.clone(),
                        FileRecord {
                            filename: candidate.path.clone(),
                            content: candidate.content.clone(),
                            is_complete: true,
                        },
                    );
                    changed = true;
                }
                Some(existing) if candidate.content.len() > existing.content.len() => {
                    trace!(path = %candidate.path, size = candidate.content.len(), "file grew");
                    existing.content = candidate.content.clone();
                    existing.is_complete = true;
                    changed = true;
                }
                Some(_) => {}
            }
        }
        changed
    }

    /// Commits an unterminated block's partial content at session end.
    ///
    /// Never downgrades a completed record and never shrinks content; only
    /// inserts a new incomplete record or grows an existing incomplete one.
    pub(crate) fn commit_partial(&mut self, path: &str, content: &str) -> bool {
        match self.records.get_mut(path) {
            None => {
                self.records.insert(
                    path.to_string(),
                    FileRecord {
                        filename: path.to_string(),
                        content: content.to_string(),
                        is_complete: false,
                    },
                );
                true
            }
            Some(existing) if !existing.is_complete && content.len() > existing.content.len() => {
                existing.content = content.to_string();
                true
            }
            Some(_) => false,
        }
    }

    pub(crate) fn get(&self, path: &str) -> Option<&FileRecord> {
        self.records.get(path)
    }

    pub(crate) fn is_complete(&self, path: &str) -> bool {
        self.records.get(path).is_some_and(|r| r.is_complete)
    }

    /// Records in stable insertion order, cloned for snapshot embedding.
    pub(crate) fn records(&self) -> Vec<FileRecord> {
        self.records.values().cloned().collect()
    }

    pub(crate) fn total_size(&self) -> usize {
        self.records.values().map(FileRecord::size).sum()
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }
}
