use std::collections::HashMap;
use std::collections::hash_map::Entry;

use codepup_protocol::FileCompletedEvent;
use codepup_protocol::FileStartedEvent;
use codepup_protocol::FileUpdatedEvent;
use codepup_protocol::SessionCompletedEvent;
use codepup_protocol::SessionEvent;
use codepup_protocol::SessionFailedEvent;
use codepup_protocol::SessionStartedEvent;
use codepup_protocol::SessionState;
use codepup_protocol::SessionStoppedEvent;
use codepup_protocol::StreamSnapshot;

/// Turns a series of snapshots into a series of change events.
///
/// Snapshots are conflated: a watch channel only guarantees the latest value,
/// so consecutive observations can skip intermediate states. The processor
/// therefore diffs against what it last reported per file rather than
/// assuming one change per snapshot.
pub struct EventProcessor {
    started: bool,
    finished: bool,
    files: HashMap<String, FileProgress>,
}

struct FileProgress {
    size: usize,
    complete: bool,
}

impl EventProcessor {
    pub fn new() -> Self {
        Self {
            started: false,
            finished: false,
            files: HashMap::new(),
        }
    }

    /// Events for everything that changed since the previous snapshot.
    ///
    /// `error` carries the failure description when the snapshot is in the
    /// error state; it lives outside the snapshot itself.
    pub fn collect_events(
        &mut self,
        snapshot: &StreamSnapshot,
        error: Option<&str>,
    ) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.finished {
            return events;
        }

        if !self.started && snapshot.state != SessionState::Idle {
            self.started = true;
            events.push(SessionEvent::SessionStarted(SessionStartedEvent::default()));
        }

        for record in &snapshot.files {
            let size = record.size();
            match self.files.entry(record.filename.clone()) {
                Entry::Occupied(mut entry) => {
                    let progress = entry.get_mut();
                    if record.is_complete && !progress.complete {
                        progress.complete = true;
                        progress.size = size;
                        events.push(SessionEvent::FileCompleted(FileCompletedEvent {
                            path: record.filename.clone(),
                            size,
                        }));
                    } else if !progress.complete && size > progress.size {
                        progress.size = size;
                        events.push(SessionEvent::FileUpdated(FileUpdatedEvent {
                            path: record.filename.clone(),
                            size,
                        }));
                    }
                }
                Entry::Vacant(entry) => {
                    events.push(SessionEvent::FileStarted(FileStartedEvent {
                        path: record.filename.clone(),
                    }));
                    if record.is_complete {
                        events.push(SessionEvent::FileCompleted(FileCompletedEvent {
                            path: record.filename.clone(),
                            size,
                        }));
                    } else if size > 0 {
                        events.push(SessionEvent::FileUpdated(FileUpdatedEvent {
                            path: record.filename.clone(),
                            size,
                        }));
                    }
                    entry.insert(FileProgress {
                        size,
                        complete: record.is_complete,
                    });
                }
            }
        }

        // A file the extractor has spotted but not yet committed a record for.
        if let Some(path) = &snapshot.current_file
            && let Entry::Vacant(entry) = self.files.entry(path.clone())
        {
            events.push(SessionEvent::FileStarted(FileStartedEvent {
                path: path.clone(),
            }));
            entry.insert(FileProgress {
                size: 0,
                complete: false,
            });
        }

        match snapshot.state {
            SessionState::Complete => {
                self.finished = true;
                events.push(SessionEvent::SessionCompleted(SessionCompletedEvent {
                    file_count: snapshot.files.len(),
                    total_size: snapshot.total_size,
                }));
            }
            SessionState::Error => {
                self.finished = true;
                events.push(SessionEvent::SessionFailed(SessionFailedEvent {
                    message: error.unwrap_or("stream failed").to_string(),
                }));
            }
            SessionState::Stopped => {
                self.finished = true;
                events.push(SessionEvent::SessionStopped(SessionStoppedEvent {
                    file_count: snapshot.files.len(),
                    total_size: snapshot.total_size,
                }));
            }
            SessionState::Idle | SessionState::Streaming => {}
        }

        events
    }
}

impl Default for EventProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use codepup_protocol::FileRecord;
    use codepup_protocol::SessionEvent;
    use codepup_protocol::SessionState;
    use codepup_protocol::StreamSnapshot;
    use pretty_assertions::assert_eq;

    use super::EventProcessor;

    fn snapshot(files: Vec<FileRecord>, state: SessionState) -> StreamSnapshot {
        let total_size = files.iter().map(FileRecord::size).sum();
        StreamSnapshot {
            files,
            current_file: None,
            progress: 0,
            total_size,
            state,
        }
    }

    fn record(filename: &str, content: &str, is_complete: bool) -> FileRecord {
        FileRecord {
            filename: filename.to_string(),
            content: content.to_string(),
            is_complete,
        }
    }

    fn kinds(events: &[SessionEvent]) -> Vec<String> {
        events
            .iter()
            .map(|event| {
                serde_json::to_value(event).expect("serialize")["type"]
                    .as_str()
                    .expect("type tag")
                    .to_string()
            })
            .collect()
    }

    #[test]
    fn first_streaming_snapshot_starts_the_session() {
        let mut processor = EventProcessor::new();
        let events = processor.collect_events(
            &snapshot(
                vec![record("a.ts", "let", false)],
                SessionState::Streaming,
            ),
            None,
        );
        assert_eq!(
            kinds(&events),
            vec!["session.started", "file.started", "file.updated"]
        );
    }

    #[test]
    fn growth_and_completion_each_emit_once() {
        let mut processor = EventProcessor::new();
        processor.collect_events(
            &snapshot(vec![record("a.ts", "le", false)], SessionState::Streaming),
            None,
        );

        let grown = snapshot(vec![record("a.ts", "let x", false)], SessionState::Streaming);
        assert_eq!(kinds(&processor.collect_events(&grown, None)), vec!["file.updated"]);
        // Same snapshot again: nothing changed, nothing emitted.
        assert_eq!(processor.collect_events(&grown, None), vec![]);

        let done = snapshot(
            vec![record("a.ts", "let x = 1;", true)],
            SessionState::Streaming,
        );
        assert_eq!(kinds(&processor.collect_events(&done, None)), vec!["file.completed"]);
        assert_eq!(processor.collect_events(&done, None), vec![]);
    }

    #[test]
    fn current_file_hint_starts_a_file_without_a_record() {
        let mut processor = EventProcessor::new();
        let mut snap = snapshot(Vec::new(), SessionState::Streaming);
        snap.current_file = Some("src/App.tsx".to_string());

        let events = processor.collect_events(&snap, None);
        assert_eq!(kinds(&events), vec!["session.started", "file.started"]);

        // Once the record shows up, the file is not re-started.
        let snap = snapshot(
            vec![record("src/App.tsx", "export", false)],
            SessionState::Streaming,
        );
        assert_eq!(kinds(&processor.collect_events(&snap, None)), vec!["file.updated"]);
    }

    #[test]
    fn conflated_snapshot_reports_everything_at_once() {
        // A single terminal snapshot is all the processor may ever see.
        let mut processor = EventProcessor::new();
        let events = processor.collect_events(
            &snapshot(
                vec![
                    record("a.ts", "one", true),
                    record("b.ts", "two", true),
                ],
                SessionState::Complete,
            ),
            None,
        );
        assert_eq!(
            kinds(&events),
            vec![
                "session.started",
                "file.started",
                "file.completed",
                "file.started",
                "file.completed",
                "session.completed",
            ]
        );
    }

    #[test]
    fn failure_carries_the_error_message() {
        let mut processor = EventProcessor::new();
        let events = processor.collect_events(
            &snapshot(Vec::new(), SessionState::Error),
            Some("stream disconnected"),
        );
        let last = events.last().expect("terminal event");
        assert_eq!(
            serde_json::to_value(last).expect("serialize")["message"],
            "stream disconnected"
        );
    }

    #[test]
    fn nothing_is_emitted_after_a_terminal_event() {
        let mut processor = EventProcessor::new();
        processor.collect_events(&snapshot(Vec::new(), SessionState::Stopped), None);
        let events = processor.collect_events(
            &snapshot(vec![record("a.ts", "x", true)], SessionState::Stopped),
            None,
        );
        assert_eq!(events, vec![]);
    }
}
