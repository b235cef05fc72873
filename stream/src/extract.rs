use std::collections::HashMap;
use std::sync::OnceLock;

use codepup_protocol::CandidateFile;
use codepup_protocol::normalize_path;
use regex_lite::Regex;
use tracing::debug;

/// Result of one full-buffer extraction pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct ExtractOutcome {
    /// Closed blocks, de-duplicated per path (longest content wins), in
    /// first-seen order.
    pub(crate) candidates: Vec<CandidateFile>,
    /// The trailing opening tag that has no matching close yet, if any.
    pub(crate) open_block: Option<OpenBlock>,
}

/// A `<file path="...">` whose closing tag has not been observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OpenBlock {
    /// Normalized path from the opening tag.
    pub(crate) path: String,
    /// Everything after the opening tag; grows as more chunks arrive.
    pub(crate) content: String,
    /// Byte offset of the opening tag's `<` within the scanned buffer. Used
    /// to keep buffer truncation from destroying the tag.
    pub(crate) start: usize,
}

const CLOSE_TAG: &str = "</file>";

fn block_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();

    #[expect(clippy::unwrap_used)]
    RE.get_or_init(|| Regex::new(r#"(?s)<file\s+path="([^"]*)"\s*>(.*?)</file>"#).unwrap())
}

fn open_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();

    #[expect(clippy::unwrap_used)]
    RE.get_or_init(|| Regex::new(r#"<file\s+path="([^"]*)"\s*>"#).unwrap())
}

/// Scans the entire buffer for file blocks.
///
/// Closed blocks become candidates; the last opening tag without a matching
/// close is reported as the open block. Malformed regions and invalid paths
/// are skipped without error — an unparseable span is simply not matched
/// until more data completes it (or never, which is fine).
pub(crate) fn extract(buffer: &str) -> ExtractOutcome {
    let mut candidates: Vec<CandidateFile> = Vec::new();
    let mut by_path: HashMap<String, usize> = HashMap::new();

    for caps in block_regex().captures_iter(buffer) {
        let (Some(raw_path), Some(content)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let Some(path) = normalize_path(raw_path.as_str()) else {
            debug!(path = raw_path.as_str(), "discarding block with invalid path");
            continue;
        };
        let content = content.as_str().to_string();
        match by_path.get(&path) {
            Some(&idx) => {
                // Re-sent or corrected content: only the longest version from
                // this pass survives.
                if content.len() > candidates[idx].content.len() {
                    candidates[idx].content = content;
                }
            }
            None => {
                by_path.insert(path.clone(), candidates.len());
                candidates.push(CandidateFile { path, content });
            }
        }
    }

    ExtractOutcome {
        open_block: find_open_block(buffer),
        candidates,
    }
}

/// Reports the buffer's last opening tag when it lacks a subsequent close.
fn find_open_block(buffer: &str) -> Option<OpenBlock> {
    let caps = open_tag_regex().captures_iter(buffer).last()?;
    let tag = caps.get(0)?;
    let rest = &buffer[tag.end()..];
    if rest.contains(CLOSE_TAG) {
        // The last opening tag belongs to a closed block.
        return None;
    }
    let raw_path = caps.get(1)?.as_str();
    let Some(path) = normalize_path(raw_path) else {
        debug!(path = raw_path, "ignoring open block with invalid path");
        return None;
    };
    Some(OpenBlock {
        path,
        content: rest.to_string(),
        start: tag.start(),
    })
}
