/// Upper bound on a normalized path. Anything longer is treated as stream
/// noise rather than a real project file.
pub const MAX_PATH_LEN: usize = 512;

/// Normalizes a raw `path` attribute into a registry key.
///
/// Rules: surrounding whitespace is trimmed, backslashes become forward
/// slashes, leading slashes and `.` segments are dropped, and empty segments
/// (from `//`) are collapsed. Returns `None` for paths that must never reach
/// the registry: empty paths, `..` traversal, control or shell-hostile
/// characters, and excessively long paths.
#[must_use]
pub fn normalize_path(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.len() > MAX_PATH_LEN {
        return None;
    }
    if trimmed
        .chars()
        .any(|c| c.is_control() || matches!(c, '<' | '>' | '"' | '|' | '*' | '?'))
    {
        return None;
    }

    let slashed = trimmed.replace('\\', "/");
    let mut segments: Vec<&str> = Vec::new();
    for segment in slashed.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return None,
            other => segments.push(other),
        }
    }
    if segments.is_empty() {
        return None;
    }
    Some(segments.join("/"))
}
