use codepup_protocol::FileRecord;

/// Raw buffer length at which the no-files-yet heuristic saturates.
const BUFFER_SCALE: f64 = 100_000.0;

/// Cumulative content size beyond which a large stream is assumed to be
/// near completion even while its last file is still open.
const LARGE_OUTPUT_THRESHOLD: usize = 50_000;

/// Derives an advisory 0–100 completion estimate.
///
/// Purely a UI signal: nothing downstream may rely on it for correctness,
/// and it is not guaranteed to be monotonic because new files can be
/// discovered mid-stream.
///
/// - Before any file is recognized, progress tracks raw buffer volume,
///   capped below 90 — "something is happening" without claiming closure.
/// - Once files exist, progress is the completed/total ratio, nudged up
///   (capped at 95) when cumulative output size suggests the generation is
///   nearly done.
pub(crate) fn estimate(files: &[FileRecord], buffer_len: usize) -> u8 {
    if files.is_empty() {
        let raw = buffer_len as f64 / BUFFER_SCALE * 100.0;
        return raw.clamp(0.0, 90.0) as u8;
    }

    let completed = files.iter().filter(|f| f.is_complete).count();
    let total_size: usize = files.iter().map(FileRecord::size).sum();
    let ratio = completed as f64 / files.len() as f64 * 100.0;
    let adjusted = if total_size > LARGE_OUTPUT_THRESHOLD && ratio < 100.0 {
        (ratio + 10.0).min(95.0)
    } else {
        ratio
    };
    adjusted.clamp(0.0, 100.0) as u8
}
