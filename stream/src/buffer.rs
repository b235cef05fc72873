use tracing::debug;

/// Default cap on the rolling buffer, in bytes.
pub(crate) const MAX_BUFFER_SIZE: usize = 1_000_000;

/// Rolling accumulated text of the stream seen so far.
///
/// The buffer is append-only from the caller's perspective; when it exceeds
/// its cap, a prefix is dropped and the tail retained. Truncation is lossy
/// for raw text only — extracted file records live in the registry, never
/// here — and the cut point is chosen so a reachable open block's start
/// marker is not destroyed.
#[derive(Debug)]
pub(crate) struct StreamBuffer {
    content: String,
    max_size: usize,
}

impl StreamBuffer {
    pub(crate) fn new() -> Self {
        Self::with_max_size(MAX_BUFFER_SIZE)
    }

    pub(crate) fn with_max_size(max_size: usize) -> Self {
        Self {
            content: String::new(),
            max_size,
        }
    }

    pub(crate) fn append(&mut self, chunk: &str) {
        self.content.push_str(chunk);
    }

    pub(crate) fn contents(&self) -> &str {
        &self.content
    }

    pub(crate) fn len(&self) -> usize {
        self.content.len()
    }

    /// Drops a prefix if the buffer is over its cap.
    ///
    /// `protect_from` is the byte offset of the currently-open block's start
    /// marker, when one exists. The cut point is:
    /// - the trailing `max_size / 2` when no open block is at risk,
    /// - the open block's start when that keeps the buffer within the cap,
    /// - the trailing `max_size / 2` regardless when the open block alone
    ///   exceeds the cap (accepted lossy degradation; the session latches
    ///   the open block's content separately).
    ///
    /// Returns the number of bytes dropped.
    pub(crate) fn enforce_cap(&mut self, protect_from: Option<usize>) -> usize {
        if self.content.len() <= self.max_size {
            return 0;
        }

        let mut cut = self.content.len() - self.max_size / 2;
        if let Some(open_start) = protect_from
            && open_start < cut
            && self.content.len() - open_start <= self.max_size
        {
            cut = open_start;
        }
        // Never split a multi-byte character.
        while cut < self.content.len() && !self.content.is_char_boundary(cut) {
            cut += 1;
        }
        if cut == 0 {
            return 0;
        }

        self.content.drain(..cut);
        debug!(dropped = cut, retained = self.content.len(), "buffer truncated");
        cut
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::StreamBuffer;

    #[test]
    fn append_accumulates() {
        let mut buffer = StreamBuffer::new();
        buffer.append("abc");
        buffer.append("def");
        assert_eq!(buffer.contents(), "abcdef");
        assert_eq!(buffer.len(), 6);
    }

    #[test]
    fn under_cap_is_untouched() {
        let mut buffer = StreamBuffer::with_max_size(10);
        buffer.append("1234567890");
        assert_eq!(buffer.enforce_cap(None), 0);
        assert_eq!(buffer.contents(), "1234567890");
    }

    #[test]
    fn over_cap_keeps_trailing_half() {
        let mut buffer = StreamBuffer::with_max_size(10);
        buffer.append(&"x".repeat(20));
        buffer.append("tail!");
        let dropped = buffer.enforce_cap(None);
        assert_eq!(dropped, 20);
        assert_eq!(buffer.contents(), "tail!");
    }

    #[test]
    fn open_block_start_is_protected() {
        let mut buffer = StreamBuffer::with_max_size(16);
        buffer.append(&"p".repeat(12));
        buffer.append("<file!");
        // Cut would land at len - 8 = 10, past the open marker at 12? No:
        // marker at 12 is after 10, so the default cut already keeps it.
        assert_eq!(buffer.enforce_cap(Some(12)), 10);
        assert!(buffer.contents().contains("<file!"));

        let mut buffer = StreamBuffer::with_max_size(16);
        buffer.append(&"p".repeat(4));
        buffer.append("<file!");
        buffer.append(&"c".repeat(10));
        // Default cut at len - 8 = 12 would destroy the marker at offset 4;
        // keeping from offset 4 still fits in the cap, so cut there.
        assert_eq!(buffer.enforce_cap(Some(4)), 4);
        assert!(buffer.contents().starts_with("<file!"));
    }

    #[test]
    fn pathological_open_block_degrades_lossily() {
        let mut buffer = StreamBuffer::with_max_size(10);
        buffer.append("<file!");
        buffer.append(&"c".repeat(30));
        // The open block alone exceeds the cap; keep the trailing half.
        let dropped = buffer.enforce_cap(Some(0));
        assert_eq!(dropped, 31);
        assert_eq!(buffer.len(), 5);
        assert!(!buffer.contents().contains("<file!"));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let mut buffer = StreamBuffer::with_max_size(8);
        buffer.append("ab");
        buffer.append(&"é".repeat(10));
        buffer.enforce_cap(None);
        // Every retained byte sequence must still be valid UTF-8.
        assert!(buffer.contents().chars().all(|c| c == 'é'));
        assert!(buffer.len() <= 8);
    }
}
