//! Line and column bookkeeping for error reporting.

/// Tracks how many newlines have been consumed and where the current line
/// begins, so any byte offset at or past the last newline can be translated
/// into a (line, column) pair.
///
/// The parser feeds [`newline`](Self::newline) exactly once per `\n` byte it
/// consumes. Because whitespace consumption commits checkpoint progress
/// byte-by-byte, a resumed parse never revisits a counted newline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineTracker {
    /// Newlines consumed so far.
    line: usize,
    /// Buffer offset of the first byte after the last newline.
    line_start: usize,
}

impl LineTracker {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the newline byte at offset `i`.
    #[inline]
    pub fn newline(&mut self, i: usize) {
        self.line += 1;
        self.line_start = i + 1;
    }

    /// Newlines consumed so far.
    #[inline]
    pub fn lines_seen(&self) -> usize {
        self.line
    }

    /// Translate buffer offset `i` into a 1-based line and 0-based column.
    ///
    /// Only valid for offsets on the current line, which is where every
    /// error this parser reports is detected.
    #[inline]
    pub fn locate(&self, i: usize) -> (usize, usize) {
        (self.line + 1, i.saturating_sub(self.line_start))
    }

    /// Shift the line start down after the buffer compacted `delta` bytes.
    #[inline]
    pub fn rebase(&mut self, delta: usize) {
        self.line_start = self.line_start.saturating_sub(delta);
    }
}
