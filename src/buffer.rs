use std::io;

use log::trace;

use crate::source::CharRead;

/// The default capacity, in characters, of a reader's source buffer.
pub const DEFAULT_CAPACITY: usize = 1024;

/// A fixed capacity window over the character stream.
///
/// At every step boundary `column_start <= position <= count <= capacity`
/// and `line_start <= position` hold. Text in `[line_start, count)` and in
/// `[column_start, position)` may only be discarded by `refill` after the
/// caller has copied it somewhere else.
#[derive(Debug)]
pub(crate) struct SourceBuffer {
    pub(crate) buf: Vec<char>,
    pub(crate) position: usize,
    pub(crate) count: usize,
    pub(crate) column_start: usize,
    pub(crate) line_start: usize,
}

impl SourceBuffer {
    pub(crate) fn new(capacity: usize) -> SourceBuffer {
        SourceBuffer {
            buf: vec!['\0'; capacity],
            position: 0,
            count: 0,
            column_start: 0,
            line_start: 0,
        }
    }

    #[cfg(test)]
    pub(crate) fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Returns true when every resident character has been consumed.
    #[inline]
    pub(crate) fn is_exhausted(&self) -> bool {
        self.position >= self.count
    }

    #[inline]
    pub(crate) fn current(&self) -> char {
        self.buf[self.position]
    }

    /// Replaces the buffer contents with the next load from `src`.
    ///
    /// Returns the number of characters now resident. Zero means the source
    /// is exhausted.
    pub(crate) fn refill<R: CharRead>(
        &mut self,
        src: &mut R,
    ) -> io::Result<usize> {
        let n = src.read_chars(&mut self.buf)?;
        trace!("source buffer refilled with {} characters", n);
        self.count = n;
        self.position = 0;
        self.column_start = 0;
        self.line_start = 0;
        Ok(n)
    }

    pub(crate) fn release(&mut self) {
        self.buf = vec![];
        self.position = 0;
        self.count = 0;
        self.column_start = 0;
        self.line_start = 0;
    }

    #[cfg(test)]
    pub(crate) fn check_invariants(&self) -> bool {
        self.column_start <= self.position
            && self.position <= self.count
            && self.count <= self.capacity()
            && self.line_start <= self.position
    }
}

/// A growable character arena.
///
/// Slots past `len` are stale and reused. Growing to fit `n` more
/// characters sets the capacity to `capacity + max(n, capacity)`.
#[derive(Clone, Debug)]
pub(crate) struct Accumulator {
    buf: Vec<char>,
    len: usize,
}

impl Accumulator {
    pub(crate) fn with_capacity(capacity: usize) -> Accumulator {
        Accumulator { buf: vec!['\0'; capacity], len: 0 }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[cfg(test)]
    pub(crate) fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub(crate) fn as_slice(&self) -> &[char] {
        &self.buf[..self.len]
    }

    #[inline]
    pub(crate) fn clear(&mut self) {
        self.len = 0;
    }

    pub(crate) fn push(&mut self, c: char) {
        self.reserve(1);
        self.buf[self.len] = c;
        self.len += 1;
    }

    pub(crate) fn extend_from_slice(&mut self, chars: &[char]) {
        self.reserve(chars.len());
        self.buf[self.len..self.len + chars.len()].copy_from_slice(chars);
        self.len += chars.len();
    }

    pub(crate) fn release(&mut self) {
        self.buf = vec![];
        self.len = 0;
    }

    fn reserve(&mut self, n: usize) {
        let cap = self.buf.len();
        if self.len + n > cap {
            let grown = cap + n.max(cap);
            self.buf.resize(grown, '\0');
        }
    }
}
