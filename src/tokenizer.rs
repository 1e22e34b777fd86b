use log::debug;

use crate::buffer::{Accumulator, SourceBuffer};
use crate::error::{Error, Limit, Result};
use crate::escape::{self, Digit, Escape, Literal};
use crate::record::Values;
use crate::settings::{EscapeMode, ReaderSettings, Terminator};
use crate::source::CharRead;

const COLUMN_CAPACITY: usize = 50;
const RAW_CAPACITY: usize = 500;

/// What the tokenizer is in the middle of.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Mode {
    /// Between columns. Leading whitespace is skipped here.
    StartColumn,
    Unquoted,
    Quoted,
    /// Just saw a qualifier inside a quoted column.
    Closing,
    /// Text after a closing qualifier, kept up to the next delimiter.
    Trailing,
    /// Inside a comment line.
    Comment,
    /// Just saw a backslash.
    Escape { quoted: bool },
    Literal { quoted: bool, literal: Literal },
}

/// Whether the current character was consumed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Step {
    Advance,
    /// Dispatch the current character again in the new mode.
    Stay,
}

/// A CSV tokenizer over a fixed capacity source buffer.
///
/// Columns and records may span any number of buffer loads. Text that
/// would be lost by a refill is first copied to the column accumulator
/// (pending column text) and the raw accumulator (pending record text).
#[derive(Debug)]
pub(crate) struct Tokenizer {
    delimiter: char,
    qualifier: Option<char>,
    escape_mode: EscapeMode,
    comment: Option<char>,
    term: Terminator,
    trim: bool,
    skip_empty: bool,
    safety: bool,
    capture_raw: bool,

    pub(crate) buf: SourceBuffer,
    column: Accumulator,
    raw: Accumulator,
    raw_text: String,
    pub(crate) values: Values,
    mode: Mode,
    column_started: bool,
    started_with_qualifier: bool,
    last: char,
    has_more: bool,
    record_done: bool,
    /// The number of records completed so far.
    pub(crate) records: u64,
}

impl Tokenizer {
    pub(crate) fn new(settings: &ReaderSettings, capacity: usize) -> Tokenizer {
        Tokenizer {
            delimiter: settings.delimiter,
            qualifier: if settings.use_text_qualifier {
                Some(settings.text_qualifier)
            } else {
                None
            },
            escape_mode: settings.escape_mode,
            comment: if settings.use_comments {
                Some(settings.comment)
            } else {
                None
            },
            term: settings.terminator,
            trim: settings.trim_whitespace,
            skip_empty: settings.skip_empty_records,
            safety: settings.safety_switch,
            capture_raw: settings.capture_raw_record,
            buf: SourceBuffer::new(capacity),
            column: Accumulator::with_capacity(COLUMN_CAPACITY),
            raw: Accumulator::with_capacity(RAW_CAPACITY),
            raw_text: String::new(),
            values: Values::new(),
            mode: Mode::StartColumn,
            column_started: false,
            started_with_qualifier: false,
            last: '\0',
            has_more: true,
            record_done: false,
            records: 0,
        }
    }

    /// The raw text of the last record read, without its terminator.
    pub(crate) fn raw_record(&self) -> &str {
        &self.raw_text
    }

    /// Reads the next record into `values`.
    ///
    /// Returns false when the data is exhausted. A record is never split
    /// across calls, regardless of the buffer capacity.
    pub(crate) fn read_record<R: CharRead>(
        &mut self,
        src: &mut R,
    ) -> Result<bool> {
        self.values.clear();
        self.raw.clear();
        self.raw_text.clear();
        self.record_done = false;
        if !self.has_more {
            return Ok(false);
        }
        self.buf.line_start = self.buf.position;
        while !self.record_done {
            if self.buf.is_exhausted() {
                self.fill(src)?;
                if !self.has_more {
                    self.finish()?;
                    break;
                }
                continue;
            }
            let c = self.buf.current();
            if self.step(c)? == Step::Advance {
                self.last = c;
                self.buf.position += 1;
                self.check_column_length()?;
            }
        }
        if self.record_done && self.capture_raw {
            self.capture();
        }
        Ok(self.record_done)
    }

    /// Consumes everything up to and including the next terminator.
    ///
    /// Returns true if any character was consumed.
    pub(crate) fn skip_line<R: CharRead>(
        &mut self,
        src: &mut R,
    ) -> Result<bool> {
        self.values.clear();
        self.reset_column();
        self.mode = Mode::StartColumn;
        if !self.has_more {
            self.raw.clear();
            self.raw_text.clear();
            return Ok(false);
        }
        let mut seen = false;
        loop {
            if self.buf.is_exhausted() {
                self.fill(src)?;
                if !self.has_more {
                    break;
                }
                continue;
            }
            let c = self.buf.current();
            self.buf.position += 1;
            let lf_after_cr = self.lf_after_cr(c);
            self.last = c;
            if lf_after_cr && !seen {
                continue;
            }
            seen = true;
            if self.term.is_term(c) {
                break;
            }
        }
        self.buf.line_start = self.buf.position;
        self.raw.clear();
        self.raw_text.clear();
        Ok(seen)
    }

    /// Drops the buffers. The tokenizer yields nothing afterwards.
    pub(crate) fn release(&mut self) {
        self.buf.release();
        self.column.release();
        self.raw.release();
        self.raw_text = String::new();
        self.values.release();
        self.has_more = false;
    }

    fn fill<R: CharRead>(&mut self, src: &mut R) -> Result<()> {
        self.flush_pending();
        let b = &self.buf;
        if self.capture_raw && b.line_start < b.count {
            self.raw.extend_from_slice(&b.buf[b.line_start..b.count]);
        }
        if self.buf.refill(src)? == 0 {
            debug!("end of CSV data after {} records", self.records);
            self.has_more = false;
        }
        Ok(())
    }

    fn step(&mut self, c: char) -> Result<Step> {
        match self.mode {
            Mode::StartColumn => self.start_column(c),
            Mode::Unquoted => self.unquoted(c),
            Mode::Quoted => {
                if Some(c) == self.qualifier {
                    self.drop_current();
                    self.mode = Mode::Closing;
                } else if self.is_backslash(c) {
                    self.drop_current();
                    self.mode = Mode::Escape { quoted: true };
                }
                Ok(Step::Advance)
            }
            Mode::Closing => self.closing(c),
            Mode::Trailing => self.unquoted(c),
            Mode::Comment => {
                if self.term.is_term(c) {
                    self.mode = Mode::StartColumn;
                    self.skip_current_line();
                }
                Ok(Step::Advance)
            }
            Mode::Escape { quoted } => {
                match escape::start(c) {
                    Escape::Char(decoded) => {
                        self.append(decoded);
                        self.mode = unescaped(quoted);
                    }
                    Escape::Literal(literal) => {
                        self.buf.column_start = self.buf.position + 1;
                        self.mode = Mode::Literal { quoted, literal };
                    }
                    // `column_start` is at `c`, so it stays in the column.
                    Escape::Verbatim => self.mode = unescaped(quoted),
                }
                Ok(Step::Advance)
            }
            Mode::Literal { quoted, mut literal } => match literal.step(c) {
                Digit::More => {
                    self.buf.column_start = self.buf.position + 1;
                    self.mode = Mode::Literal { quoted, literal };
                    Ok(Step::Advance)
                }
                Digit::Done(decoded) => {
                    self.append(decoded);
                    self.mode = unescaped(quoted);
                    Ok(Step::Advance)
                }
                Digit::End(decoded) => {
                    if let Some(decoded) = decoded {
                        self.column.push(decoded);
                    }
                    self.mode = unescaped(quoted);
                    Ok(Step::Stay)
                }
            },
        }
    }

    fn start_column(&mut self, c: char) -> Result<Step> {
        let pos = self.buf.position;
        if Some(c) == self.qualifier {
            self.column_started = true;
            self.started_with_qualifier = true;
            self.buf.column_start = pos + 1;
            self.mode = Mode::Quoted;
        } else if c == self.delimiter {
            self.end_column()?;
        } else if self.term.is_term(c) {
            if self.column_started
                || self.values.len() > 0
                || (!self.skip_empty && !self.lf_after_cr(c))
            {
                self.end_column()?;
                self.end_record();
            } else {
                self.skip_current_line();
            }
        } else if Some(c) == self.comment
            && self.values.len() == 0
            && !self.column_started
        {
            self.mode = Mode::Comment;
        } else if self.trim && is_space(c) {
            self.column_started = true;
            self.buf.column_start = pos + 1;
        } else {
            self.column_started = true;
            self.buf.column_start = pos;
            self.mode = Mode::Unquoted;
            return Ok(Step::Stay);
        }
        Ok(Step::Advance)
    }

    fn unquoted(&mut self, c: char) -> Result<Step> {
        if self.is_backslash(c) {
            self.drop_current();
            self.mode = Mode::Escape { quoted: false };
        } else {
            self.end_on_separator(c)?;
        }
        Ok(Step::Advance)
    }

    fn closing(&mut self, c: char) -> Result<Step> {
        if self.escape_mode == EscapeMode::Doubled
            && Some(c) == self.qualifier
            && Some(self.last) == self.qualifier
        {
            // The second qualifier is at `column_start` and stays in the
            // column.
            self.mode = Mode::Quoted;
        } else if c == self.delimiter || self.term.is_term(c) {
            self.end_on_separator(c)?;
        } else if self.trim && is_space(c) {
            self.buf.column_start = self.buf.position + 1;
        } else {
            self.mode = Mode::Trailing;
            return Ok(Step::Stay);
        }
        Ok(Step::Advance)
    }

    /// Ends the column on a delimiter and the record on a terminator.
    fn end_on_separator(&mut self, c: char) -> Result<()> {
        if c == self.delimiter {
            self.end_column()?;
        } else if self.term.is_term(c) {
            self.end_column()?;
            self.end_record();
        }
        Ok(())
    }

    fn end_column(&mut self) -> Result<()> {
        if self.safety && self.values.len() >= Limit::Columns.max() {
            return Err(self.limit(Limit::Columns));
        }
        let qualified = self.started_with_qualifier;
        let trim = self.trim && !qualified;
        if !self.column_started {
            self.values.push(&[], false);
        } else if self.column.is_empty() {
            let b = &self.buf;
            let text = &b.buf[b.column_start..b.position];
            self.values.push(trim_end(text, trim), qualified);
        } else {
            self.flush_pending();
            self.values.push(trim_end(self.column.as_slice(), trim), qualified);
        }
        self.reset_column();
        self.mode = Mode::StartColumn;
        Ok(())
    }

    fn end_record(&mut self) {
        self.record_done = true;
        self.records += 1;
    }

    /// Completes the record in progress when the data runs out.
    fn finish(&mut self) -> Result<()> {
        if let Mode::Literal { literal, .. } = self.mode {
            if let Some(decoded) = literal.finish() {
                self.column.push(decoded);
            }
        }
        if self.column_started
            || (self.last == self.delimiter && self.values.len() > 0)
        {
            self.end_column()?;
            self.end_record();
        }
        self.reset_column();
        self.mode = Mode::StartColumn;
        Ok(())
    }

    fn capture(&mut self) {
        self.raw_text.extend(self.raw.as_slice());
        if self.has_more {
            let b = &self.buf;
            let end = b.position.saturating_sub(1);
            if b.line_start < end {
                self.raw_text.extend(&b.buf[b.line_start..end]);
            }
        }
    }

    fn check_column_length(&self) -> Result<()> {
        if !self.safety || !self.column_started {
            return Ok(());
        }
        let b = &self.buf;
        let pending = b.position.saturating_sub(b.column_start);
        if pending + self.column.len() > Limit::ColumnLength.max() {
            return Err(self.limit(Limit::ColumnLength));
        }
        Ok(())
    }

    fn limit(&self, limit: Limit) -> Error {
        debug!(
            "{:?} limit exceeded in record {} at column {}",
            limit,
            self.records,
            self.values.len()
        );
        Error::LimitExceeded {
            limit: limit,
            record: self.records,
            column: self.values.len(),
        }
    }

    /// Copies the column text not yet accumulated into the column
    /// accumulator.
    fn flush_pending(&mut self) {
        let b = &mut self.buf;
        if self.column_started && b.column_start < b.position {
            self.column.extend_from_slice(&b.buf[b.column_start..b.position]);
        }
        b.column_start = b.position;
    }

    /// Flushes pending text and excludes the current character from the
    /// column.
    fn drop_current(&mut self) {
        self.flush_pending();
        self.buf.column_start = self.buf.position + 1;
    }

    /// Adds a decoded character in place of the current one.
    fn append(&mut self, c: char) {
        self.column.push(c);
        self.buf.column_start = self.buf.position + 1;
    }

    fn skip_current_line(&mut self) {
        self.buf.line_start = self.buf.position + 1;
        self.raw.clear();
    }

    fn reset_column(&mut self) {
        self.column.clear();
        self.column_started = false;
        self.started_with_qualifier = false;
    }

    fn is_backslash(&self, c: char) -> bool {
        c == '\\' && self.escape_mode == EscapeMode::Backslash
    }

    fn lf_after_cr(&self, c: char) -> bool {
        self.term.is_crlf() && c == '\n' && self.last == '\r'
    }
}

fn unescaped(quoted: bool) -> Mode {
    if quoted {
        Mode::Quoted
    } else {
        Mode::Unquoted
    }
}

#[inline]
fn is_space(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn trim_end(text: &[char], yes: bool) -> &[char] {
    if !yes {
        return text;
    }
    let mut end = text.len();
    while end > 0 && is_space(text[end - 1]) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::Tokenizer;
    use crate::settings::ReaderSettings;
    use crate::source::TextSource;

    fn tokenize(data: &str, capacity: usize) -> Vec<(Vec<String>, String)> {
        let mut src = TextSource::new(data);
        let mut tok = Tokenizer::new(&ReaderSettings::default(), capacity);
        let mut out = vec![];
        while tok.read_record(&mut src).unwrap() {
            assert!(tok.buf.check_invariants());
            let vals = tok.values.as_slice().to_vec();
            out.push((vals, tok.raw_record().to_string()));
        }
        assert!(tok.buf.check_invariants());
        out
    }

    #[test]
    fn columns_span_buffer_loads() {
        let data = "alpha,\"be,ta\"\r\n  gamma  ,\"del\"\"ta\"\n";
        let expected = tokenize(data, 1024);
        assert_eq!(expected.len(), 2);
        assert_eq!(expected[0].0, vec!["alpha", "be,ta"]);
        assert_eq!(expected[0].1, "alpha,\"be,ta\"");
        assert_eq!(expected[1].0, vec!["gamma", "del\"ta"]);
        assert_eq!(expected[1].1, "  gamma  ,\"del\"\"ta\"");
        for cap in 1..data.len() + 2 {
            assert_eq!(tokenize(data, cap), expected, "capacity {}", cap);
        }
    }

    #[test]
    fn record_ordinals() {
        let mut src = TextSource::new("a\nb\n\nc");
        let mut tok = Tokenizer::new(&ReaderSettings::default(), 2);
        let mut n = 0;
        while tok.read_record(&mut src).unwrap() {
            n += 1;
            assert_eq!(tok.records, n);
        }
        assert_eq!(n, 3);
        assert!(!tok.read_record(&mut src).unwrap());
        assert_eq!(tok.values.len(), 0);
    }

    #[test]
    fn skip_line_consumes_terminator() {
        let mut src = TextSource::new("x,y\r\nz\r\n");
        let mut tok = Tokenizer::new(&ReaderSettings::default(), 3);
        assert!(tok.skip_line(&mut src).unwrap());
        assert!(tok.read_record(&mut src).unwrap());
        assert_eq!(tok.values.as_slice(), &["z".to_string()][..]);
        assert_eq!(tok.raw_record(), "z");
        assert!(!tok.skip_line(&mut src).unwrap());
        assert!(!tok.read_record(&mut src).unwrap());
    }
}
