use std::io;
use std::path::Path;

use log::debug;

use crate::buffer::DEFAULT_CAPACITY;
use crate::encoding::Encoding;
use crate::error::{Error, Result};
use crate::headers::HeaderIndex;
use crate::record::StringRecord;
use crate::resource::Resource;
use crate::settings::{EscapeMode, ReaderSettings, Terminator};
use crate::source::{CharRead, DecodeReader, PathSource, TextSource};
use crate::tokenizer::Tokenizer;

/// Builds a CSV reader with various configuration knobs.
///
/// This builder can be used to tweak the field delimiter, the quoting and
/// escaping dialect, comment handling and more. Once a CSV `Reader` is
/// built, its configuration cannot be changed, with the exception of
/// header case sensitivity.
///
/// Every `from_*` method validates the configuration and returns an
/// `InvalidArgument` error when it cannot work, e.g., when the delimiter
/// and the text qualifier are the same character.
#[derive(Clone, Debug)]
pub struct ReaderBuilder {
    settings: ReaderSettings,
    capacity: usize,
    encoding: Encoding,
    detect_bom: bool,
}

impl Default for ReaderBuilder {
    fn default() -> ReaderBuilder {
        ReaderBuilder::from_settings(ReaderSettings::default())
    }
}

impl ReaderBuilder {
    /// Create a new builder for configuring CSV parsing.
    ///
    /// To convert a builder into a reader, call one of the methods starting
    /// with `from_`.
    ///
    /// # Example
    ///
    /// ```
    /// use textcsv::ReaderBuilder;
    ///
    /// # fn main() { example().unwrap(); }
    /// fn example() -> textcsv::Result<()> {
    ///     let data = "city;country\nBoston;United States\n";
    ///     let mut rdr = ReaderBuilder::new().delimiter(';').from_text(data)?;
    ///     assert!(rdr.read_headers()?);
    ///     assert!(rdr.read_record()?);
    ///     assert_eq!(rdr.get_by_name("country"), Some("United States"));
    ///     Ok(())
    /// }
    /// ```
    pub fn new() -> ReaderBuilder {
        ReaderBuilder::default()
    }

    /// Create a builder that starts from the settings given.
    ///
    /// This is useful when settings are loaded from a configuration file.
    pub fn from_settings(settings: ReaderSettings) -> ReaderBuilder {
        ReaderBuilder {
            settings: settings,
            capacity: DEFAULT_CAPACITY,
            encoding: Encoding::Utf8,
            detect_bom: true,
        }
    }

    /// Build a CSV reader from this configuration that reads data from the
    /// file at `path`.
    ///
    /// The file must exist, but it is not opened until the first record is
    /// read.
    pub fn from_path<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<Reader<PathSource>> {
        self.validate()?;
        let src =
            PathSource::with_encoding(path, self.encoding, self.detect_bom)?;
        Ok(Reader::new(self, src))
    }

    /// Build a CSV reader from this configuration that decodes data from
    /// `rdr` with the configured encoding.
    ///
    /// The reader is buffered for you automatically. Passing `&mut rdr`
    /// keeps ownership of the underlying stream with the caller.
    pub fn from_reader<R: io::Read>(
        &self,
        rdr: R,
    ) -> Result<Reader<DecodeReader<R>>> {
        self.validate()?;
        let src =
            DecodeReader::with_encoding(rdr, self.encoding, self.detect_bom);
        Ok(Reader::new(self, src))
    }

    /// Build a CSV reader from this configuration over in-memory text.
    pub fn from_text<S: Into<String>>(
        &self,
        text: S,
    ) -> Result<Reader<TextSource>> {
        self.validate()?;
        Ok(Reader::new(self, TextSource::new(text)))
    }

    /// Build a CSV reader from this configuration over any character
    /// source.
    pub fn from_source<C: CharRead>(&self, src: C) -> Result<Reader<C>> {
        self.validate()?;
        Ok(Reader::new(self, src))
    }

    /// The field delimiter to use when parsing CSV.
    ///
    /// The default is `,`.
    pub fn delimiter(&mut self, delimiter: char) -> &mut ReaderBuilder {
        self.settings.delimiter = delimiter;
        self
    }

    /// The quote character to use when parsing CSV.
    ///
    /// The default is `"`.
    pub fn text_qualifier(&mut self, qualifier: char) -> &mut ReaderBuilder {
        self.settings.text_qualifier = qualifier;
        self
    }

    /// Enable or disable quoting.
    ///
    /// This is enabled by default, but it may be disabled. When disabled,
    /// quotes are not treated specially.
    pub fn use_text_qualifier(&mut self, yes: bool) -> &mut ReaderBuilder {
        self.settings.use_text_qualifier = yes;
        self
    }

    /// The escaping dialect. The default is `EscapeMode::Doubled`.
    pub fn escape_mode(&mut self, mode: EscapeMode) -> &mut ReaderBuilder {
        self.settings.escape_mode = mode;
        self
    }

    /// The comment character to use when parsing CSV.
    ///
    /// If the start of a record begins with the byte given here, then that
    /// line is ignored by the CSV parser.
    ///
    /// This is disabled by default.
    pub fn comment(&mut self, comment: Option<char>) -> &mut ReaderBuilder {
        match comment {
            Some(c) => {
                self.settings.comment = c;
                self.settings.use_comments = true;
            }
            None => self.settings.use_comments = false,
        }
        self
    }

    /// The record terminator to use when parsing CSV.
    ///
    /// A record terminator can be any single character. The default is a
    /// special value, `Terminator::CRLF`, which treats any occurrence of
    /// `\r`, `\n` or `\r\n` as a single record terminator.
    pub fn terminator(&mut self, term: Terminator) -> &mut ReaderBuilder {
        self.settings.terminator = term;
        self
    }

    /// Whether spaces and tabs around unquoted columns are dropped.
    ///
    /// This is enabled by default.
    pub fn trim_whitespace(&mut self, yes: bool) -> &mut ReaderBuilder {
        self.settings.trim_whitespace = yes;
        self
    }

    /// Whether empty lines are skipped.
    ///
    /// When disabled, an empty line is a record with a single empty column.
    /// This is enabled by default.
    pub fn skip_empty_records(&mut self, yes: bool) -> &mut ReaderBuilder {
        self.settings.skip_empty_records = yes;
        self
    }

    /// Whether records are limited to 100,000 columns of 100,000
    /// characters each.
    ///
    /// This guards against unbounded memory use on malformed input, such
    /// as a stray qualifier. This is enabled by default.
    pub fn safety_switch(&mut self, yes: bool) -> &mut ReaderBuilder {
        self.settings.safety_switch = yes;
        self
    }

    /// Whether the raw text of each record is kept and available through
    /// `Reader::raw_record`.
    ///
    /// This is enabled by default.
    pub fn capture_raw_record(&mut self, yes: bool) -> &mut ReaderBuilder {
        self.settings.capture_raw_record = yes;
        self
    }

    /// Whether header names are looked up case sensitively.
    ///
    /// This is enabled by default.
    pub fn case_sensitive_headers(&mut self, yes: bool) -> &mut ReaderBuilder {
        self.settings.case_sensitive_headers = yes;
        self
    }

    /// The encoding of the bytes read by `from_reader` and `from_path`.
    ///
    /// The default is UTF-8. Choosing `Encoding::Latin1` also turns off
    /// byte order mark detection, since `ÿþ` is valid Latin-1 text; call
    /// `detect_bom` afterwards to turn it back on.
    pub fn encoding(&mut self, encoding: Encoding) -> &mut ReaderBuilder {
        self.encoding = encoding;
        self.detect_bom = encoding != Encoding::Latin1;
        self
    }

    /// Whether a leading byte order mark selects the encoding.
    ///
    /// This is enabled by default for the Unicode encodings. The mark itself
    /// is never part of the data.
    pub fn detect_bom(&mut self, yes: bool) -> &mut ReaderBuilder {
        self.detect_bom = yes;
        self
    }

    /// Set the capacity, in characters, of the source buffer.
    ///
    /// Records and columns longer than the buffer are supported. The
    /// default is 1024. A capacity of `0` is rejected.
    pub fn buffer_capacity(&mut self, capacity: usize) -> &mut ReaderBuilder {
        self.capacity = capacity;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(Error::InvalidArgument(
                "buffer capacity must be at least 1".to_string(),
            ));
        }
        self.settings.validate()
    }
}

/// A streaming CSV reader.
///
/// The reader pulls one record at a time with `read_record`. The values of
/// the current record are borrowed from the reader and are overwritten by
/// the next call, so use `record` to keep an owned copy.
///
/// # Example
///
/// ```
/// use textcsv::Reader;
///
/// # fn main() { example().unwrap(); }
/// fn example() -> textcsv::Result<()> {
///     let mut rdr = Reader::from_text("a,\"b\"\"c\",d\n1,2,3\n");
///     assert!(rdr.read_record()?);
///     assert_eq!(rdr.values(), &["a", "b\"c", "d"]);
///     assert_eq!(rdr.is_qualified(1), Some(true));
///
///     let rest = rdr.records().collect::<textcsv::Result<Vec<_>>>()?;
///     assert_eq!(rest[0], vec!["1", "2", "3"]);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Reader<R> {
    src: Option<R>,
    settings: ReaderSettings,
    tok: Tokenizer,
    headers: HeaderIndex,
    res: Resource,
}

impl Reader<PathSource> {
    /// Create a new CSV reader with a default configuration for the file
    /// at `path`.
    ///
    /// The file is opened when the first record is read. A missing file is
    /// reported immediately with `Error::NotFound`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Reader<PathSource>> {
        ReaderBuilder::new().from_path(path)
    }
}

impl<R: io::Read> Reader<DecodeReader<R>> {
    /// Create a new CSV reader with a default configuration for the UTF-8
    /// data in `rdr`.
    pub fn from_reader(rdr: R) -> Reader<DecodeReader<R>> {
        Reader::new(&ReaderBuilder::new(), DecodeReader::new(rdr))
    }
}

impl Reader<TextSource> {
    /// Create a new CSV reader with a default configuration over in-memory
    /// text.
    pub fn from_text<S: Into<String>>(text: S) -> Reader<TextSource> {
        Reader::new(&ReaderBuilder::new(), TextSource::new(text))
    }
}

impl<R: CharRead> Reader<R> {
    /// Create a new CSV reader with a default configuration over any
    /// character source.
    pub fn from_source(src: R) -> Reader<R> {
        Reader::new(&ReaderBuilder::new(), src)
    }

    fn new(builder: &ReaderBuilder, src: R) -> Reader<R> {
        let settings = builder.settings.clone();
        Reader {
            src: Some(src),
            tok: Tokenizer::new(&settings, builder.capacity),
            headers: HeaderIndex::new(vec![], settings.case_sensitive_headers),
            settings: settings,
            res: Resource::new("reader"),
        }
    }

    /// Read the next record.
    ///
    /// Returns `false` once the data is exhausted. Errors close the reader:
    /// an I/O error from the source and a safety limit violation are both
    /// final.
    pub fn read_record(&mut self) -> Result<bool> {
        self.res.check()?;
        let result = match self.src {
            Some(ref mut src) => self.tok.read_record(src),
            None => Ok(false),
        };
        self.guard(result)
    }

    /// Read the next record and use its values as the header names.
    ///
    /// The header row does not count as a record, so the record read after
    /// it is record `0`.
    pub fn read_headers(&mut self) -> Result<bool> {
        let read = self.read_record()?;
        self.headers.set_names(self.tok.values.as_slice().to_vec());
        if read {
            self.tok.records -= 1;
        }
        self.tok.values.clear();
        Ok(read)
    }

    /// Skip the rest of the current line, including its terminator.
    ///
    /// No CSV rules apply while skipping: a quoted terminator still ends the
    /// line. Returns `false` if there was nothing left to skip.
    pub fn skip_line(&mut self) -> Result<bool> {
        self.res.check()?;
        let result = match self.src {
            Some(ref mut src) => self.tok.skip_line(src),
            None => Ok(false),
        };
        self.guard(result)
    }

    /// Read and discard the next record.
    ///
    /// A skipped record is not counted in the record ordinal.
    pub fn skip_record(&mut self) -> Result<bool> {
        let read = self.read_record()?;
        if read {
            self.tok.records -= 1;
        }
        Ok(read)
    }

    /// Returns a borrowed iterator over all remaining records as owned
    /// `StringRecord`s.
    ///
    /// The iterator stops after the first error.
    pub fn records(&mut self) -> StringRecords<R> {
        StringRecords { rdr: self, done: false }
    }

    /// Return the value of column `i` of the current record.
    pub fn get(&self, i: usize) -> Option<&str> {
        self.tok.values.get(i)
    }

    /// Return the value of the column named `name` in the current record.
    ///
    /// Names are matched against the headers set with `read_headers` or
    /// `set_headers`.
    pub fn get_by_name(&self, name: &str) -> Option<&str> {
        self.headers.index_of(name).and_then(|i| self.get(i))
    }

    /// Whether column `i` of the current record was enclosed in the text
    /// qualifier.
    pub fn is_qualified(&self, i: usize) -> Option<bool> {
        self.tok.values.is_qualified(i)
    }

    /// The values of the current record.
    pub fn values(&self) -> &[String] {
        self.tok.values.as_slice()
    }

    /// An owned copy of the current record.
    pub fn record(&self) -> StringRecord {
        let position = self.tok.records.saturating_sub(1);
        StringRecord::from_values(self.tok.values.as_slice(), position)
    }

    /// The current record exactly as it appeared in the input, without its
    /// terminator.
    ///
    /// This is empty when raw capture is disabled.
    pub fn raw_record(&self) -> &str {
        self.tok.raw_record()
    }

    /// The number of columns in the current record.
    pub fn column_count(&self) -> usize {
        self.tok.values.len()
    }

    /// The zero based ordinal of the current record, or `None` before the
    /// first record is read.
    pub fn current_record(&self) -> Option<u64> {
        self.tok.records.checked_sub(1)
    }

    /// The settings this reader was built with.
    pub fn settings(&self) -> &ReaderSettings {
        &self.settings
    }

    /// Change whether header names are matched case sensitively.
    ///
    /// The header index is rebuilt before this returns.
    pub fn set_case_sensitive(&mut self, yes: bool) {
        self.settings.case_sensitive_headers = yes;
        self.headers.set_case_sensitive(yes);
    }

    /// The header names.
    pub fn headers(&self) -> &[String] {
        self.headers.names()
    }

    /// The header name at position `i`.
    pub fn header(&self, i: usize) -> Option<&str> {
        self.headers.get(i)
    }

    /// The number of header names.
    pub fn header_count(&self) -> usize {
        self.headers.len()
    }

    /// The position of the column named `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.headers.index_of(name)
    }

    /// Replace the header names.
    pub fn set_headers<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.headers.set_names(names.into_iter().map(Into::into).collect());
    }

    /// Close this reader, releasing its source and buffers.
    ///
    /// Closing is idempotent. Every later read fails with `Error::Closed`.
    pub fn close(&mut self) {
        if self.res.close() {
            self.src = None;
            self.tok.release();
            self.headers = HeaderIndex::default();
        }
    }

    /// Whether this reader has been closed.
    pub fn is_closed(&self) -> bool {
        self.res.is_closed()
    }

    fn guard<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(ref err) = result {
            debug!("closing CSV reader after error: {}", err);
            self.close();
        }
        result
    }

    #[cfg(test)]
    pub(crate) fn check_invariants(&self) -> bool {
        self.tok.buf.check_invariants()
    }
}

/// A borrowed iterator over the records of a CSV reader.
///
/// The lifetime parameter `'r` refers to the lifetime of the underlying
/// CSV `Reader`.
pub struct StringRecords<'r, R: 'r> {
    rdr: &'r mut Reader<R>,
    done: bool,
}

impl<'r, R: CharRead> Iterator for StringRecords<'r, R> {
    type Item = Result<StringRecord>;

    fn next(&mut self) -> Option<Result<StringRecord>> {
        if self.done {
            return None;
        }
        match self.rdr.read_record() {
            Ok(true) => Some(Ok(self.rdr.record())),
            Ok(false) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
