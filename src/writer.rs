use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use log::debug;

use crate::encoder::Encoder;
use crate::encoding::Encoding;
use crate::error::{Error, Result};
use crate::resource::Resource;
use crate::settings::{EscapeMode, Terminator, WriterSettings};

/// Builds a CSV writer with various configuration knobs.
///
/// This builder can be used to tweak the field delimiter, record
/// terminator and more. Once a CSV `Writer` is built, its configuration
/// cannot be changed.
#[derive(Clone, Debug)]
pub struct WriterBuilder {
    settings: WriterSettings,
    encoding: Encoding,
    capacity: usize,
}

impl Default for WriterBuilder {
    fn default() -> WriterBuilder {
        WriterBuilder::from_settings(WriterSettings::default())
    }
}

impl WriterBuilder {
    /// Create a new builder for configuring CSV writing.
    ///
    /// To convert a builder into a writer, call one of the methods starting
    /// with `from_`.
    ///
    /// # Example
    ///
    /// ```
    /// use textcsv::WriterBuilder;
    ///
    /// # fn main() { example().unwrap(); }
    /// fn example() -> textcsv::Result<()> {
    ///     let mut wtr = WriterBuilder::new().delimiter(';').from_writer(vec![])?;
    ///     wtr.write_record(&["a", "b;c", ""], false)?;
    ///     let data = String::from_utf8(wtr.into_inner()?).unwrap();
    ///     assert_eq!(data, "a;\"b;c\";\r\n");
    ///     Ok(())
    /// }
    /// ```
    pub fn new() -> WriterBuilder {
        WriterBuilder::default()
    }

    /// Create a builder that starts from the settings given.
    pub fn from_settings(settings: WriterSettings) -> WriterBuilder {
        WriterBuilder {
            settings: settings,
            encoding: Encoding::Utf8,
            capacity: 8 * (1 << 10),
        }
    }

    /// Build a CSV writer from this configuration that writes data to the
    /// file at `path`.
    ///
    /// The file is created if it does not exist and truncated if it does.
    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<Writer<File>> {
        self.settings.validate()?;
        let path = path.as_ref();
        debug!("creating {}", path.display());
        Ok(Writer::new(self, File::create(path)?))
    }

    /// Build a CSV writer from this configuration that writes data to
    /// `wtr`.
    ///
    /// The writer is buffered for you automatically. Passing `&mut wtr`
    /// keeps ownership of the underlying stream with the caller.
    pub fn from_writer<W: io::Write>(&self, wtr: W) -> Result<Writer<W>> {
        self.settings.validate()?;
        Ok(Writer::new(self, wtr))
    }

    /// The field delimiter to use when writing CSV.
    ///
    /// The default is `,`.
    pub fn delimiter(&mut self, delimiter: char) -> &mut WriterBuilder {
        self.settings.delimiter = delimiter;
        self
    }

    /// The quote character to use when writing CSV.
    ///
    /// The default is `"`.
    pub fn text_qualifier(&mut self, qualifier: char) -> &mut WriterBuilder {
        self.settings.text_qualifier = qualifier;
        self
    }

    /// Enable or disable quoting.
    ///
    /// When disabled, fields are only quoted if `force_qualifier` is set.
    pub fn use_text_qualifier(&mut self, yes: bool) -> &mut WriterBuilder {
        self.settings.use_text_qualifier = yes;
        self
    }

    /// The escaping dialect. The default is `EscapeMode::Doubled`.
    pub fn escape_mode(&mut self, mode: EscapeMode) -> &mut WriterBuilder {
        self.settings.escape_mode = mode;
        self
    }

    /// The comment character written by `Writer::write_comment`.
    ///
    /// A first field starting with this character is quoted (or escaped)
    /// so that it does not read back as a comment. The default is `#`.
    pub fn comment(&mut self, comment: char) -> &mut WriterBuilder {
        self.settings.comment = comment;
        self
    }

    /// The record terminator to use when writing CSV.
    ///
    /// The default, `Terminator::CRLF`, writes `\r\n`.
    pub fn terminator(&mut self, term: Terminator) -> &mut WriterBuilder {
        self.settings.terminator = term;
        self
    }

    /// Quote every field, whether it needs it or not.
    pub fn force_qualifier(&mut self, yes: bool) -> &mut WriterBuilder {
        self.settings.force_qualifier = yes;
        self
    }

    /// The encoding of the bytes written. The default is UTF-8.
    pub fn encoding(&mut self, encoding: Encoding) -> &mut WriterBuilder {
        self.encoding = encoding;
        self
    }

    /// Set the capacity (in bytes) of the internal buffer used in the CSV
    /// writer. This defaults to a reasonable setting.
    pub fn buffer_capacity(&mut self, capacity: usize) -> &mut WriterBuilder {
        self.capacity = capacity;
        self
    }
}

/// A CSV writer.
///
/// Fields are pushed one at a time with `write_field` and records are
/// completed with `end_record`, or a whole record is written at once with
/// `write_record`.
///
/// The writer is buffered. Dropping it flushes the buffer, but errors are
/// then ignored, so call `flush` or `close` to observe them.
#[derive(Debug)]
pub struct Writer<W: io::Write> {
    wtr: Option<io::BufWriter<W>>,
    settings: WriterSettings,
    encoder: Encoder,
    encoding: Encoding,
    first: bool,
    text: String,
    bytes: Vec<u8>,
    res: Resource,
}

impl<W: io::Write> Drop for Writer<W> {
    fn drop(&mut self) {
        if let Some(ref mut wtr) = self.wtr {
            let _ = wtr.flush();
        }
    }
}

impl Writer<File> {
    /// Build a CSV writer with a default configuration that writes data to
    /// the file at `path`.
    ///
    /// The file is created if it does not exist and truncated if it does.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Writer<File>> {
        WriterBuilder::new().from_path(path)
    }
}

impl<W: io::Write> Writer<W> {
    /// Build a CSV writer with a default configuration that writes data to
    /// `wtr`.
    pub fn from_writer(wtr: W) -> Writer<W> {
        Writer::new(&WriterBuilder::new(), wtr)
    }

    fn new(builder: &WriterBuilder, wtr: W) -> Writer<W> {
        Writer {
            wtr: Some(io::BufWriter::with_capacity(builder.capacity, wtr)),
            settings: builder.settings.clone(),
            encoder: Encoder::new(&builder.settings),
            encoding: builder.encoding,
            first: true,
            text: String::new(),
            bytes: vec![],
            res: Resource::new("writer"),
        }
    }

    /// Write a single field.
    ///
    /// Leading and trailing spaces and tabs are trimmed unless
    /// `preserve_spaces` is set, in which case a field with such spaces is
    /// quoted so that a reader keeps them.
    pub fn write_field(
        &mut self,
        field: &str,
        preserve_spaces: bool,
    ) -> Result<()> {
        self.res.check()?;
        self.text.clear();
        if !self.first {
            self.text.push(self.encoder.delimiter());
        }
        self.encoder.field(field, self.first, preserve_spaces, &mut self.text);
        self.first = false;
        self.write_text()
    }

    /// Write a single record followed by the record terminator.
    ///
    /// An empty record writes nothing at all.
    ///
    /// # Example
    ///
    /// ```
    /// use textcsv::Writer;
    ///
    /// # fn main() { example().unwrap(); }
    /// fn example() -> textcsv::Result<()> {
    ///     let mut wtr = Writer::from_writer(vec![]);
    ///     wtr.write_record(&["a", "b,c"], false)?;
    ///     wtr.write_record(Vec::<String>::new(), false)?;
    ///     wtr.write_record(vec![String::from(" x ")], true)?;
    ///
    ///     let data = String::from_utf8(wtr.into_inner()?).unwrap();
    ///     assert_eq!(data, "a,\"b,c\"\r\n\" x \"\r\n");
    ///     Ok(())
    /// }
    /// ```
    pub fn write_record<I, T>(
        &mut self,
        record: I,
        preserve_spaces: bool,
    ) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut any = false;
        for field in record {
            self.write_field(field.as_ref(), preserve_spaces)?;
            any = true;
        }
        if any {
            self.end_record()?;
        }
        Ok(())
    }

    /// Write the record terminator.
    pub fn end_record(&mut self) -> Result<()> {
        self.res.check()?;
        self.text.clear();
        self.encoder.terminator(&mut self.text);
        self.first = true;
        self.write_text()
    }

    /// Write a comment line: the comment character, `comment` and the
    /// record terminator.
    ///
    /// A record in progress is not terminated first.
    pub fn write_comment(&mut self, comment: &str) -> Result<()> {
        self.res.check()?;
        self.text.clear();
        self.text.push(self.encoder.comment());
        self.text.push_str(comment);
        self.encoder.terminator(&mut self.text);
        self.first = true;
        self.write_text()
    }

    /// Flush the contents of the internal buffer to the underlying writer.
    pub fn flush(&mut self) -> Result<()> {
        self.res.check()?;
        let result = match self.wtr {
            Some(ref mut wtr) => wtr.flush(),
            None => Ok(()),
        };
        self.guard(result)
    }

    /// Flush and release the underlying writer.
    ///
    /// Closing is idempotent. Every later write fails with `Error::Closed`.
    pub fn close(&mut self) -> Result<()> {
        if !self.res.close() {
            return Ok(());
        }
        self.text = String::new();
        self.bytes = vec![];
        match self.wtr.take() {
            Some(mut wtr) => Ok(wtr.flush()?),
            None => Ok(()),
        }
    }

    /// Whether this writer has been closed.
    pub fn is_closed(&self) -> bool {
        self.res.is_closed()
    }

    /// The settings this writer was built with.
    pub fn settings(&self) -> &WriterSettings {
        &self.settings
    }

    /// Flush the internal buffer and return the underlying writer.
    pub fn into_inner(mut self) -> Result<W> {
        self.res.check()?;
        match self.wtr.take() {
            Some(wtr) => {
                wtr.into_inner().map_err(|err| Error::Io(err.into_error()))
            }
            None => Err(Error::Closed),
        }
    }

    fn write_text(&mut self) -> Result<()> {
        self.bytes.clear();
        self.encoding.encode(&self.text, &mut self.bytes);
        let result = match self.wtr {
            Some(ref mut wtr) => wtr.write_all(&self.bytes),
            None => Ok(()),
        };
        self.guard(result)
    }

    fn guard(&mut self, result: io::Result<()>) -> Result<()> {
        if let Err(err) = result {
            debug!("closing CSV writer after error: {}", err);
            self.res.close();
            self.wtr = None;
            return Err(Error::Io(err));
        }
        Ok(())
    }
}
