use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;

use crate::encoding::Encoding;
use crate::error::{Error, Result};

const BYTE_BUF_SIZE: usize = 8 * 1024;

/// A source of characters for a CSV reader.
///
/// This is the only contract the tokenizer has with its input: fill a
/// buffer with characters and return how many were written. Returning `0`
/// signals the end of the data, after which a source is never read again.
pub trait CharRead {
    /// Reads characters into `buf`, returning how many were read.
    fn read_chars(&mut self, buf: &mut [char]) -> io::Result<usize>;
}

impl<'a, C: CharRead + ?Sized> CharRead for &'a mut C {
    fn read_chars(&mut self, buf: &mut [char]) -> io::Result<usize> {
        (**self).read_chars(buf)
    }
}

impl<C: CharRead + ?Sized> CharRead for Box<C> {
    fn read_chars(&mut self, buf: &mut [char]) -> io::Result<usize> {
        (**self).read_chars(buf)
    }
}

/// Decodes characters from any `io::Read`.
///
/// Multi-byte sequences split across reads are reassembled. When byte order
/// mark detection is enabled (the default), a leading mark is consumed and
/// selects the encoding, overriding the configured one.
#[derive(Debug)]
pub struct DecodeReader<R> {
    rdr: R,
    encoding: Encoding,
    detect_bom: bool,
    buf: Vec<u8>,
    start: usize,
    end: usize,
    eof: bool,
}

impl<R: io::Read> DecodeReader<R> {
    /// Decodes UTF-8 from `rdr`, honoring a byte order mark.
    pub fn new(rdr: R) -> DecodeReader<R> {
        DecodeReader::with_encoding(rdr, Encoding::Utf8, true)
    }

    /// Decodes `rdr` with the encoding given.
    pub fn with_encoding(
        rdr: R,
        encoding: Encoding,
        detect_bom: bool,
    ) -> DecodeReader<R> {
        DecodeReader {
            rdr: rdr,
            encoding: encoding,
            detect_bom: detect_bom,
            buf: vec![0; BYTE_BUF_SIZE],
            start: 0,
            end: 0,
            eof: false,
        }
    }

    /// The encoding in use. After the first read, this reflects a detected
    /// byte order mark.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Returns the underlying reader, discarding buffered bytes.
    pub fn into_inner(self) -> R {
        self.rdr
    }

    fn fill_bytes(&mut self) -> io::Result<()> {
        if self.start > 0 {
            self.buf.copy_within(self.start..self.end, 0);
            self.end -= self.start;
            self.start = 0;
        }
        loop {
            match self.rdr.read(&mut self.buf[self.end..]) {
                Ok(0) => {
                    self.eof = true;
                    return Ok(());
                }
                Ok(n) => {
                    self.end += n;
                    return Ok(());
                }
                Err(ref err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err),
            }
        }
    }

    fn sniff_bom(&mut self) -> io::Result<()> {
        self.detect_bom = false;
        while self.end - self.start < 3 && !self.eof {
            self.fill_bytes()?;
        }
        if let Some((enc, len)) =
            Encoding::from_bom(&self.buf[self.start..self.end])
        {
            debug!("detected byte order mark for {:?}", enc);
            self.encoding = enc;
            self.start += len;
        }
        Ok(())
    }
}

impl<R: io::Read> CharRead for DecodeReader<R> {
    fn read_chars(&mut self, out: &mut [char]) -> io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }
        if self.detect_bom {
            self.sniff_bom()?;
        }
        loop {
            let (consumed, produced) = self.encoding.decode(
                &self.buf[self.start..self.end],
                self.eof,
                out,
            );
            self.start += consumed;
            if produced > 0 || self.eof {
                return Ok(produced);
            }
            self.fill_bytes()?;
        }
    }
}

/// A character source backed by a file that is opened on first read.
///
/// The file's existence is checked when the source is created.
#[derive(Debug)]
pub struct PathSource {
    path: PathBuf,
    encoding: Encoding,
    detect_bom: bool,
    file: Option<DecodeReader<fs::File>>,
}

impl PathSource {
    /// Creates a UTF-8 source for the file at `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<PathSource> {
        PathSource::with_encoding(path, Encoding::Utf8, true)
    }

    /// Creates a source for the file at `path` with the encoding given.
    pub fn with_encoding<P: AsRef<Path>>(
        path: P,
        encoding: Encoding,
        detect_bom: bool,
    ) -> Result<PathSource> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(Error::NotFound(path));
        }
        Ok(PathSource {
            path: path,
            encoding: encoding,
            detect_bom: detect_bom,
            file: None,
        })
    }

    /// The path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the backing file has been opened yet.
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }
}

impl CharRead for PathSource {
    fn read_chars(&mut self, buf: &mut [char]) -> io::Result<usize> {
        if self.file.is_none() {
            debug!("opening {}", self.path.display());
            let file = fs::File::open(&self.path)?;
            self.file = Some(DecodeReader::with_encoding(
                file,
                self.encoding,
                self.detect_bom,
            ));
        }
        match self.file {
            Some(ref mut file) => file.read_chars(buf),
            None => Ok(0),
        }
    }
}

/// A character source over in-memory text.
#[derive(Clone, Debug)]
pub struct TextSource {
    text: String,
    pos: usize,
}

impl TextSource {
    /// Creates a source that yields the characters of `text`.
    pub fn new<S: Into<String>>(text: S) -> TextSource {
        TextSource { text: text.into(), pos: 0 }
    }
}

impl CharRead for TextSource {
    fn read_chars(&mut self, buf: &mut [char]) -> io::Result<usize> {
        let mut n = 0;
        for (slot, c) in buf.iter_mut().zip(self.text[self.pos..].chars()) {
            *slot = c;
            self.pos += c.len_utf8();
            n += 1;
        }
        Ok(n)
    }
}
