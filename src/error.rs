use std::error;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::result;

/// A type alias for `Result<T, textcsv::Error>`.
pub type Result<T> = result::Result<T, Error>;

/// An error that can occur when processing CSV data.
///
/// This error can happen when writing or reading CSV data. Errors are never
/// retried internally. After a `LimitExceeded` or `Io` error on a reader,
/// the reader has been closed and every later call returns `Closed`.
#[derive(Debug)]
pub enum Error {
    /// An I/O error that occurred while reading or writing CSV data.
    Io(io::Error),
    /// A reader or writer was configured with values that cannot work
    /// together, e.g., a delimiter equal to the text qualifier.
    InvalidArgument(String),
    /// The file backing a reader does not exist.
    NotFound(PathBuf),
    /// A safety limit was exceeded while the safety switch was enabled.
    LimitExceeded {
        /// Which limit was exceeded.
        limit: Limit,
        /// The zero based index of the record being parsed.
        record: u64,
        /// The zero based index of the column being parsed.
        column: usize,
    },
    /// The reader or writer was used after it was closed.
    Closed,
}

/// The bounded resources guarded by the safety switch.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Limit {
    /// The number of columns in a single record.
    Columns,
    /// The number of characters in a single column.
    ColumnLength,
}

impl Limit {
    /// The largest value permitted for this resource.
    pub fn max(&self) -> usize {
        match *self {
            Limit::Columns => 100_000,
            Limit::ColumnLength => 100_000,
        }
    }
}

impl Error {
    /// Returns true if this error was caused by a safety limit.
    pub fn is_limit(&self) -> bool {
        match *self {
            Error::LimitExceeded { .. } => true,
            _ => false,
        }
    }

    /// Returns true if this error was caused by using a closed reader or
    /// writer.
    pub fn is_closed(&self) -> bool {
        match *self {
            Error::Closed => true,
            _ => false,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::Io(ref err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Io(ref err) => err.fmt(f),
            Error::InvalidArgument(ref msg) => {
                write!(f, "CSV error: invalid argument: {}", msg)
            }
            Error::NotFound(ref path) => {
                write!(f, "CSV error: file {} does not exist", path.display())
            }
            Error::LimitExceeded { limit: Limit::Columns, record, .. } => {
                write!(
                    f,
                    "CSV parse error: maximum column count of {} exceeded \
                     in record {}; disable the safety switch if more \
                     columns per record are expected",
                    Limit::Columns.max(),
                    record
                )
            }
            Error::LimitExceeded {
                limit: Limit::ColumnLength,
                record,
                column,
            } => write!(
                f,
                "CSV parse error: maximum column length of {} exceeded \
                 in column {} in record {}; disable the safety switch if \
                 longer columns are expected",
                Limit::ColumnLength.max(),
                column,
                record
            ),
            Error::Closed => write!(
                f,
                "CSV error: this object has been closed and can no longer \
                 be used"
            ),
        }
    }
}
