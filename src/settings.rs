#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How a literal qualifier (or other special character) is represented
/// inside a field.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EscapeMode {
    /// No escaping. A qualifier inside a quoted field always ends the
    /// quoted span.
    None,
    /// A qualifier is escaped by doubling it. e.g., `"` escapes to `""`.
    ///
    /// This is the default.
    Doubled,
    /// Backslash escapes, e.g., `\"`, `\n`, `\x41`, `é` or `\101`.
    Backslash,
}

impl Default for EscapeMode {
    fn default() -> EscapeMode {
        EscapeMode::Doubled
    }
}

/// A record terminator.
///
/// Ideally, this would just be a `char` like any other delimiter, but a
/// useful CSV parser must special case CRLF handling. Hence, this enum.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Terminator {
    /// Parses `\r`, `\n` or `\r\n` as a single record terminator. Writers
    /// emit `\r\n`.
    CRLF,
    /// Parses the character given as a record terminator.
    Any(char),
}

impl Terminator {
    /// Returns true if `c` terminates a record.
    #[inline]
    pub fn is_term(&self, c: char) -> bool {
        match *self {
            Terminator::CRLF => c == '\r' || c == '\n',
            Terminator::Any(t) => c == t,
        }
    }

    pub(crate) fn is_crlf(&self) -> bool {
        match *self {
            Terminator::CRLF => true,
            Terminator::Any(_) => false,
        }
    }
}

impl Default for Terminator {
    fn default() -> Terminator {
        Terminator::CRLF
    }
}

/// The configuration of a CSV reader.
///
/// Settings are fixed once a reader is built, with one exception: header
/// case sensitivity can be changed with `Reader::set_case_sensitive`.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ReaderSettings {
    pub(crate) delimiter: char,
    pub(crate) text_qualifier: char,
    pub(crate) use_text_qualifier: bool,
    pub(crate) escape_mode: EscapeMode,
    pub(crate) comment: char,
    pub(crate) use_comments: bool,
    pub(crate) terminator: Terminator,
    pub(crate) trim_whitespace: bool,
    pub(crate) skip_empty_records: bool,
    pub(crate) safety_switch: bool,
    pub(crate) capture_raw_record: bool,
    pub(crate) case_sensitive_headers: bool,
}

impl Default for ReaderSettings {
    fn default() -> ReaderSettings {
        ReaderSettings {
            delimiter: ',',
            text_qualifier: '"',
            use_text_qualifier: true,
            escape_mode: EscapeMode::Doubled,
            comment: '#',
            use_comments: false,
            terminator: Terminator::CRLF,
            trim_whitespace: true,
            skip_empty_records: true,
            safety_switch: true,
            capture_raw_record: true,
            case_sensitive_headers: true,
        }
    }
}

impl ReaderSettings {
    /// The field delimiter. The default is `,`.
    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// The quoting character. The default is `"`.
    pub fn text_qualifier(&self) -> char {
        self.text_qualifier
    }

    /// Whether the quoting character is recognized at all.
    pub fn use_text_qualifier(&self) -> bool {
        self.use_text_qualifier
    }

    /// The escaping dialect.
    pub fn escape_mode(&self) -> EscapeMode {
        self.escape_mode
    }

    /// The character that starts a comment line. The default is `#`.
    pub fn comment(&self) -> char {
        self.comment
    }

    /// Whether comment lines are recognized. Disabled by default.
    pub fn use_comments(&self) -> bool {
        self.use_comments
    }

    /// The record terminator.
    pub fn terminator(&self) -> Terminator {
        self.terminator
    }

    /// Whether leading and trailing spaces and tabs of unquoted columns are
    /// dropped.
    pub fn trim_whitespace(&self) -> bool {
        self.trim_whitespace
    }

    /// Whether lines with no content are skipped instead of producing a
    /// record with one empty column.
    pub fn skip_empty_records(&self) -> bool {
        self.skip_empty_records
    }

    /// Whether the column count and column length limits are enforced.
    pub fn safety_switch(&self) -> bool {
        self.safety_switch
    }

    /// Whether the raw text of each record is kept.
    pub fn capture_raw_record(&self) -> bool {
        self.capture_raw_record
    }

    /// Whether header names are compared case sensitively.
    pub fn case_sensitive_headers(&self) -> bool {
        self.case_sensitive_headers
    }

    pub(crate) fn validate(&self) -> Result<()> {
        check_dialect(
            self.delimiter,
            self.text_qualifier,
            self.use_text_qualifier,
            self.terminator,
        )?;
        if self.use_comments && self.comment == self.delimiter {
            return Err(Error::InvalidArgument(format!(
                "comment character {:?} is also the delimiter",
                self.comment
            )));
        }
        Ok(())
    }
}

/// The configuration of a CSV writer.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WriterSettings {
    pub(crate) delimiter: char,
    pub(crate) text_qualifier: char,
    pub(crate) use_text_qualifier: bool,
    pub(crate) escape_mode: EscapeMode,
    pub(crate) comment: char,
    pub(crate) terminator: Terminator,
    pub(crate) force_qualifier: bool,
}

impl Default for WriterSettings {
    fn default() -> WriterSettings {
        WriterSettings {
            delimiter: ',',
            text_qualifier: '"',
            use_text_qualifier: true,
            escape_mode: EscapeMode::Doubled,
            comment: '#',
            terminator: Terminator::CRLF,
            force_qualifier: false,
        }
    }
}

impl WriterSettings {
    /// The field delimiter. The default is `,`.
    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// The quoting character. The default is `"`.
    pub fn text_qualifier(&self) -> char {
        self.text_qualifier
    }

    /// Whether fields are ever quoted when not forced.
    pub fn use_text_qualifier(&self) -> bool {
        self.use_text_qualifier
    }

    /// The escaping dialect.
    pub fn escape_mode(&self) -> EscapeMode {
        self.escape_mode
    }

    /// The character written in front of comment lines.
    pub fn comment(&self) -> char {
        self.comment
    }

    /// The record terminator.
    pub fn terminator(&self) -> Terminator {
        self.terminator
    }

    /// Whether every field is quoted.
    pub fn force_qualifier(&self) -> bool {
        self.force_qualifier
    }

    pub(crate) fn validate(&self) -> Result<()> {
        check_dialect(
            self.delimiter,
            self.text_qualifier,
            self.use_text_qualifier,
            self.terminator,
        )
    }
}

fn check_dialect(
    delimiter: char,
    qualifier: char,
    use_qualifier: bool,
    term: Terminator,
) -> Result<()> {
    if use_qualifier && delimiter == qualifier {
        return Err(Error::InvalidArgument(format!(
            "delimiter {:?} is also the text qualifier",
            delimiter
        )));
    }
    if term.is_term(delimiter) {
        return Err(Error::InvalidArgument(format!(
            "delimiter {:?} is also the record terminator",
            delimiter
        )));
    }
    if use_qualifier && term.is_term(qualifier) {
        return Err(Error::InvalidArgument(format!(
            "text qualifier {:?} is also the record terminator",
            qualifier
        )));
    }
    Ok(())
}
