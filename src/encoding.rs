#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const REPLACEMENT: char = '\u{FFFD}';

/// A text encoding for CSV input and output.
///
/// Decoding is lossy: invalid input decodes to U+FFFD. Encoding to `Latin1`
/// writes `?` for characters outside of that character set.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Encoding {
    /// UTF-8. This is the default.
    Utf8,
    /// ISO-8859-1.
    Latin1,
    /// Little endian UTF-16.
    Utf16Le,
    /// Big endian UTF-16.
    Utf16Be,
}

impl Default for Encoding {
    fn default() -> Encoding {
        Encoding::Utf8
    }
}

impl Encoding {
    /// Detects a byte order mark at the start of `bytes`.
    ///
    /// Returns the encoding it names and the length of the mark.
    pub fn from_bom(bytes: &[u8]) -> Option<(Encoding, usize)> {
        if bytes.starts_with(b"\xEF\xBB\xBF") {
            Some((Encoding::Utf8, 3))
        } else if bytes.starts_with(b"\xFF\xFE") {
            Some((Encoding::Utf16Le, 2))
        } else if bytes.starts_with(b"\xFE\xFF") {
            Some((Encoding::Utf16Be, 2))
        } else {
            None
        }
    }

    /// Decodes as much of `input` into `out` as possible.
    ///
    /// Returns the number of bytes consumed and the number of characters
    /// written. When `eof` is false, an incomplete sequence at the end of
    /// `input` is left unconsumed so that it can be completed by the next
    /// read. When `eof` is true, all of `input` is consumed if `out` has
    /// room.
    pub fn decode(
        &self,
        input: &[u8],
        eof: bool,
        out: &mut [char],
    ) -> (usize, usize) {
        match *self {
            Encoding::Utf8 => decode_utf8(input, eof, out),
            Encoding::Latin1 => {
                let n = input.len().min(out.len());
                for (o, &b) in out.iter_mut().zip(&input[..n]) {
                    *o = b as char;
                }
                (n, n)
            }
            Encoding::Utf16Le => {
                decode_utf16(input, eof, out, u16::from_le_bytes)
            }
            Encoding::Utf16Be => {
                decode_utf16(input, eof, out, u16::from_be_bytes)
            }
        }
    }

    /// Encodes `text` and appends the bytes to `out`.
    pub fn encode(&self, text: &str, out: &mut Vec<u8>) {
        match *self {
            Encoding::Utf8 => out.extend_from_slice(text.as_bytes()),
            Encoding::Latin1 => {
                out.reserve(text.len());
                for c in text.chars() {
                    let cp = c as u32;
                    out.push(if cp <= 0xFF { cp as u8 } else { b'?' });
                }
            }
            Encoding::Utf16Le => {
                out.reserve(text.len() * 2);
                for unit in text.encode_utf16() {
                    out.extend_from_slice(&unit.to_le_bytes());
                }
            }
            Encoding::Utf16Be => {
                out.reserve(text.len() * 2);
                for unit in text.encode_utf16() {
                    out.extend_from_slice(&unit.to_be_bytes());
                }
            }
        }
    }
}

fn decode_utf8(input: &[u8], eof: bool, out: &mut [char]) -> (usize, usize) {
    let (mut consumed, mut produced) = (0, 0);
    while consumed < input.len() && produced < out.len() {
        let (ch, size) = bstr::decode_utf8(&input[consumed..]);
        match ch {
            Some(ch) => out[produced] = ch,
            None => {
                // A truncated sequence may be completed by the next read.
                if !eof && consumed + size == input.len() && size < 4 {
                    break;
                }
                out[produced] = REPLACEMENT;
            }
        }
        consumed += size;
        produced += 1;
    }
    (consumed, produced)
}

fn decode_utf16(
    input: &[u8],
    eof: bool,
    out: &mut [char],
    unit: fn([u8; 2]) -> u16,
) -> (usize, usize) {
    let (mut consumed, mut produced) = (0, 0);
    while produced < out.len() {
        let rest = &input[consumed..];
        if rest.len() < 2 {
            if eof && rest.len() == 1 {
                out[produced] = REPLACEMENT;
                consumed += 1;
                produced += 1;
            }
            break;
        }
        let first = unit([rest[0], rest[1]]);
        if (0xD800..0xDC00).contains(&first) {
            if rest.len() < 4 {
                if !eof {
                    break;
                }
                out[produced] = REPLACEMENT;
                consumed += 2;
                produced += 1;
                continue;
            }
            let second = unit([rest[2], rest[3]]);
            if (0xDC00..0xE000).contains(&second) {
                let cp = 0x10000
                    + (((first as u32) - 0xD800) << 10)
                    + ((second as u32) - 0xDC00);
                out[produced] = std::char::from_u32(cp).unwrap_or(REPLACEMENT);
                consumed += 4;
            } else {
                out[produced] = REPLACEMENT;
                consumed += 2;
            }
        } else {
            out[produced] =
                std::char::from_u32(first as u32).unwrap_or(REPLACEMENT);
            consumed += 2;
        }
        produced += 1;
    }
    (consumed, produced)
}
