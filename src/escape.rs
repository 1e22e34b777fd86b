//! Backslash escape decoding.
//!
//! After a backslash, one of three things happens:
//!
//! * a mnemonic (`a b e f n r t v`) decodes to a control character,
//! * a numeric literal starts (`\101`, `\d065`, `\o101`, `\x41` or `A`),
//! * or the character is taken verbatim, so `\,` is a literal comma.

/// The base of a numeric escape literal.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Radix {
    Octal,
    Decimal,
    Hex,
}

impl Radix {
    fn base(&self) -> u32 {
        match *self {
            Radix::Octal => 8,
            Radix::Decimal => 10,
            Radix::Hex => 16,
        }
    }
}

/// A numeric escape literal in progress.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Literal {
    radix: Radix,
    needed: u8,
    read: u8,
    value: u32,
}

/// What the character following a backslash means.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Escape {
    /// The escape is complete and decodes to this character.
    Char(char),
    /// A numeric literal has started. The introducing character is consumed.
    Literal(Literal),
    /// The character is data as is.
    Verbatim,
}

/// Interprets the character following a backslash.
pub(crate) fn start(c: char) -> Escape {
    match c {
        '0'..='7' => Escape::Literal(Literal {
            radix: Radix::Octal,
            needed: 3,
            read: 1,
            value: c as u32 - '0' as u32,
        }),
        'd' | 'D' => Escape::Literal(Literal::new(Radix::Decimal, 3)),
        'o' | 'O' => Escape::Literal(Literal::new(Radix::Octal, 3)),
        'u' | 'U' => Escape::Literal(Literal::new(Radix::Hex, 4)),
        'x' | 'X' => Escape::Literal(Literal::new(Radix::Hex, 2)),
        'a' => Escape::Char('\x07'),
        'b' => Escape::Char('\x08'),
        'e' => Escape::Char('\x1B'),
        'f' => Escape::Char('\x0C'),
        'n' => Escape::Char('\n'),
        'r' => Escape::Char('\r'),
        't' => Escape::Char('\t'),
        'v' => Escape::Char('\x0B'),
        _ => Escape::Verbatim,
    }
}

/// The outcome of feeding one character to a literal.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Digit {
    /// The character was a digit and more are needed.
    More,
    /// The character was the last digit; the literal decodes to this.
    Done(char),
    /// The character is not a digit of this literal. The literal ends with
    /// whatever it decoded to so far and the character is not consumed.
    End(Option<char>),
}

impl Literal {
    fn new(radix: Radix, needed: u8) -> Literal {
        Literal { radix: radix, needed: needed, read: 0, value: 0 }
    }

    /// Feeds the next character to this literal.
    pub(crate) fn step(&mut self, c: char) -> Digit {
        let digit = match c.to_digit(self.radix.base()) {
            None => return Digit::End(self.finish()),
            Some(digit) => digit,
        };
        self.value = self.value * self.radix.base() + digit;
        self.read += 1;
        if self.read >= self.needed {
            Digit::Done(decode(self.value))
        } else {
            Digit::More
        }
    }

    /// Ends the literal early. Yields nothing when no digit was read.
    pub(crate) fn finish(&self) -> Option<char> {
        if self.read == 0 {
            None
        } else {
            Some(decode(self.value))
        }
    }
}

fn decode(value: u32) -> char {
    std::char::from_u32(value).unwrap_or('\u{FFFD}')
}
