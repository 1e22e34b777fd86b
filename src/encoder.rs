use crate::settings::{EscapeMode, Terminator, WriterSettings};

/// Decides how each field is quoted and escaped.
#[derive(Clone, Debug)]
pub(crate) struct Encoder {
    delimiter: char,
    qualifier: char,
    use_qualifier: bool,
    escape_mode: EscapeMode,
    comment: char,
    term: Terminator,
    force: bool,
}

impl Encoder {
    pub(crate) fn new(settings: &WriterSettings) -> Encoder {
        Encoder {
            delimiter: settings.delimiter,
            qualifier: settings.text_qualifier,
            use_qualifier: settings.use_text_qualifier,
            escape_mode: settings.escape_mode,
            comment: settings.comment,
            term: settings.terminator,
            force: settings.force_qualifier,
        }
    }

    /// Appends `field` to `out`, quoted and escaped as needed.
    ///
    /// `first` is true for the first field of a record.
    pub(crate) fn field(
        &self,
        field: &str,
        first: bool,
        preserve_spaces: bool,
        out: &mut String,
    ) {
        let field = if preserve_spaces {
            field
        } else {
            field.trim_matches(is_space)
        };
        if self.should_quote(field, first, preserve_spaces) {
            self.quoted(field, out);
        } else if self.escape_mode == EscapeMode::Backslash {
            self.escaped(field, first, out);
        } else {
            out.push_str(field);
        }
    }

    /// Appends the record terminator to `out`.
    pub(crate) fn terminator(&self, out: &mut String) {
        match self.term {
            Terminator::CRLF => out.push_str("\r\n"),
            Terminator::Any(c) => out.push(c),
        }
    }

    pub(crate) fn delimiter(&self) -> char {
        self.delimiter
    }

    pub(crate) fn comment(&self) -> char {
        self.comment
    }

    fn should_quote(&self, field: &str, first: bool, preserve: bool) -> bool {
        if self.force {
            return true;
        }
        if !self.use_qualifier {
            return false;
        }
        if field.chars().any(|c| self.needs_quotes(c)) {
            return true;
        }
        // An empty first field would otherwise write an empty line, and a
        // leading comment character would read back as a comment.
        if first && (field.is_empty() || field.starts_with(self.comment)) {
            return true;
        }
        preserve
            && (field.starts_with(is_space) || field.ends_with(is_space))
    }

    fn needs_quotes(&self, c: char) -> bool {
        c == self.delimiter || c == self.qualifier || self.term.is_term(c)
    }

    fn quoted(&self, field: &str, out: &mut String) {
        out.push(self.qualifier);
        for c in field.chars() {
            if self.escape_mode == EscapeMode::Backslash {
                if c == '\\' || c == self.qualifier {
                    out.push('\\');
                }
            } else if c == self.qualifier {
                out.push(self.qualifier);
            }
            out.push(c);
        }
        out.push(self.qualifier);
    }

    fn escaped(&self, field: &str, first: bool, out: &mut String) {
        for (i, c) in field.chars().enumerate() {
            if c == '\\'
                || c == self.delimiter
                || self.term.is_term(c)
                || (first && i == 0 && c == self.comment)
            {
                out.push('\\');
            }
            out.push(c);
        }
    }
}

fn is_space(c: char) -> bool {
    c == ' ' || c == '\t'
}

#[cfg(test)]
mod tests {
    use super::Encoder;
    use crate::settings::{EscapeMode, Terminator, WriterSettings};

    fn enc(
        settings: &WriterSettings,
        field: &str,
        first: bool,
        pre: bool,
    ) -> String {
        let mut out = String::new();
        Encoder::new(settings).field(field, first, pre, &mut out);
        out
    }

    #[test]
    fn quoting_decisions() {
        let s = WriterSettings::default();
        assert_eq!(enc(&s, "plain", false, false), "plain");
        assert_eq!(enc(&s, "  padded\t", false, false), "padded");
        assert_eq!(enc(&s, " padded", false, true), "\" padded\"");
        assert_eq!(enc(&s, "a,b", false, false), "\"a,b\"");
        assert_eq!(enc(&s, "a\"b", false, false), "\"a\"\"b\"");
        assert_eq!(enc(&s, "a\nb", false, false), "\"a\nb\"");
        assert_eq!(enc(&s, "", true, false), "\"\"");
        assert_eq!(enc(&s, "", false, false), "");
        assert_eq!(enc(&s, "#x", true, false), "\"#x\"");
        assert_eq!(enc(&s, "#x", false, false), "#x");
    }

    #[test]
    fn forced_and_disabled_qualifier() {
        let mut s = WriterSettings::default();
        s.force_qualifier = true;
        assert_eq!(enc(&s, "x", false, false), "\"x\"");

        let mut s = WriterSettings::default();
        s.use_text_qualifier = false;
        assert_eq!(enc(&s, "a,b", false, false), "a,b");
        assert_eq!(enc(&s, "", true, false), "");
    }

    #[test]
    fn custom_terminator() {
        let mut s = WriterSettings::default();
        s.terminator = Terminator::Any(';');
        assert_eq!(enc(&s, "a;b", false, false), "\"a;b\"");
        assert_eq!(enc(&s, "a\nb", false, false), "a\nb");
    }

    #[test]
    fn backslash_escapes() {
        let mut s = WriterSettings::default();
        s.escape_mode = EscapeMode::Backslash;
        assert_eq!(enc(&s, "a\"b\\c", false, false), "\"a\\\"b\\\\c\"");
        assert_eq!(enc(&s, "a\\b", false, false), "a\\\\b");

        s.use_text_qualifier = false;
        assert_eq!(enc(&s, "a,b\\", false, false), "a\\,b\\\\");
        assert_eq!(enc(&s, "a\r\nb", false, false), "a\\\r\\\nb");
        assert_eq!(enc(&s, "#a#", true, false), "\\#a#");
        assert_eq!(enc(&s, "#a", false, false), "#a");
    }
}
