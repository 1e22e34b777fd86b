use std::fmt;
use std::iter::FromIterator;
use std::ops;

/// The columns of the record being parsed.
///
/// Slots are reused across records, so parsing a file with a steady column
/// count stops allocating after the first few records. The number of live
/// columns is tracked separately from the number of slots.
#[derive(Clone, Debug)]
pub(crate) struct Values {
    values: Vec<String>,
    qualified: Vec<bool>,
    len: usize,
}

const INITIAL_SLOTS: usize = 10;

impl Values {
    pub(crate) fn new() -> Values {
        Values {
            values: vec![String::new(); INITIAL_SLOTS],
            qualified: vec![false; INITIAL_SLOTS],
            len: 0,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn clear(&mut self) {
        self.len = 0;
    }

    pub(crate) fn release(&mut self) {
        self.values = vec![];
        self.qualified = vec![];
        self.len = 0;
    }

    /// Appends a column built from `chars`.
    pub(crate) fn push(&mut self, chars: &[char], qualified: bool) {
        if self.len == self.values.len() {
            let grown = (self.values.len() * 2).max(INITIAL_SLOTS);
            self.values.resize(grown, String::new());
            self.qualified.resize(grown, false);
        }
        let slot = &mut self.values[self.len];
        slot.clear();
        slot.extend(chars);
        self.qualified[self.len] = qualified;
        self.len += 1;
    }

    pub(crate) fn get(&self, i: usize) -> Option<&str> {
        self.as_slice().get(i).map(|s| &**s)
    }

    pub(crate) fn is_qualified(&self, i: usize) -> Option<bool> {
        self.qualified[..self.len].get(i).cloned()
    }

    pub(crate) fn as_slice(&self) -> &[String] {
        &self.values[..self.len]
    }
}

/// An owned CSV record.
///
/// All fields are stored in one contiguous string. A record remembers the
/// ordinal it was read at, if it was read by a reader. Equality compares
/// fields only.
#[derive(Clone, Default)]
pub struct StringRecord {
    fields: String,
    ends: Vec<usize>,
    position: Option<u64>,
}

impl StringRecord {
    /// Create a new empty `StringRecord`.
    pub fn new() -> StringRecord {
        StringRecord::default()
    }

    pub(crate) fn from_values(
        values: &[String],
        position: u64,
    ) -> StringRecord {
        let mut record = StringRecord {
            fields: String::with_capacity(values.iter().map(|v| v.len()).sum()),
            ends: Vec::with_capacity(values.len()),
            position: Some(position),
        };
        for v in values {
            record.push_field(v);
        }
        record
    }

    /// Return the field at index `i`.
    ///
    /// If no field at index `i` exists, then this returns `None`.
    pub fn get(&self, i: usize) -> Option<&str> {
        let end = match self.ends.get(i) {
            None => return None,
            Some(&end) => end,
        };
        let start = if i == 0 { 0 } else { self.ends[i - 1] };
        Some(&self.fields[start..end])
    }

    /// Returns true if and only if this record is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of fields in this record.
    pub fn len(&self) -> usize {
        self.ends.len()
    }

    /// The zero based ordinal of this record in its input, if it was read
    /// by a reader. Header rows are not counted.
    pub fn position(&self) -> Option<u64> {
        self.position
    }

    /// Add a new field to this record.
    pub fn push_field(&mut self, field: &str) {
        self.fields.push_str(field);
        self.ends.push(self.fields.len());
    }

    /// Clear this record so that it has zero fields.
    pub fn clear(&mut self) {
        self.fields.clear();
        self.ends.clear();
        self.position = None;
    }

    /// Returns an iterator over all fields in this record.
    pub fn iter(&self) -> StringRecordIter {
        StringRecordIter { record: self, i: 0 }
    }
}

impl fmt::Debug for StringRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "StringRecord(")?;
        f.debug_list().entries(self.iter()).finish()?;
        write!(f, ")")
    }
}

impl PartialEq for StringRecord {
    fn eq(&self, other: &StringRecord) -> bool {
        self.fields == other.fields && self.ends == other.ends
    }
}

impl Eq for StringRecord {}

impl ops::Index<usize> for StringRecord {
    type Output = str;

    fn index(&self, i: usize) -> &str {
        match self.get(i) {
            Some(field) => field,
            None => panic!(
                "field index {} out of bounds for record with {} fields",
                i,
                self.len()
            ),
        }
    }
}

impl<T: AsRef<str>> From<Vec<T>> for StringRecord {
    fn from(fields: Vec<T>) -> StringRecord {
        StringRecord::from_iter(fields)
    }
}

impl<'a, T: AsRef<str>> From<&'a [T]> for StringRecord {
    fn from(fields: &'a [T]) -> StringRecord {
        StringRecord::from_iter(fields)
    }
}

impl<T: AsRef<str>> FromIterator<T> for StringRecord {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> StringRecord {
        let mut record = StringRecord::new();
        for field in iter {
            record.push_field(field.as_ref());
        }
        record
    }
}

impl<T: AsRef<str>> PartialEq<Vec<T>> for StringRecord {
    fn eq(&self, other: &Vec<T>) -> bool {
        self.len() == other.len()
            && self.iter().zip(other).all(|(a, b)| a == b.as_ref())
    }
}

impl<T: AsRef<str>> PartialEq<[T]> for StringRecord {
    fn eq(&self, other: &[T]) -> bool {
        self.len() == other.len()
            && self.iter().zip(other).all(|(a, b)| a == b.as_ref())
    }
}

impl<'a> IntoIterator for &'a StringRecord {
    type IntoIter = StringRecordIter<'a>;
    type Item = &'a str;

    fn into_iter(self) -> StringRecordIter<'a> {
        self.iter()
    }
}

/// An iterator over the fields in a string record.
pub struct StringRecordIter<'a> {
    record: &'a StringRecord,
    i: usize,
}

impl<'a> Iterator for StringRecordIter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        match self.record.get(self.i) {
            None => None,
            Some(field) => {
                self.i += 1;
                Some(field)
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.record.len() - self.i;
        (n, Some(n))
    }
}

impl<'a> ExactSizeIterator for StringRecordIter<'a> {}

#[cfg(test)]
mod tests {
    use super::{StringRecord, Values};

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn values_reuse_slots() {
        let mut vals = Values::new();
        for i in 0..25 {
            vals.push(&chars(&i.to_string()), i % 2 == 0);
        }
        assert_eq!(vals.len(), 25);
        assert_eq!(vals.get(24), Some("24"));
        assert_eq!(vals.is_qualified(3), Some(false));
        assert_eq!(vals.is_qualified(4), Some(true));

        vals.clear();
        assert_eq!(vals.get(0), None);
        assert_eq!(vals.is_qualified(0), None);
        vals.push(&chars("x"), false);
        assert_eq!(vals.as_slice(), &["x".to_string()][..]);
    }

    #[test]
    fn record_fields() {
        let rec = StringRecord::from(vec!["a", "", "ccc"]);
        assert_eq!(rec.len(), 3);
        assert_eq!(rec.get(0), Some("a"));
        assert_eq!(rec.get(1), Some(""));
        assert_eq!(&rec[2], "ccc");
        assert_eq!(rec.get(3), None);
        assert_eq!(rec.position(), None);
        assert_eq!(rec, vec!["a", "", "ccc"]);
        assert_eq!(rec.iter().collect::<Vec<_>>(), vec!["a", "", "ccc"]);
        assert_eq!(format!("{:?}", rec), r#"StringRecord(["a", "", "ccc"])"#);
    }

    #[test]
    fn record_from_values() {
        let rec = StringRecord::from_values(&["x".to_string()], 7);
        assert_eq!(rec.position(), Some(7));
        assert_eq!(rec, vec!["x"]);
        assert!(StringRecord::new().is_empty());
    }
}
