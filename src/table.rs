use std::io;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::reader::Reader;
use crate::source::CharRead;
use crate::writer::Writer;

/// An in-memory table of string values.
///
/// Every row has exactly one value per column. Column names are unique
/// when compared case insensitively; names that would break this rule
/// are replaced with generated `ColumnN` names, where `N` is the one based
/// column position.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Create an empty table with no columns.
    pub fn new() -> Table {
        Table::default()
    }

    /// Create an empty table with the column names given.
    ///
    /// An empty name becomes `ColumnN`. At the first name that repeats an
    /// earlier one (ignoring case), every column, earlier ones included,
    /// is named `ColumnN` instead.
    ///
    /// # Example
    ///
    /// ```
    /// use textcsv::Table;
    ///
    /// let table = Table::with_columns(vec!["id", "", "name"]);
    /// assert_eq!(table.columns(), &["id", "Column2", "name"]);
    ///
    /// let table = Table::with_columns(vec!["a", "b", "A", "c"]);
    /// assert_eq!(
    ///     table.columns(),
    ///     &["Column1", "Column2", "Column3", "Column4"],
    /// );
    /// ```
    pub fn with_columns<I, S>(names: I) -> Table
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = Table::new();
        let mut unique = true;
        for (i, name) in names.into_iter().enumerate() {
            if unique {
                let name = name.as_ref();
                let name = if name.is_empty() {
                    column_name(i)
                } else {
                    name.to_string()
                };
                if table.column_index(&name).is_none() {
                    table.columns.push(name);
                    continue;
                }
                for (j, earlier) in table.columns.iter_mut().enumerate() {
                    *earlier = column_name(j);
                }
                unique = false;
            }
            table.columns.push(column_name(i));
        }
        table
    }

    /// The column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The rows.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// The number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if this table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The position of the column named `name`, ignoring case.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let name = name.to_lowercase();
        self.columns.iter().position(|c| c.to_lowercase() == name)
    }

    /// The value at `row` in the column at position `column`.
    pub fn get(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(column)).map(|v| &**v)
    }

    /// The value at `row` in the column named `name`.
    pub fn get_by_name(&self, row: usize, name: &str) -> Option<&str> {
        self.column_index(name).and_then(|i| self.get(row, i))
    }

    /// Append a row.
    ///
    /// A short row is padded with empty values. A long row adds `ColumnN`
    /// columns, and every earlier row gets an empty value for them.
    pub fn push_row<I, S>(&mut self, row: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut row: Vec<String> = row.into_iter().map(Into::into).collect();
        if row.len() > self.columns.len() {
            for i in self.columns.len()..row.len() {
                self.columns.push(column_name(i));
            }
            let width = self.columns.len();
            for earlier in &mut self.rows {
                earlier.resize(width, String::new());
            }
        }
        row.resize(self.columns.len(), String::new());
        self.rows.push(row);
    }
}

fn column_name(i: usize) -> String {
    let mut buf = itoa::Buffer::new();
    let mut name = String::with_capacity(10);
    name.push_str("Column");
    name.push_str(buf.format(i + 1));
    name
}

impl<R: CharRead> Reader<R> {
    /// Read all remaining records into a table.
    ///
    /// When `has_headers` is set, the first record names the columns. At
    /// most `max_records` data records are read when a limit is given.
    ///
    /// # Example
    ///
    /// ```
    /// use textcsv::Reader;
    ///
    /// # fn main() { example().unwrap(); }
    /// fn example() -> textcsv::Result<()> {
    ///     let mut rdr = Reader::from_text("name,age\nann,41\nbob\ncid,7,x\n");
    ///     let table = rdr.read_table(true, None)?;
    ///     assert_eq!(table.columns(), &["name", "age", "Column3"]);
    ///     assert_eq!(table.rows()[1], vec!["bob", "", ""]);
    ///     assert_eq!(table.get_by_name(2, "AGE"), Some("7"));
    ///     Ok(())
    /// }
    /// ```
    pub fn read_table(
        &mut self,
        has_headers: bool,
        max_records: Option<u64>,
    ) -> Result<Table> {
        let mut table = if has_headers {
            self.read_headers()?;
            Table::with_columns(self.headers())
        } else {
            Table::new()
        };
        let mut read = 0;
        while max_records.map_or(true, |max| read < max)
            && self.read_record()?
        {
            table.push_row(self.values().iter().cloned());
            read += 1;
        }
        Ok(table)
    }
}

impl<W: io::Write> Writer<W> {
    /// Write a table, optionally preceded by a record of column names, and
    /// flush.
    pub fn write_table(
        &mut self,
        table: &Table,
        write_headers: bool,
    ) -> Result<()> {
        if write_headers {
            self.write_record(table.columns(), false)?;
        }
        for row in table.rows() {
            self.write_record(row, false)?;
        }
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::Table;

    #[test]
    fn empty_and_duplicate_names() {
        let t = Table::with_columns(vec!["", "b"]);
        assert_eq!(t.columns(), &["Column1", "b"]);

        let t = Table::with_columns(vec!["x", "y", "z", "Y", "", "w"]);
        assert_eq!(
            t.columns(),
            &["Column1", "Column2", "Column3", "Column4", "Column5", "Column6"]
        );

        let t = Table::with_columns(Vec::<String>::new());
        assert!(t.columns().is_empty());
    }

    #[test]
    fn ragged_rows() {
        let mut t = Table::with_columns(vec!["a"]);
        t.push_row(vec!["1"]);
        t.push_row(vec!["2", "3", "4"]);
        t.push_row(Vec::<String>::new());
        assert_eq!(t.columns(), &["a", "Column2", "Column3"]);
        assert_eq!(t.rows()[0], vec!["1", "", ""]);
        assert_eq!(t.rows()[1], vec!["2", "3", "4"]);
        assert_eq!(t.rows()[2], vec!["", "", ""]);
        assert_eq!(t.get(1, 2), Some("4"));
        assert_eq!(t.get(3, 0), None);
        assert_eq!(t.get_by_name(1, "column2"), Some("3"));
        assert_eq!(t.len(), 3);
    }
}
