/*!
A streaming CSV reader and writer over characters.

The reader tokenizes one record at a time through a fixed capacity buffer,
so records of any length are read with bounded buffering. Quoting, escaping,
comments, the record terminator and whitespace trimming are configured with
`ReaderBuilder`; `WriterBuilder` configures the same dialect for output.

```
use textcsv::{ReaderBuilder, Terminator};

# fn main() { example().unwrap(); }
fn example() -> textcsv::Result<()> {
    let mut rdr = ReaderBuilder::new()
        .terminator(Terminator::Any(';'))
        .from_text("a,\"b;c\";d,e;")?;
    let mut rows = vec![];
    while rdr.read_record()? {
        rows.push(rdr.values().to_vec());
    }
    assert_eq!(rows, vec![vec!["a", "b;c"], vec!["d", "e"]]);
    Ok(())
}
```
*/

pub use crate::encoding::Encoding;
pub use crate::error::{Error, Limit, Result};
pub use crate::reader::{Reader, ReaderBuilder, StringRecords};
pub use crate::record::{StringRecord, StringRecordIter};
pub use crate::settings::{
    EscapeMode, ReaderSettings, Terminator, WriterSettings,
};
pub use crate::source::{CharRead, DecodeReader, PathSource, TextSource};
pub use crate::table::Table;
pub use crate::writer::{Writer, WriterBuilder};

mod buffer;
mod encoder;
mod encoding;
mod error;
mod escape;
mod headers;
mod reader;
mod record;
mod resource;
mod settings;
mod source;
mod table;
#[cfg(test)]
mod tests;
mod tokenizer;
mod writer;
