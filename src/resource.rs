use log::debug;

use crate::error::{Error, Result};

/// The open/closed lifecycle shared by readers and writers.
///
/// Closing is idempotent. Once closed, `check` fails with `Error::Closed`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Resource {
    name: &'static str,
    closed: bool,
}

impl Resource {
    pub(crate) fn new(name: &'static str) -> Resource {
        Resource { name: name, closed: false }
    }

    #[inline]
    pub(crate) fn check(&self) -> Result<()> {
        if self.closed {
            Err(Error::Closed)
        } else {
            Ok(())
        }
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed
    }

    /// Marks the resource closed. Returns false if it already was.
    pub(crate) fn close(&mut self) -> bool {
        if self.closed {
            return false;
        }
        debug!("closing CSV {}", self.name);
        self.closed = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::Resource;

    #[test]
    fn close_is_idempotent() {
        let mut res = Resource::new("reader");
        assert!(res.check().is_ok());
        assert!(res.close());
        assert!(!res.close());
        assert!(res.is_closed());
        assert!(res.check().unwrap_err().is_closed());
    }
}
