//! Append Log Iterator
//!
//! Sequential forward scan over every record in the log.

use crate::error::Result;
use crate::record::Record;

use super::AppendLog;

/// Iterator over `(offset, record)` pairs in write order
///
/// Ends cleanly at the end of the log. Any other error is yielded once and
/// ends the scan.
pub struct LogIterator<'a> {
    log: &'a AppendLog,
    /// Offset of the next record to read
    offset: u64,
    done: bool,
}

impl<'a> LogIterator<'a> {
    pub(super) fn new(log: &'a AppendLog) -> Self {
        Self {
            log,
            offset: 0,
            done: false,
        }
    }
}

impl<'a> Iterator for LogIterator<'a> {
    type Item = Result<(u64, Record)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.log.read_at(self.offset) {
            Ok(record) => {
                let at = self.offset;
                self.offset += record.encoded_len();
                Some(Ok((at, record)))
            }
            Err(e) if e.is_end_of_log() => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
