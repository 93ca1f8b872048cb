//! Append Log file
//!
//! Owns the file handle and the write cursor. Reads take `&self` so that
//! concurrent readers only need a shared lock on the engine.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};

use crate::error::{KvError, Result};
use crate::record::{self, Record, HEADER_SIZE};

use super::LogIterator;

/// Append-only record log backed by a single file
pub struct AppendLog {
    /// Location of the backing file
    path: PathBuf,
    /// Backing file, opened read + write
    file: File,
    /// Byte position just past the last written record
    write_offset: u64,
}

impl AppendLog {
    /// Open or create a log file
    ///
    /// Existing contents are kept and appends resume after them.
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;
        let write_offset = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            file,
            write_offset,
        })
    }

    /// Create an empty log file, truncating anything already at `path`
    pub fn create(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
            write_offset: 0,
        })
    }

    /// Read the record starting at `offset`
    ///
    /// Returns `EndOfLog` when `offset` is at or past the end of the log.
    /// A record whose body runs past the end of the log is an I/O error.
    pub fn read_at(&self, offset: u64) -> Result<Record> {
        if offset >= self.write_offset {
            return Err(KvError::EndOfLog { offset });
        }

        // Step 1: Fixed-width header
        let mut header_buf = [0u8; HEADER_SIZE];
        self.file.read_exact_at(&mut header_buf, offset)?;
        let header = record::decode_header(&header_buf)?;

        // Refuse to allocate for a body the file cannot contain
        if offset + header.record_size() > self.write_offset {
            return Err(KvError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "record at offset {} needs {} bytes but the log ends at {}",
                    offset,
                    header.record_size(),
                    self.write_offset
                ),
            )));
        }

        // Step 2: Key, immediately after the header
        let key_offset = offset + HEADER_SIZE as u64;
        let mut key = vec![0u8; header.key_size as usize];
        if !key.is_empty() {
            self.file.read_exact_at(&mut key, key_offset)?;
        }

        // Step 3: Value, immediately after the key
        let mut value = vec![0u8; header.value_size as usize];
        if !value.is_empty() {
            self.file
                .read_exact_at(&mut value, key_offset + header.key_size as u64)?;
        }

        record::decode_body(&header, key, value)
    }

    /// Append a record, returning the offset it was written at
    ///
    /// `write_offset` only advances once the whole record is written.
    pub fn append(&mut self, record: &Record) -> Result<u64> {
        let encoded = record::encode(record)?;
        let offset = self.write_offset;

        self.file.write_all_at(&encoded, offset)?;
        self.write_offset += encoded.len() as u64;

        tracing::trace!(
            offset,
            len = encoded.len(),
            marker = ?record.marker(),
            "appended record"
        );

        Ok(offset)
    }

    /// Force file contents to disk
    pub fn sync(&self) -> Result<()> {
        self.file.sync_data()?;
        Ok(())
    }

    /// Atomically move the backing file to `path`, replacing whatever is there
    ///
    /// The open handle stays valid, so the log keeps serving reads and
    /// appends from the same file under its new name.
    pub fn rename_to(&mut self, path: &Path) -> Result<()> {
        fs::rename(&self.path, path)?;
        self.path = path.to_path_buf();
        Ok(())
    }

    /// Scan every record from offset 0
    pub fn iter(&self) -> LogIterator<'_> {
        LogIterator::new(self)
    }

    /// Logical length of the log in bytes
    pub fn len(&self) -> u64 {
        self.write_offset
    }

    pub fn is_empty(&self) -> bool {
        self.write_offset == 0
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
