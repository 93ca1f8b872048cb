//! Engine Module
//!
//! The core storage engine that coordinates all components.
//!
//! ## Responsibilities
//! - Replay the append log into the index on startup
//! - Run get/set/delete as transactions against the index and log
//! - Merge the log to reclaim space from stale and deleted records
//! - Clean up after a merge that was interrupted by a crash

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use crate::config::Config;
use crate::error::{KvError, Result};
use crate::index::Index;
use crate::log::AppendLog;
use crate::record::Record;

/// Mutable state guarded by the engine lock
struct State {
    /// The single append-only data file
    log: AppendLog,

    /// Live key → offset of its latest Put record in `log`
    index: Index,
}

/// The main storage engine
///
/// ## Concurrency Model
///
/// The log and index live together behind one `RwLock`:
/// - **Writes** (set/delete/merge): exclusive lock, so an append and its
///   index update are never observed half-done
/// - **Reads** (get): shared lock; records are fetched with positioned reads
///   that need only `&File`, so readers never block each other
/// - **Merge** holds the exclusive lock for the whole scan, rewrite and swap,
///   so no read can see the log mid-replacement
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Path of the primary log file
    log_path: PathBuf,

    /// Path of the temporary file a merge writes into
    merge_path: PathBuf,

    /// Log + index
    state: RwLock<State>,
}

impl Engine {
    // =========================================================================
    // Internal Path Constants
    // =========================================================================
    const LOG_FILENAME: &'static str = "minikvdb.data";
    const MERGE_FILENAME: &'static str = "minikvdb.data.merge";

    /// Open or create an engine with the given config
    ///
    /// On startup:
    /// 1. Create the data directory if it doesn't exist
    /// 2. Remove a merge file left behind by a crash
    /// 3. Open the log (created empty if absent)
    /// 4. Replay the log to rebuild the index
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;

        // Step 1: Create data directory if it doesn't exist
        fs::create_dir_all(&config.data_dir)?;

        let log_path = config.data_dir.join(Self::LOG_FILENAME);
        let merge_path = config.data_dir.join(Self::MERGE_FILENAME);

        // Step 2: The primary log is authoritative; a leftover merge file is
        // an unfinished copy
        if merge_path.exists() {
            tracing::warn!(
                "Removing stale merge file {} from an interrupted merge",
                merge_path.display()
            );
            fs::remove_file(&merge_path)?;
        }

        // Step 3: Open the log
        let log = AppendLog::open(&log_path)?;

        // Step 4: Rebuild the index
        let (index, replayed) = Self::replay(&log)?;

        tracing::info!(
            "Opened {}: {} records replayed, {} live keys, {} bytes",
            log.path().display(),
            replayed,
            index.len(),
            log.len()
        );

        Ok(Self {
            config,
            log_path,
            merge_path,
            state: RwLock::new(State { log, index }),
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().data_dir(path).build())
    }

    /// Rebuild the index with a forward scan of the whole log
    ///
    /// Last writer wins: a Put points the key at its offset, a Tombstone
    /// removes the key. Returns the index and the number of records read.
    fn replay(log: &AppendLog) -> Result<(Index, u64)> {
        let mut index = Index::new();
        let mut replayed = 0u64;

        for item in log.iter() {
            let (offset, record) = item?;
            match record {
                Record::Put { key, .. } => {
                    index.insert(key, offset);
                }
                Record::Tombstone { key } => {
                    index.remove(&key);
                }
            }
            replayed += 1;
        }

        Ok((index, replayed))
    }

    /// Get a value by key
    ///
    /// Returns `Ok(None)` for an empty key or a key that is not live.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        if key.is_empty() {
            return Ok(None);
        }

        let state = self.state.read();

        let offset = match state.index.get(key) {
            Some(offset) => offset,
            None => return Ok(None),
        };

        let record = state.log.read_at(offset).map_err(|e| match e {
            KvError::EndOfLog { offset } => KvError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("index entry points past the end of the log at offset {}", offset),
            )),
            other => other,
        })?;

        if record.key() != key {
            return Err(KvError::Decoding(format!(
                "record at offset {} belongs to a different key",
                offset
            )));
        }

        match record.into_value() {
            Some(value) => Ok(Some(value)),
            None => Err(KvError::Decoding(format!(
                "index entry points at a tombstone at offset {}",
                offset
            ))),
        }
    }

    /// Set a key-value pair
    ///
    /// Steps:
    /// 1. Acquire the exclusive lock
    /// 2. Append a Put record
    /// 3. Point the index at it (skipped if the append failed)
    ///
    /// An empty key is ignored.
    pub fn set(&self, key: &[u8], value: &[u8]) -> Result<()> {
        if key.is_empty() {
            return Ok(());
        }

        let mut state = self.state.write();

        let offset = state.log.append(&Record::put(key, value))?;
        state.index.insert(key.to_vec(), offset);

        if self.config.sync_on_write {
            state.log.sync()?;
        }

        Ok(())
    }

    /// Delete a key
    ///
    /// Steps:
    /// 1. Acquire the exclusive lock
    /// 2. Append a Tombstone so replay reproduces the deletion
    /// 3. Remove the key from the index
    ///
    /// Deleting an empty or absent key does nothing.
    pub fn delete(&self, key: &[u8]) -> Result<()> {
        if key.is_empty() {
            return Ok(());
        }

        let mut state = self.state.write();

        if !state.index.contains_key(key) {
            return Ok(());
        }

        state.log.append(&Record::tombstone(key))?;
        state.index.remove(key);

        if self.config.sync_on_write {
            state.log.sync()?;
        }

        Ok(())
    }

    /// Rewrite the log keeping only the records the index points at
    ///
    /// Steps:
    /// 1. Scan the log; a record is live iff the index maps its key to
    ///    exactly its offset
    /// 2. Append live records, in order, to the merge file
    /// 3. Rename the merge file over the primary log and switch to it
    /// 4. Apply the new offsets to the index
    ///
    /// The existing log is left untouched when it is empty, when nothing in
    /// it is live, or when everything in it is live.
    pub fn merge(&self) -> Result<()> {
        let mut guard = self.state.write();
        let state = &mut *guard;

        if state.log.is_empty() {
            tracing::debug!("Merge skipped: log is empty");
            return Ok(());
        }

        let bytes_before = state.log.len();

        // Step 1 + 2: Copy live records into a fresh file
        let mut merged = AppendLog::create(&self.merge_path)?;
        let remap = match Self::copy_live_records(state, &mut merged) {
            Ok(remap) => remap,
            Err(e) => {
                drop(merged);
                self.discard_merge_file();
                return Err(e);
            }
        };

        if remap.is_empty() {
            tracing::debug!("Merge skipped: no live records in {} bytes", bytes_before);
            drop(merged);
            self.discard_merge_file();
            return Ok(());
        }

        if merged.len() == bytes_before {
            tracing::debug!("Merge skipped: every record is live");
            drop(merged);
            self.discard_merge_file();
            return Ok(());
        }

        if self.config.sync_on_merge {
            if let Err(e) = merged.sync() {
                drop(merged);
                self.discard_merge_file();
                return Err(e);
            }
        }

        // Step 3: Atomically replace the primary log and adopt the merged handle
        if let Err(e) = merged.rename_to(&self.log_path) {
            drop(merged);
            self.discard_merge_file();
            return Err(e);
        }
        state.log = merged;

        // Step 4: Offsets now refer to the merged file
        for (key, offset) in remap {
            state.index.insert(key, offset);
        }

        tracing::info!(
            "Merge complete for {}: {} -> {} bytes, {} live keys",
            state.log.path().display(),
            bytes_before,
            state.log.len(),
            state.index.len()
        );

        Ok(())
    }

    /// Force the log to disk
    pub fn sync(&self) -> Result<()> {
        self.state.read().log.sync()
    }

    /// Close the engine gracefully
    ///
    /// Syncs the log to disk before dropping the file handle
    pub fn close(self) -> Result<()> {
        self.sync()
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Number of live keys
    pub fn key_count(&self) -> usize {
        self.state.read().index.len()
    }

    /// Current size of the log in bytes
    pub fn log_size(&self) -> u64 {
        self.state.read().log.len()
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Get the primary log file path
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Append every live record of `state.log` to `merged`
    ///
    /// Returns the new offset of each copied key, in log order.
    fn copy_live_records(state: &State, merged: &mut AppendLog) -> Result<Vec<(Vec<u8>, u64)>> {
        let mut remap = Vec::with_capacity(state.index.len());

        for item in state.log.iter() {
            let (offset, record) = item?;
            if !state.index.points_to(record.key(), offset) {
                continue;
            }

            let new_offset = merged.append(&record)?;
            remap.push((record.key().to_vec(), new_offset));
        }

        Ok(remap)
    }

    /// Best-effort removal of the merge file after an abandoned merge
    fn discard_merge_file(&self) {
        if let Err(e) = fs::remove_file(&self.merge_path) {
            tracing::warn!(
                "Failed to remove merge file {}: {}",
                self.merge_path.display(),
                e
            );
        }
    }
}
