//! Append Log Module
//!
//! A single growable file of records, written only at its end.
//!
//! ## Responsibilities
//! - Append encoded records with positioned writes
//! - Random-offset reads of individual records
//! - Track the logical length (`write_offset`)
//! - Forward scans for replay and merge
//!
//! ## Layout
//! ```text
//! offset 0                                           write_offset
//! ┌──────────┬──────────┬──────────┬─────┬──────────┐
//! │ Record 1 │ Record 2 │ Record 3 │ ... │ Record N │ ← next append
//! └──────────┴──────────┴──────────┴─────┴──────────┘
//! ```
//!
//! Offsets returned by `append` are stable for the lifetime of the file and
//! are what the index stores.

mod file;
mod iterator;

pub use file::AppendLog;
pub use iterator::LogIterator;
