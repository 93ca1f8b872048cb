//! # minikv
//!
//! A minimal embedded key-value store on a single append-only log:
//! - Every write is appended to one data file
//! - An in-memory index maps each key to its latest record's offset
//! - Deletes are persisted as tombstones and replayed on startup
//! - Merge rewrites the log to drop stale and deleted records
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Engine                             │
//! │          get / set / delete / merge  (RwLock<State>)        │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │    Index    │ offset → │ Append Log  │
//!   │ key→offset  │          │ (one file)  │
//!   └─────────────┘          └──────┬──────┘
//!                                   │
//!                                   ▼
//!                           ┌─────────────┐
//!                           │   Record    │
//!                           │   Codec     │
//!                           └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use minikv::Engine;
//!
//! # fn main() -> minikv::Result<()> {
//! let engine = Engine::open_path(std::path::Path::new("./data"))?;
//! engine.set(b"name", b"minikv")?;
//! assert_eq!(engine.get(b"name")?, Some(b"minikv".to_vec()));
//! engine.delete(b"name")?;
//! engine.merge()?;
//! # Ok(())
//! # }
//! ```

// Positioned file I/O and rename-over-open-file in merge need POSIX semantics
#[cfg(not(unix))]
compile_error!("minikv only supports unix platforms");

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod log;
pub mod index;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{KvError, Result};
pub use config::Config;
pub use engine::Engine;
