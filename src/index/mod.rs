//! Index Module
//!
//! In-memory map from key to the offset of that key's latest record.
//!
//! ## Responsibilities
//! - O(1) point lookups without scanning the log
//! - Hold only live keys: a deleted key is simply absent
//! - Answer the merge validity check (`points_to`)
//!
//! ## Data Structure Choice
//! Plain HashMap with no internal locking:
//! - Keys are opaque bytes, no ordering needed (no range scans)
//! - The engine guards the index and the log with one lock, so the index
//!   never needs its own

mod table;

pub use table::Index;
