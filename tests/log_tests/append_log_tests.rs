//! Tests for the Append Log
//!
//! These tests verify:
//! - Offsets returned by append and write_offset tracking
//! - Positioned reads of individual records
//! - EndOfLog signalling
//! - Reopening resumes after existing data
//! - Forward scans with the iterator
//! - Truncated and corrupted files surface as errors

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use minikv::log::AppendLog;
use minikv::record::Record;
use minikv::KvError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_log() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("test.data");
    (temp_dir, log_path)
}

// =============================================================================
// Open Tests
// =============================================================================

#[test]
fn test_open_creates_empty_file() {
    let (_temp, path) = setup_temp_log();

    let log = AppendLog::open(&path).unwrap();

    assert!(path.exists());
    assert!(log.is_empty());
    assert_eq!(log.len(), 0);
    assert_eq!(log.path(), path.as_path());
}

#[test]
fn test_reopen_resumes_after_existing_data() {
    let (_temp, path) = setup_temp_log();

    {
        let mut log = AppendLog::open(&path).unwrap();
        log.append(&Record::put(b"a".to_vec(), b"1".to_vec())).unwrap();
        log.append(&Record::put(b"b".to_vec(), b"2".to_vec())).unwrap();
    }

    let mut log = AppendLog::open(&path).unwrap();
    assert_eq!(log.len(), 24);

    let offset = log.append(&Record::put(b"c".to_vec(), b"3".to_vec())).unwrap();
    assert_eq!(offset, 24);
    assert_eq!(log.len(), 36);

    // Earlier records are untouched
    assert_eq!(log.read_at(0).unwrap(), Record::put(b"a".to_vec(), b"1".to_vec()));
    assert_eq!(log.read_at(12).unwrap(), Record::put(b"b".to_vec(), b"2".to_vec()));
}

#[test]
fn test_create_truncates_existing_file() {
    let (_temp, path) = setup_temp_log();

    {
        let mut log = AppendLog::open(&path).unwrap();
        log.append(&Record::put(b"a".to_vec(), b"1".to_vec())).unwrap();
    }

    let log = AppendLog::create(&path).unwrap();
    assert!(log.is_empty());
    assert_eq!(fs::metadata(&path).unwrap().len(), 0);
}

// =============================================================================
// Append / Read Tests
// =============================================================================

#[test]
fn test_append_returns_sequential_offsets() {
    let (_temp, path) = setup_temp_log();
    let mut log = AppendLog::open(&path).unwrap();

    let off1 = log.append(&Record::put(b"a".to_vec(), b"1".to_vec())).unwrap();
    let off2 = log.append(&Record::put(b"a".to_vec(), b"2".to_vec())).unwrap();
    let off3 = log.append(&Record::tombstone(b"a".to_vec())).unwrap();

    assert_eq!(off1, 0);
    assert_eq!(off2, 12);
    assert_eq!(off3, 24);
    assert_eq!(log.len(), 35);
    assert_eq!(fs::metadata(&path).unwrap().len(), 35);
}

#[test]
fn test_read_at_each_offset() {
    let (_temp, path) = setup_temp_log();
    let mut log = AppendLog::open(&path).unwrap();

    let records = vec![
        Record::put(b"alpha".to_vec(), b"one".to_vec()),
        Record::put(b"beta".to_vec(), Vec::new()),
        Record::tombstone(b"alpha".to_vec()),
        Record::put(b"gamma".to_vec(), vec![0u8; 4096]),
    ];

    let offsets: Vec<u64> = records.iter().map(|r| log.append(r).unwrap()).collect();

    for (offset, expected) in offsets.iter().zip(&records) {
        assert_eq!(&log.read_at(*offset).unwrap(), expected);
    }
}

#[test]
fn test_read_at_end_is_end_of_log() {
    let (_temp, path) = setup_temp_log();
    let mut log = AppendLog::open(&path).unwrap();

    assert!(matches!(log.read_at(0), Err(KvError::EndOfLog { offset: 0 })));

    log.append(&Record::put(b"a".to_vec(), b"1".to_vec())).unwrap();

    assert!(matches!(log.read_at(12), Err(KvError::EndOfLog { offset: 12 })));
    assert!(matches!(log.read_at(1000), Err(KvError::EndOfLog { .. })));
}

#[test]
fn test_binary_keys_and_values() {
    let (_temp, path) = setup_temp_log();
    let mut log = AppendLog::open(&path).unwrap();

    let key: Vec<u8> = (0..=255u8).collect();
    let value: Vec<u8> = (0..=255u8).rev().collect();
    let offset = log.append(&Record::put(key.clone(), value.clone())).unwrap();

    assert_eq!(log.read_at(offset).unwrap(), Record::put(key, value));
}

#[test]
fn test_rename_to_keeps_handle_writable() {
    let (temp, path) = setup_temp_log();
    let target = temp.path().join("renamed.data");

    let mut log = AppendLog::create(&path).unwrap();
    log.append(&Record::put(b"a".to_vec(), b"1".to_vec())).unwrap();

    log.rename_to(&target).unwrap();
    assert!(!path.exists());
    assert!(target.exists());
    assert_eq!(log.path(), target.as_path());

    // Appends after the rename land in the renamed file
    let offset = log.append(&Record::put(b"b".to_vec(), b"2".to_vec())).unwrap();
    assert_eq!(offset, 12);
    drop(log);

    let log = AppendLog::open(&target).unwrap();
    assert_eq!(log.len(), 24);
    assert_eq!(log.read_at(12).unwrap(), Record::put(b"b".to_vec(), b"2".to_vec()));
}

// =============================================================================
// Iterator Tests
// =============================================================================

#[test]
fn test_iter_empty_log() {
    let (_temp, path) = setup_temp_log();
    let log = AppendLog::open(&path).unwrap();

    assert_eq!(log.iter().count(), 0);
}

#[test]
fn test_iter_yields_offsets_in_order() {
    let (_temp, path) = setup_temp_log();
    let mut log = AppendLog::open(&path).unwrap();

    log.append(&Record::put(b"a".to_vec(), b"1".to_vec())).unwrap();
    log.append(&Record::put(b"bb".to_vec(), b"22".to_vec())).unwrap();
    log.append(&Record::tombstone(b"a".to_vec())).unwrap();

    let items: Vec<(u64, Record)> = log.iter().map(|r| r.unwrap()).collect();

    assert_eq!(
        items,
        vec![
            (0, Record::put(b"a".to_vec(), b"1".to_vec())),
            (12, Record::put(b"bb".to_vec(), b"22".to_vec())),
            (26, Record::tombstone(b"a".to_vec())),
        ]
    );
}

// =============================================================================
// Corruption Tests
// =============================================================================

#[test]
fn test_truncated_record_is_io_error() {
    let (_temp, path) = setup_temp_log();

    {
        let mut log = AppendLog::open(&path).unwrap();
        log.append(&Record::put(b"a".to_vec(), b"1".to_vec())).unwrap();
        log.append(&Record::put(b"key".to_vec(), b"value".to_vec())).unwrap();
    }

    // Chop the last record in half
    let file = OpenOptions::new().write(true).open(&path).unwrap();
    file.set_len(12 + 9).unwrap();
    drop(file);

    let log = AppendLog::open(&path).unwrap();
    assert!(log.read_at(0).is_ok());
    assert!(matches!(log.read_at(12), Err(KvError::Io(_))));

    // The scan yields the good record, then the error, then stops
    let items: Vec<_> = log.iter().collect();
    assert_eq!(items.len(), 2);
    assert!(items[0].is_ok());
    assert!(matches!(items[1], Err(KvError::Io(_))));
}

#[test]
fn test_header_claiming_oversized_body_is_io_error() {
    let (_temp, path) = setup_temp_log();

    let mut file = fs::File::create(&path).unwrap();
    // key_size = 0xFFFFFFFF, value_size = 0, Put
    file.write_all(&[0xFF, 0xFF, 0xFF, 0xFF, 0, 0, 0, 0, 0, 0]).unwrap();
    drop(file);

    let log = AppendLog::open(&path).unwrap();
    assert!(matches!(log.read_at(0), Err(KvError::Io(_))));
}

#[test]
fn test_corrupted_marker_is_decoding_error() {
    let (_temp, path) = setup_temp_log();

    let mut file = fs::File::create(&path).unwrap();
    file.write_all(&[0, 0, 0, 1, 0, 0, 0, 1, 0, 9, b'k', b'v']).unwrap();
    drop(file);

    let log = AppendLog::open(&path).unwrap();
    assert!(matches!(log.read_at(0), Err(KvError::Decoding(_))));
}

#[test]
fn test_sync() {
    let (_temp, path) = setup_temp_log();
    let mut log = AppendLog::open(&path).unwrap();

    log.append(&Record::put(b"a".to_vec(), b"1".to_vec())).unwrap();
    log.sync().unwrap();

    assert_eq!(fs::metadata(&path).unwrap().len(), 12);
}
