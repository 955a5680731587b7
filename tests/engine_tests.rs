//! Tests for Engine
//!
//! These tests verify:
//! - Basic get/put/delete operations
//! - Exact on-disk layout of appended records
//! - Index rebuild on reopen (dedup and tombstones)
//! - Key/value validation before any I/O
//! - Newest-first iteration of live entries
//! - Engine lifecycle (open errors, corrupted logs)

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use saavi::config::{Config, SyncStrategy};
use saavi::engine::Engine;
use saavi::SaaviError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

const NUM_OF_ENTRIES: usize = 10;

fn setup_temp_engine() -> (TempDir, PathBuf, Engine) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("test.db");
    let engine = Engine::open(&path).unwrap();
    (temp_dir, path, engine)
}

/// Put Key0..Key9 → Value0..Value9 and return the expected state
fn populate(engine: &mut Engine) -> HashMap<String, String> {
    let mut expected = HashMap::new();
    for i in 0..NUM_OF_ENTRIES {
        let key = format!("Key{}", i);
        let value = format!("Value{}", i);
        engine.put(&key, &value).unwrap();
        expected.insert(key, value);
    }
    expected
}

fn verify(engine: &mut Engine, expected: &HashMap<String, String>) {
    for i in 0..NUM_OF_ENTRIES {
        let key = format!("Key{}", i);
        assert_eq!(
            engine.get(&key).unwrap(),
            expected.get(&key).cloned(),
            "mismatch for {}",
            key
        );
    }
}

fn live_entries(engine: &mut Engine) -> Vec<(String, String)> {
    engine
        .iter()
        .unwrap()
        .map(|r| {
            let r = r.unwrap();
            (r.entry.key, r.entry.value)
        })
        .collect()
}

// =============================================================================
// Open Tests
// =============================================================================

#[test]
fn test_open_creates_file() {
    let (_temp, path, engine) = setup_temp_engine();

    assert!(path.exists());
    assert_eq!(engine.path(), path.as_path());
    assert!(engine.is_empty());
}

#[test]
fn test_open_missing_parent_dir_fails() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("no").join("such").join("dir.db");

    match Engine::open(&path) {
        Err(SaaviError::Open { path: p, .. }) => assert_eq!(p, path),
        Err(other) => panic!("expected Open error, got {:?}", other),
        Ok(_) => panic!("expected Open error, got an engine"),
    }
}

#[test]
fn test_open_with_config_every_write_sync() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .sync_strategy(SyncStrategy::EveryWrite)
        .build();
    let path = temp_dir.path().join("synced.db");

    let mut engine = Engine::open_with_config(&path, &config).unwrap();
    engine.put("key", "value").unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "key,value\n");
}

#[test]
fn test_open_malformed_log_fails() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("bad.db");
    fs::write(&path, "a,1\nnoseparator\nb,2\n").unwrap();

    match Engine::open(&path) {
        Err(SaaviError::MalformedRecord { offset, .. }) => assert_eq!(offset, 4),
        Err(other) => panic!("expected MalformedRecord, got {:?}", other),
        Ok(_) => panic!("expected MalformedRecord, got an engine"),
    }
}

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_put_writes_one_line_per_record() {
    let (_temp, path, mut engine) = setup_temp_engine();

    populate(&mut engine);

    let contents = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), NUM_OF_ENTRIES);
    for (i, line) in lines.iter().enumerate() {
        assert_eq!(*line, format!("Key{},Value{}", i, i));
    }

    assert_eq!(engine.get("Key5").unwrap(), Some("Value5".to_string()));
}

#[test]
fn test_get_from_externally_written_log() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("external.db");

    let mut expected = HashMap::new();
    let mut contents = String::new();
    for i in 0..NUM_OF_ENTRIES {
        let key = format!("Key{}", i);
        let value = format!("Value{}", i);
        contents.push_str(&format!("{},{}\n", key, value));
        expected.insert(key, value);
    }
    fs::write(&path, contents).unwrap();

    let mut engine = Engine::open(&path).unwrap();
    assert_eq!(engine.len(), NUM_OF_ENTRIES);
    verify(&mut engine, &expected);
}

#[test]
fn test_get_nonexistent_key() {
    let (_temp, _path, mut engine) = setup_temp_engine();
    assert_eq!(engine.get("nonexistent").unwrap(), None);
}

#[test]
fn test_update_last_write_wins() {
    let (_temp, _path, mut engine) = setup_temp_engine();
    let mut expected = populate(&mut engine);

    engine.put("Key2", "Value22").unwrap();
    engine.put("Key1", "Value11").unwrap();
    engine.put("Key9", "Value99").unwrap();
    engine.put("Key2", "Value222").unwrap();

    expected.insert("Key1".into(), "Value11".into());
    expected.insert("Key9".into(), "Value99".into());
    expected.insert("Key2".into(), "Value222".into());

    verify(&mut engine, &expected);
}

#[test]
fn test_delete() {
    let (_temp, _path, mut engine) = setup_temp_engine();
    let mut expected = populate(&mut engine);

    engine.delete("Key2").unwrap();
    engine.delete("Key1").unwrap();
    engine.delete("Key9").unwrap();
    engine.put("Key2", "Value222").unwrap();

    expected.remove("Key1");
    expected.remove("Key9");
    expected.insert("Key2".into(), "Value222".into());

    verify(&mut engine, &expected);
}

#[test]
fn test_delete_appends_tombstone() {
    let (_temp, path, mut engine) = setup_temp_engine();

    engine.put("key", "value").unwrap();
    engine.delete("key").unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "key,value\nkey,\n");
    assert_eq!(engine.get("key").unwrap(), None);
    // The tombstone stays indexed until the next rebuild
    assert_eq!(engine.len(), 1);
}

#[test]
fn test_delete_nonexistent_key() {
    let (_temp, _path, mut engine) = setup_temp_engine();

    engine.delete("nonexistent").unwrap();
    assert_eq!(engine.get("nonexistent").unwrap(), None);
}

#[test]
fn test_value_with_commas_round_trips() {
    let (_temp, path, mut engine) = setup_temp_engine();

    engine.put("csv", "a,b,,c").unwrap();
    assert_eq!(engine.get("csv").unwrap(), Some("a,b,,c".to_string()));

    drop(engine);
    let mut engine = Engine::open(&path).unwrap();
    assert_eq!(engine.get("csv").unwrap(), Some("a,b,,c".to_string()));
}

#[test]
fn test_value_with_carriage_return_round_trips() {
    let (_temp, path, mut engine) = setup_temp_engine();

    engine.put("k", "a\rb").unwrap();
    assert_eq!(engine.get("k").unwrap(), Some("a\rb".to_string()));

    drop(engine);
    let mut engine = Engine::open(&path).unwrap();
    assert_eq!(engine.get("k").unwrap(), Some("a\rb".to_string()));
    assert_eq!(
        live_entries(&mut engine),
        vec![("k".to_string(), "a\rb".to_string())]
    );
}

// =============================================================================
// Validation Tests
// =============================================================================

#[test]
fn test_invalid_keys_rejected_without_io() {
    let (_temp, path, mut engine) = setup_temp_engine();

    assert!(matches!(
        engine.put("a b", "x"),
        Err(SaaviError::InvalidKey(_))
    ));
    assert!(matches!(engine.get("a-1"), Err(SaaviError::InvalidKey(_))));
    assert!(matches!(engine.delete("a,b"), Err(SaaviError::InvalidKey(_))));
    assert!(matches!(engine.put("", "x"), Err(SaaviError::InvalidKey(_))));

    assert_eq!(fs::metadata(&path).unwrap().len(), 0);
    assert!(engine.is_empty());

    engine.put("abc123", "x").unwrap();
    assert_eq!(engine.get("abc123").unwrap(), Some("x".to_string()));
}

#[test]
fn test_invalid_key_checked_before_value() {
    let (_temp, _path, mut engine) = setup_temp_engine();

    assert!(matches!(
        engine.put("bad key", "bad\nvalue"),
        Err(SaaviError::InvalidKey(_))
    ));
}

#[test]
fn test_value_with_newline_rejected() {
    let (_temp, path, mut engine) = setup_temp_engine();

    assert!(matches!(
        engine.put("key", "line1\nline2"),
        Err(SaaviError::InvalidValue(_))
    ));
    assert_eq!(fs::metadata(&path).unwrap().len(), 0);
    assert_eq!(engine.get("key").unwrap(), None);
}

// =============================================================================
// Rebuild Tests
// =============================================================================

#[test]
fn test_delete_survives_reopen() {
    let (_temp, path, mut engine) = setup_temp_engine();

    engine.put("k", "v").unwrap();
    engine.delete("k").unwrap();
    assert_eq!(engine.get("k").unwrap(), None);

    drop(engine);
    let mut engine = Engine::open(&path).unwrap();

    assert_eq!(engine.get("k").unwrap(), None);
    assert!(engine.is_empty());
}

#[test]
fn test_rebuild_idempotence() {
    let (_temp, path, mut engine) = setup_temp_engine();

    populate(&mut engine);
    engine.put("Key3", "Value33").unwrap();
    engine.delete("Key4").unwrap();
    engine.delete("Key7").unwrap();
    engine.put("Key7", "Value77").unwrap();
    engine.delete("Key0").unwrap();
    engine.put("Key3", "Value333").unwrap();

    let keys: Vec<String> = (0..NUM_OF_ENTRIES).map(|i| format!("Key{}", i)).collect();
    let before: Vec<Option<String>> = keys.iter().map(|k| engine.get(k).unwrap()).collect();

    drop(engine);
    let mut engine = Engine::open(&path).unwrap();
    let after: Vec<Option<String>> = keys.iter().map(|k| engine.get(k).unwrap()).collect();

    assert_eq!(before, after);
    assert_eq!(after[3], Some("Value333".to_string()));
    assert_eq!(after[4], None);
    assert_eq!(after[7], Some("Value77".to_string()));
    assert_eq!(after[0], None);
    assert_eq!(engine.len(), 8);

    // Reopening twice changes nothing either
    drop(engine);
    let mut engine = Engine::open(&path).unwrap();
    let again: Vec<Option<String>> = keys.iter().map(|k| engine.get(k).unwrap()).collect();
    assert_eq!(after, again);
}

#[test]
fn test_rebuild_idempotence_with_churn() {
    let (_temp, path, mut engine) = setup_temp_engine();

    // Repeated put/delete/put of the same keys, interleaved across keys
    for round in 0..5 {
        for i in 0..NUM_OF_ENTRIES {
            let key = format!("Key{}", i);
            engine.put(&key, &format!("r{}a{}", round, i)).unwrap();
            if (i + round) % 2 == 0 {
                engine.delete(&key).unwrap();
            }
            if (i + round) % 3 == 0 {
                engine.put(&key, &format!("r{}b{}", round, i)).unwrap();
            }
        }
        engine.delete(&format!("Key{}", round)).unwrap();
    }
    engine.delete("Key8").unwrap();
    engine.put("Key8", "final").unwrap();
    engine.delete("Key9").unwrap();

    let keys: Vec<String> = (0..NUM_OF_ENTRIES).map(|i| format!("Key{}", i)).collect();
    let before: Vec<Option<String>> = keys.iter().map(|k| engine.get(k).unwrap()).collect();
    let live_before = before.iter().filter(|v| v.is_some()).count();

    drop(engine);
    let mut engine = Engine::open(&path).unwrap();
    let after: Vec<Option<String>> = keys.iter().map(|k| engine.get(k).unwrap()).collect();

    assert_eq!(before, after);
    assert_eq!(engine.len(), live_before);
    assert_eq!(live_entries(&mut engine).len(), live_before);
    assert_eq!(after[8], Some("final".to_string()));
    assert_eq!(after[9], None);
    for i in 0..5 {
        assert_eq!(after[i], None, "Key{} was deleted last", i);
    }
}

#[test]
fn test_rebuild_stats() {
    let (_temp, path, mut engine) = setup_temp_engine();

    engine.put("a", "1").unwrap();
    engine.put("b", "2").unwrap();
    engine.put("a", "3").unwrap();
    engine.delete("b").unwrap();

    drop(engine);
    let engine = Engine::open(&path).unwrap();
    let stats = engine.rebuild_stats();

    assert_eq!(stats.records_scanned, 4);
    assert_eq!(stats.tombstones, 1);
    assert_eq!(stats.shadowed, 2);
    assert_eq!(engine.len(), 1);
}

#[test]
fn test_appends_continue_after_reopen() {
    let (_temp, path, mut engine) = setup_temp_engine();

    engine.put("a", "1").unwrap();
    drop(engine);

    let mut engine = Engine::open(&path).unwrap();
    engine.put("b", "2").unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "a,1\nb,2\n");
    assert_eq!(engine.get("a").unwrap(), Some("1".to_string()));
    assert_eq!(engine.get("b").unwrap(), Some("2".to_string()));
    assert_eq!(engine.log_size().unwrap(), 8);
}

#[test]
fn test_index_corruption_detected() {
    let (_temp, path, mut engine) = setup_temp_engine();

    engine.put("a", "1").unwrap();
    // Rewrite the log behind the engine's back
    fs::write(&path, "b,2\n").unwrap();

    match engine.get("a") {
        Err(SaaviError::IndexCorruption { key, offset, found }) => {
            assert_eq!(key, "a");
            assert_eq!(offset, 0);
            assert_eq!(found, "b");
        }
        other => panic!("expected IndexCorruption, got {:?}", other),
    }
}

// =============================================================================
// Iteration Tests
// =============================================================================

#[test]
fn test_iteration_empty_store() {
    let (_temp, _path, mut engine) = setup_temp_engine();

    assert!(live_entries(&mut engine).is_empty());
    assert_eq!(engine.get("anything").unwrap(), None);
}

#[test]
fn test_iteration_completeness() {
    let (_temp, _path, mut engine) = setup_temp_engine();
    let mut expected = populate(&mut engine);

    engine.delete("Key2").unwrap();
    engine.delete("Key9").unwrap();
    engine.put("Key1", "V11").unwrap();

    expected.remove("Key2");
    expected.remove("Key9");
    expected.insert("Key1".into(), "V11".into());

    let entries = live_entries(&mut engine);
    assert_eq!(entries.len(), 8);
    for (key, value) in &entries {
        assert_eq!(expected.get(key), Some(value), "unexpected entry {}", key);
    }
    assert!(entries.iter().all(|(k, _)| k != "Key2" && k != "Key9"));

    // Most recently written first
    assert_eq!(entries[0], ("Key1".to_string(), "V11".to_string()));
    assert_eq!(entries[1].0, "Key8");
    assert_eq!(entries[7].0, "Key0");
}

#[test]
fn test_iteration_is_restartable_and_leaves_engine_usable() {
    let (_temp, _path, mut engine) = setup_temp_engine();
    populate(&mut engine);

    let first = live_entries(&mut engine);
    engine.put("Key5", "Value55").unwrap();
    assert_eq!(engine.get("Key0").unwrap(), Some("Value0".to_string()));
    assert_eq!(engine.get("Key5").unwrap(), Some("Value55".to_string()));

    let second = live_entries(&mut engine);
    assert_eq!(first.len(), NUM_OF_ENTRIES);
    assert_eq!(second.len(), NUM_OF_ENTRIES);
    assert_eq!(second[0], ("Key5".to_string(), "Value55".to_string()));
}

#[test]
fn test_partially_consumed_iteration_leaves_engine_usable() {
    let (_temp, _path, mut engine) = setup_temp_engine();
    populate(&mut engine);

    {
        let mut scan = engine.iter().unwrap();
        let newest = scan.next().unwrap().unwrap();
        assert_eq!(newest.entry.key, "Key9");
    }

    engine.put("extra", "value").unwrap();
    assert_eq!(engine.get("extra").unwrap(), Some("value".to_string()));
    assert_eq!(engine.get("Key3").unwrap(), Some("Value3".to_string()));
}

#[test]
fn test_raw_records_include_history() {
    let (_temp, _path, mut engine) = setup_temp_engine();

    engine.put("a", "1").unwrap();
    engine.put("a", "2").unwrap();
    engine.delete("a").unwrap();

    let records: Vec<(String, String, u64)> = engine
        .records()
        .unwrap()
        .map(|r| {
            let r = r.unwrap();
            (r.entry.key, r.entry.value, r.offset)
        })
        .collect();

    assert_eq!(
        records,
        vec![
            ("a".to_string(), String::new(), 8),
            ("a".to_string(), "2".to_string(), 4),
            ("a".to_string(), "1".to_string(), 0),
        ]
    );
    assert!(live_entries(&mut engine).is_empty());
}
