// Core.Id allocation across threads that each hold their own connection

use ruledesk_core::allocator::IdentifierAllocator;
use ruledesk_core::model::RulePatch;
use ruledesk_core::storage::RuleStorage;
use ruledesk_store::SqliteRuleStorage;
use serde_json::json;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

fn setup_db() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("rules.db");
    // migrate once up front so workers do not race on schema creation
    SqliteRuleStorage::open(&path, BUSY_TIMEOUT).expect("open store");
    (dir, path)
}

#[test]
fn test_concurrent_allocations_are_distinct_and_gapless() {
    let (_dir, path) = setup_db();
    let threads = 8;
    let per_thread = 5;

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let path = path.clone();
            thread::spawn(move || {
                let storage = SqliteRuleStorage::open(&path, BUSY_TIMEOUT).unwrap();
                (0..per_thread)
                    .map(|_| storage.allocate().unwrap().number())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut numbers: Vec<u32> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    numbers.sort_unstable();
    let expected: Vec<u32> = (1..=(threads * per_thread) as u32).collect();
    assert_eq!(numbers, expected);
}

#[test]
fn test_allocation_continues_after_stored_maximum() {
    let (_dir, path) = setup_db();
    let storage = SqliteRuleStorage::open(&path, BUSY_TIMEOUT).unwrap();
    let rule = storage
        .create_rule(String::new(), json!({"Core": {"Id": "CORE-000041"}}))
        .unwrap();

    assert_eq!(storage.allocate().unwrap().to_string(), "CORE-000042");

    // deleting the highest rule never rewinds the sequence
    storage.delete_rule(&rule.id).unwrap();
    assert_eq!(storage.current_max_identifier().unwrap(), None);
    assert_eq!(storage.allocate().unwrap().to_string(), "CORE-000043");
}

#[test]
fn test_hand_written_identifier_above_sequence_is_skipped() {
    let (_dir, path) = setup_db();
    let storage = SqliteRuleStorage::open(&path, BUSY_TIMEOUT).unwrap();
    assert_eq!(storage.allocate().unwrap().number(), 1);

    let rule = storage.create_rule("a: 1\n".into(), json!({"a": 1})).unwrap();
    storage
        .patch_rule(
            &rule.id,
            RulePatch::new(String::new(), json!({"Core": {"Id": "CORE-000100"}})),
        )
        .unwrap();

    assert_eq!(storage.allocate().unwrap().number(), 101);
}
