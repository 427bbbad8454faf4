//! End-to-end-ish store scenarios against a real on-disk file.

use typetrace_backend::model::KeystrokeEvent;
use typetrace_backend::store::{KeystrokeStore, Store};

fn event(scan_code: u32, name: &str, date: &str) -> KeystrokeEvent {
    KeystrokeEvent::at(scan_code, Some(name), date.to_string())
}

#[test]
fn single_key_day_scenario() {
    let tmp = tempfile::tempdir().expect("tempdir should be creatable");
    let path = tmp.path().join("typetrace").join("TypeTrace.db");

    let mut store = Store::open(&path).expect("store should open");
    let batch = vec![
        event(30, "KEY_A", "2024-01-01"),
        event(30, "KEY_A", "2024-01-01"),
        event(30, "KEY_A", "2024-01-01"),
    ];
    store.write_batch(&batch).expect("batch should commit");

    let row = store
        .read_row(30, "2024-01-01")
        .expect("query should succeed")
        .expect("row should exist");
    assert_eq!(row.scan_code, 30);
    assert_eq!(row.key_name, "KEY_A");
    assert_eq!(row.count, 3);

    assert!(path.exists());
}

#[test]
fn multi_key_coalesce_scenario() {
    let tmp = tempfile::tempdir().expect("tempdir should be creatable");
    let path = tmp.path().join("TypeTrace.db");
    let mut store = Store::open(&path).expect("store should open");

    let batch: Vec<_> = (0..50).map(|_| event(30, "KEY_A", "2024-01-01")).collect();
    store.write_batch(&batch).expect("batch should commit");

    let row = store
        .read_row(30, "2024-01-01")
        .expect("query should succeed")
        .expect("row should exist");
    assert_eq!(row.count, 50);
}

#[test]
fn reopening_the_store_preserves_counts() {
    let tmp = tempfile::tempdir().expect("tempdir should be creatable");
    let path = tmp.path().join("TypeTrace.db");

    {
        let mut store = Store::open(&path).expect("store should open");
        store
            .write_batch(&[event(30, "KEY_A", "2024-01-01")])
            .expect("batch should commit");
    }

    let store = Store::open(&path).expect("store should reopen");
    let row = store
        .read_row(30, "2024-01-01")
        .expect("query should succeed")
        .expect("row should exist");
    assert_eq!(row.count, 1);
}
