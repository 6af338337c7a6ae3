//! Wire format tests for the sync protocol.
//!
//! Devices and the server exchange plain JSON arrays of todo objects keyed by
//! `id` and `device`.

use serde_json::json;
use todosync_engine::{ReconcileReport, Record, RemoteRecord};

#[test]
fn record_uses_device_on_the_wire() {
    let record = Record::new(3, "Pixel 7|2022|Android|TQ3A", "Groceries", "Milk").unwrap();

    let value = serde_json::to_value(&record).unwrap();

    assert_eq!(
        value,
        json!({
            "id": 3,
            "device": "Pixel 7|2022|Android|TQ3A",
            "title": "Groceries",
            "content": "Milk"
        })
    );
}

#[test]
fn pushed_body_is_a_record_array() {
    let body = r#"[
        {"id": 1, "device": "dev1", "title": "a", "content": "x"},
        {"id": 2, "device": "dev1", "title": "b", "content": "y"}
    ]"#;

    let records: Vec<Record> = serde_json::from_str(body).unwrap();

    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.is_owned_by("dev1")));
}

#[test]
fn pulled_entries_tolerate_missing_fields() {
    let body = json!([
        {"id": 1, "device": "dev1", "title": "a", "content": "x"},
        {"id": 2, "device": "dev1"},
        {"title": "orphan"}
    ]);

    let entries: Vec<RemoteRecord> = body
        .as_array()
        .unwrap()
        .iter()
        .cloned()
        .map(RemoteRecord::from)
        .collect();

    assert!(Record::try_from(entries[0].clone()).is_ok());
    assert!(entries[1].key().is_some());
    assert!(Record::try_from(entries[1].clone()).is_err());
    assert!(entries[2].key().is_none());
}

#[test]
fn extra_fields_are_ignored() {
    let entry = RemoteRecord::from(json!({
        "id": 4,
        "device": "dev2",
        "title": "t",
        "content": "c",
        "createdAt": "2024-01-01"
    }));

    let record = Record::try_from(entry).unwrap();
    assert_eq!(record.key().to_string(), "dev2/4");
}

#[test]
fn push_response_is_camel_case() {
    let report = ReconcileReport {
        inserted: 1,
        updated: 2,
        deleted: 3,
        skipped: 0,
        failed: 0,
    };

    let value = serde_json::to_value(report).unwrap();

    assert_eq!(
        value,
        json!({"inserted": 1, "updated": 2, "deleted": 3, "skipped": 0, "failed": 0})
    );
}
