/// History log persistence through the on-disk store
mod common;

use ai_compare::history::{FileHistoryStore, HistoryLog, HistoryStore};
use ai_compare::models::ProviderId;
use common::{DataDirBuilder, HistoryEntryBuilder};

#[test]
fn test_round_trip_preserves_entries() {
    let data_dir = DataDirBuilder::new();
    let store = FileHistoryStore::new(data_dir.history_path());

    let entries = vec![
        HistoryEntryBuilder::new(2_000).query("second").response(ProviderId::Grok, "g").build(),
        HistoryEntryBuilder::new(1_000)
            .query("first\nwith two lines")
            .response(ProviderId::Claude, "Error: HTTP 500")
            .build(),
    ];
    store.save(&entries).unwrap();

    assert_eq!(store.load().unwrap(), entries);
}

#[test]
fn test_stored_shape_has_all_provider_keys() {
    let data_dir = DataDirBuilder::new();
    let store = FileHistoryStore::new(data_dir.history_path());
    store.save(&[HistoryEntryBuilder::new(1).query("q").build()]).unwrap();

    let raw = std::fs::read_to_string(data_dir.history_path()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let responses = value[0]["responses"].as_object().unwrap();
    let mut keys: Vec<&str> = responses.keys().map(String::as_str).collect();
    keys.sort();
    assert_eq!(keys, vec!["chatgpt", "claude", "grok", "perplexity"]);
    assert!(responses.values().all(|v| v == ""));
    assert!(value[0].get("createdAt").is_some());
}

#[test]
fn test_missing_and_empty_logs_both_load_empty() {
    let never_written = DataDirBuilder::new();
    let store = FileHistoryStore::new(never_written.history_path());
    assert!(store.load().unwrap().is_empty());

    let empty_array = DataDirBuilder::new().with_raw_history("[]");
    let store = FileHistoryStore::new(empty_array.history_path());
    assert!(store.load().unwrap().is_empty());
}

#[test]
fn test_clear_removes_file_rather_than_writing_empty_array() {
    let data_dir = DataDirBuilder::new().with_entries(&[HistoryEntryBuilder::new(1)]);
    let mut log = HistoryLog::open(Box::new(FileHistoryStore::new(data_dir.history_path())));
    assert_eq!(log.len(), 1);

    log.clear().unwrap();
    assert!(!data_dir.history_path().exists());

    let reopened = HistoryLog::open(Box::new(FileHistoryStore::new(data_dir.history_path())));
    assert!(reopened.is_empty());
}

#[test]
fn test_corrupted_file_fails_load_but_opens_empty() {
    let data_dir = DataDirBuilder::new().with_raw_history(r#"[{"id": "not a number"}]"#);
    let store = FileHistoryStore::new(data_dir.history_path());

    let err = store.load().unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to parse history file"));

    let log = HistoryLog::open(Box::new(store));
    assert!(log.is_empty());
}

#[test]
fn test_partial_response_map_is_filled() {
    let data_dir = DataDirBuilder::new().with_raw_history(
        r#"[{"id": 5, "query": "q", "createdAt": "2025-01-01T00:00:00Z", "responses": {"claude": "hi"}}]"#,
    );
    let log = HistoryLog::open(Box::new(FileHistoryStore::new(data_dir.history_path())));

    let entry = log.get(5).unwrap();
    assert_eq!(entry.response(ProviderId::Claude), "hi");
    assert_eq!(entry.response(ProviderId::Perplexity), "");
}

#[test]
fn test_save_creates_missing_data_directory() {
    let data_dir = DataDirBuilder::new();
    let nested = data_dir.path().join("nested").join("history.json");
    let store = FileHistoryStore::new(&nested);

    store.save(&[HistoryEntryBuilder::new(1).build()]).unwrap();
    assert!(nested.exists());
    assert!(!nested.with_extension("json.tmp").exists());
}
