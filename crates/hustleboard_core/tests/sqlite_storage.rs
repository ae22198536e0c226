use hustleboard_core::{
    CoreConfig, KeyValueStorage, ListOptions, LocalStore, SqliteStorage, TeamScope,
};
use serde_json::json;
use std::sync::Arc;

#[test]
fn set_get_remove_and_keys() {
    let storage = SqliteStorage::open_in_memory().unwrap();

    storage.set_item("b", "2").unwrap();
    storage.set_item("a", "1").unwrap();
    storage.set_item("a", "one").unwrap();

    assert_eq!(storage.get_item("a").unwrap().as_deref(), Some("one"));
    assert_eq!(storage.keys().unwrap(), vec!["a".to_string(), "b".to_string()]);

    storage.remove_item("a").unwrap();
    assert!(storage.get_item("a").unwrap().is_none());
}

#[test]
fn replace_item_without_write_keeps_value() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    storage.set_item("k", "v").unwrap();

    storage
        .replace_item("k", &mut |current: Option<&str>| {
            assert_eq!(current, Some("v"));
            None
        })
        .unwrap();
    storage
        .replace_item("fresh", &mut |current: Option<&str>| {
            assert!(current.is_none());
            Some("created".to_string())
        })
        .unwrap();

    assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("v"));
    assert_eq!(storage.get_item("fresh").unwrap().as_deref(), Some("created"));
}

#[tokio::test]
async fn collections_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.sqlite3");
    let config = CoreConfig::default().without_latency();

    let created = {
        let storage = Arc::new(SqliteStorage::open(&path).unwrap());
        let store = LocalStore::new(storage, TeamScope::new("team_demo"), &config);
        store
            .meetings()
            .create(json!({ "title": "Retro", "attendees": [] }))
            .await
            .unwrap()
    };

    let storage = Arc::new(SqliteStorage::open(&path).unwrap());
    let store = LocalStore::new(storage, TeamScope::new("team_demo"), &config);
    let meetings = store.meetings().list(&ListOptions::default()).await.unwrap();
    assert_eq!(meetings, vec![created]);
}
