use hustleboard_core::{
    CoreConfig, EntityKind, KeyValueStorage, ListOptions, LocalStore, MemoryStorage, StoreError,
    TeamScope,
};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

fn store_on(storage: Arc<MemoryStorage>, team: &str) -> LocalStore {
    LocalStore::new(
        storage,
        TeamScope::new(team),
        &CoreConfig::default().without_latency(),
    )
}

fn fresh_store() -> LocalStore {
    store_on(Arc::new(MemoryStorage::new()), "team_a")
}

#[tokio::test]
async fn creates_append_with_unique_ids() {
    let tasks = fresh_store().tasks();

    for index in 0..25 {
        tasks
            .create(json!({ "title": format!("task {index}") }))
            .await
            .unwrap();
    }

    let all = tasks.list(&ListOptions::default()).await.unwrap();
    assert_eq!(all.len(), 25);
    let ids: HashSet<_> = all.iter().map(|record| record.id().unwrap()).collect();
    assert_eq!(ids.len(), 25);
    assert_eq!(all[0].str_field("title"), Some("task 0"));
    assert_eq!(all[24].str_field("title"), Some("task 24"));
}

#[tokio::test]
async fn create_then_get_returns_superset_of_input() {
    let tasks = fresh_store().tasks();

    let created = tasks
        .create(json!({
            "title": "Write release notes",
            "priority": "high",
            "assigned_to": "dev@example.com"
        }))
        .await
        .unwrap();
    let id = created.id().unwrap().to_string();

    let loaded = tasks.get(&id).await.unwrap().unwrap();
    assert_eq!(loaded, created);
    assert_eq!(loaded.str_field("title"), Some("Write release notes"));
    assert_eq!(loaded.str_field("priority"), Some("high"));
    assert_eq!(loaded.str_field("assigned_to"), Some("dev@example.com"));
    assert!(loaded.created_at().is_some());
    assert_eq!(loaded.created_at(), loaded.updated_at());
}

#[tokio::test]
async fn create_ignores_caller_supplied_identity_fields() {
    let tasks = fresh_store().tasks();

    let created = tasks
        .create(json!({
            "id": "forged",
            "created_at": "1999-01-01T00:00:00.000Z",
            "title": "Real task"
        }))
        .await
        .unwrap();

    assert_ne!(created.id(), Some("forged"));
    assert_ne!(created.created_at(), Some("1999-01-01T00:00:00.000Z"));
    assert!(tasks.get("forged").await.unwrap().is_none());
}

#[tokio::test]
async fn create_rejects_non_object_payload() {
    let tasks = fresh_store().tasks();

    let err = tasks.create(json!(["not", "an", "object"])).await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidRecord(_)));
    assert!(tasks.list(&ListOptions::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn update_merges_fields_and_refreshes_updated_at() {
    let tasks = fresh_store().tasks();
    let created = tasks
        .create(json!({ "title": "Draft", "status": "todo", "priority": "low" }))
        .await
        .unwrap();
    let id = created.id().unwrap().to_string();

    tokio::time::sleep(Duration::from_millis(5)).await;
    let updated = tasks
        .update(&id, json!({ "status": "in_progress", "id": "other" }))
        .await
        .unwrap();

    assert_eq!(updated.id(), Some(id.as_str()));
    assert_eq!(updated.str_field("status"), Some("in_progress"));
    assert_eq!(updated.str_field("priority"), Some("low"));
    assert_eq!(updated.created_at(), created.created_at());
    assert_ne!(updated.updated_at(), created.updated_at());
    assert_eq!(tasks.get(&id).await.unwrap().unwrap(), updated);
}

#[tokio::test]
async fn update_unknown_id_fails_and_leaves_collection_unchanged() {
    let storage = Arc::new(MemoryStorage::new());
    let tasks = store_on(Arc::clone(&storage), "team_a").tasks();
    tasks.create(json!({ "title": "Only task" })).await.unwrap();
    let before = storage.get_item(tasks.storage_key()).unwrap();

    let err = tasks
        .update("missing", json!({ "title": "ghost" }))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(matches!(
        err,
        StoreError::NotFound { kind: EntityKind::Task, ref id } if id == "missing"
    ));
    assert_eq!(storage.get_item(tasks.storage_key()).unwrap(), before);
}

#[tokio::test]
async fn delete_then_get_returns_none_and_absent_delete_is_noop() {
    let tasks = fresh_store().tasks();
    let keep = tasks.create(json!({ "title": "keep" })).await.unwrap();
    let drop = tasks.create(json!({ "title": "drop" })).await.unwrap();
    let drop_id = drop.id().unwrap().to_string();

    assert!(tasks.delete(&drop_id).await.unwrap());
    assert!(tasks.get(&drop_id).await.unwrap().is_none());

    assert!(tasks.delete("never-existed").await.unwrap());
    let remaining = tasks.list(&ListOptions::default()).await.unwrap();
    assert_eq!(remaining, vec![keep]);
}

#[tokio::test]
async fn get_on_empty_collection_is_none_not_error() {
    let meetings = fresh_store().meetings();
    assert!(meetings.get("anything").await.unwrap().is_none());
    assert!(meetings
        .list(&ListOptions::default())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn collections_are_partitioned_by_team_and_kind() {
    let storage = Arc::new(MemoryStorage::new());
    let team_a = store_on(Arc::clone(&storage), "team_a");
    let team_b = store_on(Arc::clone(&storage), "team_b");

    team_a.tasks().create(json!({ "title": "a" })).await.unwrap();
    team_b.tasks().create(json!({ "title": "b" })).await.unwrap();
    team_a.projects().create(json!({ "name": "p" })).await.unwrap();

    let a_tasks = team_a.tasks().list(&ListOptions::default()).await.unwrap();
    assert_eq!(a_tasks.len(), 1);
    assert_eq!(a_tasks[0].str_field("title"), Some("a"));
    assert_eq!(
        storage.keys().unwrap(),
        vec![
            "app_data_team_a_project".to_string(),
            "app_data_team_a_task".to_string(),
            "app_data_team_b_task".to_string(),
        ]
    );
}

#[tokio::test]
async fn no_session_scopes_to_default_collection() {
    let storage = Arc::new(MemoryStorage::new());
    let store = LocalStore::for_user(
        Arc::clone(&storage) as Arc<dyn KeyValueStorage>,
        None,
        &CoreConfig::default().without_latency(),
    );

    store.feedback().create(json!({ "content": "hi" })).await.unwrap();
    assert_eq!(store.scope().as_str(), "default");
    assert!(storage
        .get_item("app_data_default_feedback")
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn corrupt_payload_is_reported_distinctly_from_empty() {
    let storage = Arc::new(MemoryStorage::new());
    let tasks = store_on(Arc::clone(&storage), "team_a").tasks();
    storage.set_item(tasks.storage_key(), "{not json").unwrap();

    let err = tasks.list(&ListOptions::default()).await.unwrap_err();
    assert!(matches!(err, StoreError::CorruptCollection { .. }));

    let err = tasks.create(json!({ "title": "x" })).await.unwrap_err();
    assert!(matches!(err, StoreError::CorruptCollection { .. }));
    assert_eq!(
        storage.get_item(tasks.storage_key()).unwrap().as_deref(),
        Some("{not json")
    );
}

#[tokio::test]
async fn quota_failure_surfaces_as_storage_error() {
    let storage = Arc::new(MemoryStorage::with_quota(64));
    let tasks = store_on(Arc::clone(&storage), "team_a").tasks();

    let err = tasks
        .create(json!({ "title": "x".repeat(200) }))
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::Storage(_)));
    assert!(!err.is_not_found());
    assert!(storage.get_item(tasks.storage_key()).unwrap().is_none());
}

#[tokio::test(start_paused = true)]
async fn every_operation_waits_for_configured_latency() {
    let store = LocalStore::new(
        Arc::new(MemoryStorage::new()),
        TeamScope::new("team_a"),
        &CoreConfig::default(),
    );
    let tasks = store.tasks();

    let started = tokio::time::Instant::now();
    let created = tasks.create(json!({ "title": "slow" })).await.unwrap();
    assert!(started.elapsed() >= Duration::from_millis(300));

    let started = tokio::time::Instant::now();
    tasks.get(created.id().unwrap()).await.unwrap();
    assert!(started.elapsed() >= Duration::from_millis(300));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_never_lose_writes() {
    let tasks = fresh_store().tasks();

    let handles: Vec<_> = (0..32)
        .map(|index| {
            let tasks = tasks.clone();
            tokio::spawn(async move { tasks.create(json!({ "index": index })).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let all = tasks.list(&ListOptions::default()).await.unwrap();
    assert_eq!(all.len(), 32);
}
