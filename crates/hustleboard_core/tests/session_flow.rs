use hustleboard_core::session::{DEMO_MANAGER_EMAIL, GUEST_EMAIL, REGISTRY_KEY, SESSION_KEY};
use hustleboard_core::{
    CoreConfig, KeyValueStorage, ListOptions, MemoryStorage, RegisterRequest, SessionError,
    SessionService, UserRole,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn service() -> (Arc<MemoryStorage>, SessionService) {
    let storage = Arc::new(MemoryStorage::new());
    let service = SessionService::new(
        Arc::clone(&storage) as Arc<dyn KeyValueStorage>,
        CoreConfig::default().without_latency(),
    );
    (storage, service)
}

fn request(email: &str, invite_code: Option<&str>) -> RegisterRequest {
    RegisterRequest {
        email: email.to_string(),
        password: "hunter2".to_string(),
        full_name: "Test User".to_string(),
        role: None,
        invite_code: invite_code.map(str::to_string),
    }
}

#[tokio::test]
async fn register_creates_team_and_starts_session() {
    let (storage, service) = service();

    let user = service.register(request("ana@example.com", None)).await.unwrap();

    assert_eq!(user.role, UserRole::Member);
    let team_id = user.team_id.clone().unwrap();
    assert!(team_id.starts_with("team_"));
    assert_eq!(team_id.len(), "team_".len() + 9);
    let invite = user.invite_code.clone().unwrap();
    assert!(invite.starts_with("INV-"));
    assert_eq!(invite, invite.to_ascii_uppercase());

    assert_eq!(service.current_user().unwrap(), Some(user));
    let session_payload = storage.get_item(SESSION_KEY).unwrap().unwrap();
    assert!(!session_payload.contains("hunter2"));
    let registry_payload = storage.get_item(REGISTRY_KEY).unwrap().unwrap();
    assert!(registry_payload.contains("hunter2"));
}

#[tokio::test]
async fn invite_code_joins_existing_team() {
    let (_, service) = service();
    let owner = service.register(request("owner@example.com", None)).await.unwrap();

    let member = service
        .register(request(
            "member@example.com",
            owner.invite_code.as_deref(),
        ))
        .await
        .unwrap();

    assert_eq!(member.team_id, owner.team_id);
    assert_eq!(member.invite_code, owner.invite_code);
    assert_ne!(member.id, owner.id);
}

#[tokio::test]
async fn register_rejects_duplicate_email_and_unknown_invite() {
    let (_, service) = service();
    service.register(request("ana@example.com", None)).await.unwrap();

    let err = service
        .register(request("ana@example.com", None))
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::EmailTaken(ref email) if email == "ana@example.com"));

    let err = service
        .register(request("bo@example.com", Some("INV-NOPE00")))
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::InvalidInviteCode(_)));
}

#[tokio::test]
async fn login_matches_registry_then_demo_manager() {
    let (_, service) = service();
    let registered = service
        .register(RegisterRequest {
            role: Some(UserRole::Manager),
            ..request("lead@example.com", None)
        })
        .await
        .unwrap();
    service.logout().unwrap();
    assert!(service.current_user().unwrap().is_none());

    let user = service.login("lead@example.com", "hunter2").await.unwrap();
    assert_eq!(user, registered);

    let demo = service.login(DEMO_MANAGER_EMAIL, "password").await.unwrap();
    assert_eq!(demo.id, "1");
    assert!(demo.is_manager());
    assert_eq!(demo.team_id.as_deref(), Some("team_demo"));

    let err = service.login("lead@example.com", "wrong").await.unwrap_err();
    assert!(matches!(err, SessionError::InvalidCredentials));
    assert_eq!(service.current_user().unwrap(), Some(demo));
}

#[tokio::test]
async fn guest_session_uses_default_scope() {
    let (_, service) = service();
    let guest = service.login_as_guest().await.unwrap();

    assert!(guest.id.starts_with("guest_"));
    assert_eq!(guest.email, GUEST_EMAIL);
    assert_eq!(guest.role, UserRole::Guest);
    assert!(guest.team_id.is_none());
    assert!(service.store().unwrap().scope().is_fallback());
}

#[tokio::test]
async fn session_store_is_scoped_to_team() {
    let (storage, service) = service();
    let user = service.login(DEMO_MANAGER_EMAIL, "password").await.unwrap();

    let store = service.store().unwrap();
    store.tasks().create(json!({ "title": "x" })).await.unwrap();

    assert_eq!(store.scope().as_str(), user.team_id.as_deref().unwrap());
    assert!(storage.get_item("app_data_team_demo_task").unwrap().is_some());

    service.logout().unwrap();
    let anonymous = service.store().unwrap();
    assert!(anonymous
        .tasks()
        .list(&ListOptions::default())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn update_user_merges_profile_but_keeps_identity() {
    let (_, service) = service();
    let user = service.login(DEMO_MANAGER_EMAIL, "password").await.unwrap();

    let updated = service
        .update_user(json!({
            "full_name": "Renamed Manager",
            "avatar": "avatar.png",
            "id": "hijack",
            "team_id": "other_team"
        }))
        .unwrap();

    assert_eq!(updated.full_name, "Renamed Manager");
    assert_eq!(updated.avatar.as_deref(), Some("avatar.png"));
    assert_eq!(updated.id, user.id);
    assert_eq!(updated.team_id, user.team_id);
    assert_eq!(service.current_user().unwrap(), Some(updated));
}

#[tokio::test]
async fn update_user_without_session_fails() {
    let (_, service) = service();
    let err = service.update_user(json!({ "full_name": "x" })).unwrap_err();
    assert!(matches!(err, SessionError::NotLoggedIn));
}

#[tokio::test]
async fn corrupt_session_payload_is_reported() {
    let (storage, service) = service();
    storage.set_item(SESSION_KEY, "not json").unwrap();

    let err = service.current_user().unwrap_err();
    assert!(matches!(err, SessionError::Corrupt { key, .. } if key == SESSION_KEY));
}

#[tokio::test(start_paused = true)]
async fn login_waits_for_auth_latency() {
    let service = SessionService::new(Arc::new(MemoryStorage::new()), CoreConfig::default());

    let started = tokio::time::Instant::now();
    service.login(DEMO_MANAGER_EMAIL, "password").await.unwrap();
    assert!(started.elapsed() >= Duration::from_millis(800));
}
