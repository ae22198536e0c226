//! Credential checks and session persistence over key-value storage.
//!
//! Credentials are a local mock: passwords are stored and compared as
//! entered, exactly as the browser app does with its registry.

use crate::config::CoreConfig;
use crate::model::user::{SessionUser, UserRole};
use crate::storage::{KeyValueStorage, StorageError};
use crate::store::LocalStore;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Storage key of the current session user.
pub const SESSION_KEY: &str = "user";
/// Storage key of every registered user.
pub const REGISTRY_KEY: &str = "app_users_registry";

pub const DEMO_MANAGER_EMAIL: &str = "manager@example.com";
const DEMO_MANAGER_PASSWORD: &str = "password";
pub const GUEST_EMAIL: &str = "guest@codehustlers.dev";

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug)]
pub enum SessionError {
    InvalidCredentials,
    EmailTaken(String),
    InvalidInviteCode(String),
    NotLoggedIn,
    InvalidPatch(String),
    Corrupt { key: &'static str, message: String },
    Storage(StorageError),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "invalid email or password"),
            Self::EmailTaken(email) => write!(f, "email already exists: {email}"),
            Self::InvalidInviteCode(code) => write!(f, "invalid invite code: {code}"),
            Self::NotLoggedIn => write!(f, "no active session"),
            Self::InvalidPatch(message) => write!(f, "invalid profile update: {message}"),
            Self::Corrupt { key, message } => {
                write!(f, "corrupt session data under `{key}`: {message}")
            }
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StorageError> for SessionError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Sign-up input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    /// Defaults to `member`.
    pub role: Option<UserRole>,
    /// Joins the inviter's team when set; otherwise a new team is created.
    pub invite_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RegisteredUser {
    #[serde(flatten)]
    user: SessionUser,
    password: String,
}

/// Session facade over the shared key-value storage.
pub struct SessionService {
    storage: Arc<dyn KeyValueStorage>,
    config: CoreConfig,
}

impl SessionService {
    pub fn new(storage: Arc<dyn KeyValueStorage>, config: CoreConfig) -> Self {
        Self { storage, config }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Registers a user and starts their session.
    ///
    /// # Errors
    /// - `EmailTaken` when the email is already registered.
    /// - `InvalidInviteCode` when `invite_code` matches no registered user.
    pub async fn register(&self, request: RegisterRequest) -> SessionResult<SessionUser> {
        delay(self.config.auth_latency).await;

        let email = request.email.trim().to_string();
        let mut outcome: Option<SessionResult<SessionUser>> = None;
        self.storage
            .replace_item(REGISTRY_KEY, &mut |current: Option<&str>| {
                let result = decode_registry(current).and_then(|mut registry| {
                    let user = admit(&registry, &email, &request)?;
                    registry.push(RegisteredUser {
                        user: user.clone(),
                        password: request.password.clone(),
                    });
                    Ok((user, encode(&registry)?))
                });
                match result {
                    Ok((user, payload)) => {
                        outcome = Some(Ok(user));
                        Some(payload)
                    }
                    Err(err) => {
                        outcome = Some(Err(err));
                        None
                    }
                }
            })?;

        let user = outcome.unwrap_or(Err(SessionError::Corrupt {
            key: REGISTRY_KEY,
            message: "registry transform was not applied".to_string(),
        }))?;
        self.persist_session(&user)?;
        info!(
            "event=session_register module=session status=ok role={} joined_by_invite={}",
            user.role.as_str(),
            request.invite_code.is_some()
        );
        Ok(user)
    }

    /// Authenticates against the registry, then the built-in demo manager.
    pub async fn login(&self, email: &str, password: &str) -> SessionResult<SessionUser> {
        delay(self.config.auth_latency).await;

        let email = email.trim();
        let registry = decode_registry(self.storage.get_item(REGISTRY_KEY)?.as_deref())?;
        let user = match registry
            .into_iter()
            .find(|entry| entry.user.email == email && entry.password == password)
        {
            Some(entry) => entry.user,
            None if email == DEMO_MANAGER_EMAIL && password == DEMO_MANAGER_PASSWORD => {
                demo_manager()
            }
            None => {
                warn!("event=session_login module=session status=rejected");
                return Err(SessionError::InvalidCredentials);
            }
        };

        self.persist_session(&user)?;
        info!(
            "event=session_login module=session status=ok role={}",
            user.role.as_str()
        );
        Ok(user)
    }

    /// Starts a team-less guest session.
    pub async fn login_as_guest(&self) -> SessionResult<SessionUser> {
        delay(self.config.guest_latency).await;

        let user = SessionUser {
            id: format!("guest_{}", random_token(9)),
            email: GUEST_EMAIL.to_string(),
            full_name: "Guest User".to_string(),
            role: UserRole::Guest,
            team_id: None,
            invite_code: None,
            avatar: None,
        };
        self.persist_session(&user)?;
        info!("event=session_login module=session status=ok role=guest");
        Ok(user)
    }

    pub fn logout(&self) -> SessionResult<()> {
        self.storage.remove_item(SESSION_KEY)?;
        info!("event=session_logout module=session status=ok");
        Ok(())
    }

    /// Restores the persisted session, if any.
    pub fn current_user(&self) -> SessionResult<Option<SessionUser>> {
        let Some(payload) = self.storage.get_item(SESSION_KEY)? else {
            return Ok(None);
        };
        serde_json::from_str(&payload)
            .map(Some)
            .map_err(|err| SessionError::Corrupt {
                key: SESSION_KEY,
                message: err.to_string(),
            })
    }

    /// Merges `patch` into the session user and persists it.
    ///
    /// `id` and `team_id` are identity fields and are never patched.
    pub fn update_user(&self, patch: Value) -> SessionResult<SessionUser> {
        let Value::Object(mut patch) = patch else {
            return Err(SessionError::InvalidPatch(
                "expected a JSON object".to_string(),
            ));
        };
        patch.remove("id");
        patch.remove("team_id");
        patch.remove("password");

        let current = self.current_user()?.ok_or(SessionError::NotLoggedIn)?;
        let mut merged = match serde_json::to_value(&current) {
            Ok(Value::Object(fields)) => fields,
            Ok(_) | Err(_) => {
                return Err(SessionError::InvalidPatch(
                    "session user is not an object".to_string(),
                ))
            }
        };
        merged.extend(patch);

        let mut updated: SessionUser = serde_json::from_value(Value::Object(merged))
            .map_err(|err| SessionError::InvalidPatch(err.to_string()))?;
        updated.id = current.id;
        updated.team_id = current.team_id;

        self.persist_session(&updated)?;
        Ok(updated)
    }

    /// Store handle scoped to the current session's team.
    pub fn store(&self) -> SessionResult<LocalStore> {
        let user = self.current_user()?;
        Ok(LocalStore::for_user(
            Arc::clone(&self.storage),
            user.as_ref(),
            &self.config,
        ))
    }

    fn persist_session(&self, user: &SessionUser) -> SessionResult<()> {
        let payload = serde_json::to_string(user).map_err(|err| SessionError::Corrupt {
            key: SESSION_KEY,
            message: err.to_string(),
        })?;
        self.storage.set_item(SESSION_KEY, &payload)?;
        Ok(())
    }
}

fn admit(
    registry: &[RegisteredUser],
    email: &str,
    request: &RegisterRequest,
) -> SessionResult<SessionUser> {
    if registry.iter().any(|entry| entry.user.email == email) {
        return Err(SessionError::EmailTaken(email.to_string()));
    }

    let (team_id, invite_code) = match request.invite_code.as_deref().map(str::trim) {
        Some(code) if !code.is_empty() => registry
            .iter()
            .find(|entry| entry.user.invite_code.as_deref() == Some(code))
            .and_then(|owner| {
                owner
                    .user
                    .team_id
                    .clone()
                    .map(|team_id| (team_id, code.to_string()))
            })
            .ok_or_else(|| SessionError::InvalidInviteCode(code.to_string()))?,
        _ => (
            format!("team_{}", random_token(9)),
            format!("INV-{}", random_token(6).to_ascii_uppercase()),
        ),
    };

    Ok(SessionUser {
        id: random_token(9),
        email: email.to_string(),
        full_name: request.full_name.trim().to_string(),
        role: request.role.unwrap_or_default(),
        team_id: Some(team_id),
        invite_code: Some(invite_code),
        avatar: None,
    })
}

fn demo_manager() -> SessionUser {
    SessionUser {
        id: "1".to_string(),
        email: DEMO_MANAGER_EMAIL.to_string(),
        full_name: "Assignee Manager".to_string(),
        role: UserRole::Manager,
        team_id: Some("team_demo".to_string()),
        invite_code: Some("DEMO-123".to_string()),
        avatar: None,
    }
}

fn decode_registry(payload: Option<&str>) -> SessionResult<Vec<RegisteredUser>> {
    match payload {
        None => Ok(Vec::new()),
        Some(payload) => serde_json::from_str(payload).map_err(|err| SessionError::Corrupt {
            key: REGISTRY_KEY,
            message: err.to_string(),
        }),
    }
}

fn encode(registry: &[RegisteredUser]) -> SessionResult<String> {
    serde_json::to_string(registry).map_err(|err| SessionError::Corrupt {
        key: REGISTRY_KEY,
        message: err.to_string(),
    })
}

/// Lowercase alphanumeric token cut from a random UUID.
fn random_token(len: usize) -> String {
    Uuid::new_v4().simple().to_string().chars().take(len).collect()
}

async fn delay(latency: Duration) {
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }
}
