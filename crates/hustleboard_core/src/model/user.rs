//! Session user shape.

use serde::{Deserialize, Serialize};

/// Role carried by a session user. Unknown role strings read as `Member`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Manager,
    Guest,
    #[default]
    #[serde(other)]
    Member,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Manager => "manager",
            Self::Member => "member",
            Self::Guest => "guest",
        }
    }
}

/// The logged-in user. Never carries a password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub role: UserRole,
    /// Team partition key; guests have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invite_code: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl SessionUser {
    pub fn is_manager(&self) -> bool {
        self.role == UserRole::Manager
    }

    /// Whether `reference` names this user by id or by email.
    pub fn is_referenced_by(&self, reference: &str) -> bool {
        reference == self.id || reference == self.email
    }
}

#[cfg(test)]
mod tests {
    use super::{SessionUser, UserRole};
    use serde_json::json;

    #[test]
    fn role_strings_round_trip_in_snake_case() {
        for role in [UserRole::Manager, UserRole::Guest, UserRole::Member] {
            let encoded = serde_json::to_value(role).unwrap();
            assert_eq!(encoded, json!(role.as_str()));
            assert_eq!(serde_json::from_value::<UserRole>(encoded).unwrap(), role);
        }
    }

    #[test]
    fn unknown_role_reads_as_member() {
        let role: UserRole = serde_json::from_value(json!("admin")).unwrap();
        assert_eq!(role, UserRole::Member);

        let user: SessionUser = serde_json::from_value(json!({
            "id": "u1",
            "email": "a@example.com",
            "role": "superuser"
        }))
        .unwrap();
        assert_eq!(user.role, UserRole::Member);
        assert!(!user.is_manager());
    }
}
