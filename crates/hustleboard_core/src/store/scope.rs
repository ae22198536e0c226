//! Team scope partitioning of storage keys.

use crate::model::record::EntityKind;
use crate::model::user::SessionUser;
use std::fmt::{Display, Formatter};

/// Scope used when no session (or a team-less session) is active.
pub const DEFAULT_TEAM_SCOPE: &str = "default";

/// Partition key selecting which collections a store handle reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TeamScope(String);

impl TeamScope {
    pub fn new(team_id: impl Into<String>) -> Self {
        let team_id = team_id.into();
        if team_id.trim().is_empty() {
            return Self::fallback();
        }
        Self(team_id)
    }

    pub fn fallback() -> Self {
        Self(DEFAULT_TEAM_SCOPE.to_string())
    }

    /// Scope for the given session; `default` without a user or team.
    pub fn from_user(user: Option<&SessionUser>) -> Self {
        user.and_then(|user| user.team_id.as_deref())
            .map_or_else(Self::fallback, Self::new)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_fallback(&self) -> bool {
        self.0 == DEFAULT_TEAM_SCOPE
    }

    /// Storage key holding the `kind` collection: `{prefix}{team}_{kind}`.
    pub fn collection_key(&self, prefix: &str, kind: EntityKind) -> String {
        format!("{prefix}{}_{}", self.0, kind.as_str())
    }
}

impl Display for TeamScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
