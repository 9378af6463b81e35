use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Roles stored in `user_roles.role`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
    Manager,
    Customer,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
            Role::Manager => "manager",
            Role::Customer => "customer",
            Role::Other(name) => name,
        }
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Role::Admin,
            "staff" => Role::Staff,
            "manager" => Role::Manager,
            "customer" => Role::Customer,
            other => Role::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone)]
pub enum RoleLookupError {
    #[error("Role store unavailable: {0}")]
    Unavailable(String),

    #[error("Role query failed: {0}")]
    Query(String),
}

/// Source of truth for role membership
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Roles assigned to the user, or `None` when the user has no assignment rows at all.
    /// An empty set and `None` are different: only `None` triggers the `has_role` fallback.
    async fn get_roles(&self, user_id: Uuid) -> Result<Option<HashSet<Role>>, RoleLookupError>;

    /// Explicit role-membership check used when no assignment rows exist
    async fn has_role(&self, user_id: Uuid, role: &Role) -> Result<bool, RoleLookupError>;
}
