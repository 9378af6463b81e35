use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashSet;
use uuid::Uuid;

use crate::auth::{Role, RoleLookupError, RoleStore};

/// Role lookups against Supabase's `user_roles` table and `has_role()` function
#[derive(Clone)]
pub struct PgRoleStore {
    pool: PgPool,
}

impl PgRoleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn lookup_error(e: sqlx::Error) -> RoleLookupError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            RoleLookupError::Unavailable(e.to_string())
        }
        other => RoleLookupError::Query(other.to_string()),
    }
}

#[async_trait]
impl RoleStore for PgRoleStore {
    async fn get_roles(&self, user_id: Uuid) -> Result<Option<HashSet<Role>>, RoleLookupError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT role::text FROM user_roles WHERE user_id = $1"
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(lookup_error)?;

        if rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(rows.iter().map(|(role,)| Role::from(role.as_str())).collect()))
    }

    async fn has_role(&self, user_id: Uuid, role: &Role) -> Result<bool, RoleLookupError> {
        let (granted,): (Option<bool>,) = sqlx::query_as("SELECT has_role($1, $2)")
            .bind(user_id)
            .bind(role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(lookup_error)?;

        Ok(granted.unwrap_or(false))
    }
}
