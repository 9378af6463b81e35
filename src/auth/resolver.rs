use std::sync::Arc;
use uuid::Uuid;

use crate::auth::principal::{PrincipalContext, RoleFlags};
use crate::auth::roles::{Role, RoleLookupError, RoleStore};
use crate::auth::decode_token;
use crate::config;

/// Tells the resolver whether the dev override is in force
pub trait EnvironmentProvider: Send + Sync {
    fn is_dev_environment(&self) -> bool;
}

/// Environment flag taken from the global [`config::AppConfig`]
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigEnvironment;

impl EnvironmentProvider for ConfigEnvironment {
    fn is_dev_environment(&self) -> bool {
        config::config().dev_override_active()
    }
}

/// Fixed environment flag, for tools and tests that do not read the process config
#[derive(Debug, Clone, Copy)]
pub struct StaticEnvironment(pub bool);

impl EnvironmentProvider for StaticEnvironment {
    fn is_dev_environment(&self) -> bool {
        self.0
    }
}

/// Turns a session token into a [`PrincipalContext`].
///
/// Nothing is cached: every call re-reads role assignments so a revoked role
/// takes effect on the next request.
#[derive(Clone)]
pub struct PrincipalResolver {
    roles: Arc<dyn RoleStore>,
    environment: Arc<dyn EnvironmentProvider>,
    jwt_secret: String,
}

impl PrincipalResolver {
    pub fn new(
        roles: Arc<dyn RoleStore>,
        environment: Arc<dyn EnvironmentProvider>,
        jwt_secret: impl Into<String>,
    ) -> Self {
        Self {
            roles,
            environment,
            jwt_secret: jwt_secret.into(),
        }
    }

    pub async fn resolve_principal_context(&self, session_token: Option<&str>) -> PrincipalContext {
        let is_dev = self.environment.is_dev_environment();

        let Some(token) = session_token else {
            return PrincipalContext::anonymous(is_dev);
        };

        match decode_token(token, &self.jwt_secret) {
            Ok(claims) => self.resolve_user(claims.sub).await,
            Err(e) => {
                tracing::debug!("Session token rejected, resolving as anonymous: {}", e);
                PrincipalContext::anonymous(is_dev)
            }
        }
    }

    /// Resolve an already-authenticated user id.
    ///
    /// A failed role lookup yields [`PrincipalContext::unprivileged`] instead of an error:
    /// an authorization check that cannot complete must deny, not abort the request.
    pub async fn resolve_user(&self, user_id: Uuid) -> PrincipalContext {
        let is_dev = self.environment.is_dev_environment();

        match self.role_flags(user_id).await {
            Ok(flags) => {
                let ctx = PrincipalContext::from_flags(user_id, flags, is_dev);
                tracing::debug!(
                    "Resolved principal {}: admin={} staff={} manager={} dev={}",
                    user_id, ctx.is_admin(), ctx.is_staff(), ctx.is_manager(), is_dev
                );
                ctx
            }
            Err(e) => {
                tracing::error!("Role lookup failed for {}, failing closed: {}", user_id, e);
                PrincipalContext::unprivileged()
            }
        }
    }

    async fn role_flags(&self, user_id: Uuid) -> Result<RoleFlags, RoleLookupError> {
        if let Some(roles) = self.roles.get_roles(user_id).await? {
            return Ok(RoleFlags::from_roles(&roles));
        }

        // No assignment rows: ask the membership check instead of assuming no roles
        tracing::debug!("No user_roles rows for {}, using has_role fallback", user_id);
        let (admin, staff, manager) = futures::try_join!(
            self.roles.has_role(user_id, &Role::Admin),
            self.roles.has_role(user_id, &Role::Staff),
            self.roles.has_role(user_id, &Role::Manager),
        )?;

        Ok(RoleFlags { admin, staff, manager })
    }
}
