#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use axum::Router;
use uuid::Uuid;

use prmcms_rls::auth::{
    issue_token, Claims, PrincipalResolver, Role, RoleLookupError, RoleStore, StaticEnvironment,
};
use prmcms_rls::handlers::AppState;
use prmcms_rls::policy::Authorizer;

pub const JWT_SECRET: &str = "integration-test-secret";

/// Role assignments held in memory, with a switch to simulate an unreachable store
#[derive(Default)]
pub struct InMemoryRoles {
    assignments: Mutex<HashMap<Uuid, HashSet<Role>>>,
    has_role_grants: Mutex<HashMap<Uuid, HashSet<Role>>>,
    failing: AtomicBool,
    lookups: AtomicUsize,
}

impl InMemoryRoles {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Rows in `user_roles`
    pub fn assign(&self, user_id: Uuid, roles: &[Role]) {
        self.assignments
            .lock()
            .unwrap()
            .entry(user_id)
            .or_default()
            .extend(roles.iter().cloned());
    }

    /// Roles only visible through the `has_role()` fallback
    pub fn grant_via_fallback(&self, user_id: Uuid, role: Role) {
        self.has_role_grants
            .lock()
            .unwrap()
            .entry(user_id)
            .or_default()
            .insert(role);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RoleStore for InMemoryRoles {
    async fn get_roles(&self, user_id: Uuid) -> Result<Option<HashSet<Role>>, RoleLookupError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(RoleLookupError::Unavailable("connection refused".to_string()));
        }
        Ok(self.assignments.lock().unwrap().get(&user_id).cloned())
    }

    async fn has_role(&self, user_id: Uuid, role: &Role) -> Result<bool, RoleLookupError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RoleLookupError::Unavailable("connection refused".to_string()));
        }
        Ok(self
            .has_role_grants
            .lock()
            .unwrap()
            .get(&user_id)
            .map(|roles| roles.contains(role))
            .unwrap_or(false))
    }
}

pub fn resolver(roles: Arc<InMemoryRoles>, dev: bool) -> PrincipalResolver {
    PrincipalResolver::new(roles, Arc::new(StaticEnvironment(dev)), JWT_SECRET)
}

pub fn token_for(user_id: Uuid) -> String {
    let claims = Claims::new(user_id, 1).expect("failed to build test claims");
    issue_token(&claims, JWT_SECRET).expect("failed to issue test token")
}

/// Router wired to in-memory roles and no database
pub fn test_app(roles: Arc<InMemoryRoles>, dev: bool) -> Router {
    let state = AppState::new(resolver(roles, dev), Authorizer::standard().unwrap(), None);
    prmcms_rls::build_router(state)
}

pub fn test_app_with_max_rows(roles: Arc<InMemoryRoles>, max_rows: usize) -> Router {
    let state = AppState::new(resolver(roles, false), Authorizer::standard().unwrap(), None)
        .with_max_rows(max_rows);
    prmcms_rls::build_router(state)
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, token: Option<&str>, body: &serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn body_json(response: axum::response::Response) -> anyhow::Result<serde_json::Value> {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}
