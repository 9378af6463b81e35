// HTTP handlers for the policy service
//
// Every route under /api runs behind resolve_principal_middleware, so handlers
// receive an already-resolved PrincipalContext and never look up roles themselves.

pub mod authorize;
pub mod health;
pub mod policies;
pub mod whoami;

pub use authorize::authorize_post;
pub use health::health_get;
pub use policies::policies_get;
pub use whoami::whoami_get;

use sqlx::PgPool;

use crate::auth::PrincipalResolver;
use crate::policy::Authorizer;

/// Shared per-process state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub resolver: PrincipalResolver,
    pub authorizer: Authorizer,
    /// Source of customer ownership for join-based policies; `None` when running without a database
    pub pool: Option<PgPool>,
    pub max_rows_per_request: usize,
}

impl AppState {
    pub fn new(resolver: PrincipalResolver, authorizer: Authorizer, pool: Option<PgPool>) -> Self {
        Self {
            resolver,
            authorizer,
            pool,
            max_rows_per_request: crate::config::config().api.max_rows_per_request,
        }
    }

    pub fn with_max_rows(mut self, max_rows_per_request: usize) -> Self {
        self.max_rows_per_request = max_rows_per_request;
        self
    }
}
