use axum::Extension;
use serde::Serialize;
use uuid::Uuid;

use crate::auth::PrincipalContext;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Serialize)]
pub struct WhoAmI {
    pub user_id: Option<Uuid>,
    pub authenticated: bool,
    pub is_admin: bool,
    pub is_staff: bool,
    pub is_manager: bool,
    pub is_dev_environment: bool,
}

impl From<&PrincipalContext> for WhoAmI {
    fn from(ctx: &PrincipalContext) -> Self {
        Self {
            user_id: ctx.user_id(),
            authenticated: ctx.is_authenticated(),
            is_admin: ctx.is_admin(),
            is_staff: ctx.is_staff(),
            is_manager: ctx.is_manager(),
            is_dev_environment: ctx.is_dev_environment(),
        }
    }
}

/// GET /api/whoami - the principal this request resolved to
pub async fn whoami_get(Extension(principal): Extension<PrincipalContext>) -> ApiResult<WhoAmI> {
    Ok(ApiResponse::success(WhoAmI::from(&principal)))
}
