use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::PrincipalContext;
use crate::database::load_owner_index;
use crate::error::ApiError;
use crate::handlers::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::policy::{Guard, OwnerIndex, ProtectedRow, Table};
use crate::types::Operation;

#[derive(Debug, Deserialize)]
pub struct AuthorizeRequest {
    pub rows: Vec<Value>,
    /// Customer id -> user id pairs for join-based ownership. Loaded from the
    /// database when omitted and a pool is available.
    #[serde(default)]
    pub owners: Option<OwnerIndex>,
}

#[derive(Debug, Serialize)]
pub struct AuthorizeResponse {
    pub table: Table,
    pub operation: Operation,
    pub policy: Option<String>,
    pub admitted: Vec<ProtectedRow>,
    pub denied: usize,
}

/// POST /api/authorize/:table/:operation - filter candidate rows through the table's policy
pub async fn authorize_post(
    State(state): State<AppState>,
    Extension(principal): Extension<PrincipalContext>,
    Path((table, operation)): Path<(String, String)>,
    payload: Result<Json<AuthorizeRequest>, JsonRejection>,
) -> ApiResult<AuthorizeResponse> {
    let table: Table = table.parse()?;
    let operation: Operation = operation.parse().map_err(ApiError::bad_request)?;
    let Json(request) = payload.map_err(|e| ApiError::invalid_json(e.body_text()))?;

    if request.rows.len() > state.max_rows_per_request {
        return Err(ApiError::payload_too_large(format!(
            "At most {} rows may be checked per request",
            state.max_rows_per_request
        )));
    }

    let submitted = request.rows.len();
    let rows: Vec<ProtectedRow> = request
        .rows
        .into_iter()
        .filter_map(ProtectedRow::from_value)
        .collect();
    if rows.len() < submitted {
        // Non-object rows cannot satisfy any guard
        tracing::debug!("Dropped {} malformed rows for {}", submitted - rows.len(), table);
    }

    let predicate = state.authorizer.registry().lookup(table, operation);
    let policy = predicate.map(|p| p.name.clone());

    let owners = match request.owners {
        Some(owners) => owners,
        None => {
            let join_field = predicate
                .filter(|p| p.principal_verdict(&principal).is_none())
                .and_then(|p| {
                    p.guards().find_map(|guard| match guard {
                        Guard::OwnerViaCustomer { field } => Some(*field),
                        _ => None,
                    })
                });
            match (join_field, state.pool.as_ref()) {
                (Some(field), Some(pool)) if principal.is_authenticated() => {
                    load_owner_index(pool, &rows, field).await?
                }
                _ => OwnerIndex::new(),
            }
        }
    };

    let admitted = state
        .authorizer
        .filter_rows(table, operation, &principal, rows, &owners);
    let denied = submitted - admitted.len();

    Ok(ApiResponse::success(AuthorizeResponse {
        table,
        operation,
        policy,
        admitted,
        denied,
    }))
}
