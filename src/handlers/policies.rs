use axum::extract::State;
use serde::Serialize;

use crate::handlers::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::policy::{PolicyPredicate, Table};

#[derive(Debug, Serialize)]
pub struct PolicyListing {
    pub table: Table,
    #[serde(flatten)]
    pub predicate: PolicyPredicate,
}

/// GET /api/policies - the active policy set, one entry per (table, command)
pub async fn policies_get(State(state): State<AppState>) -> ApiResult<Vec<PolicyListing>> {
    let listing = state
        .authorizer
        .registry()
        .iter()
        .map(|(table, predicate)| PolicyListing {
            table,
            predicate: predicate.clone(),
        })
        .collect();

    Ok(ApiResponse::success(listing))
}
