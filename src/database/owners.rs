use sqlx::PgPool;
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::policy::{OwnerIndex, ProtectedRow};

/// Load customer -> user ownership for every customer referenced by `rows`, in one query
pub async fn load_owner_index(
    pool: &PgPool,
    rows: &[ProtectedRow],
    customer_field: &str,
) -> Result<OwnerIndex, DatabaseError> {
    let customer_ids: Vec<Uuid> = rows
        .iter()
        .filter_map(|row| row.uuid_field(customer_field))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    if customer_ids.is_empty() {
        return Ok(OwnerIndex::new());
    }

    let pairs: Vec<(Uuid, Option<Uuid>)> = sqlx::query_as(
        "SELECT id, user_id FROM customers WHERE id = ANY($1)"
    )
    .bind(&customer_ids)
    .fetch_all(pool)
    .await?;

    Ok(pairs
        .into_iter()
        .filter_map(|(customer_id, user_id)| user_id.map(|u| (customer_id, u)))
        .collect())
}
