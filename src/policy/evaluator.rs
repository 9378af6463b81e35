use std::sync::Arc;

use crate::auth::PrincipalContext;
use crate::policy::error::PolicyError;
use crate::policy::registry::PolicyRegistry;
use crate::policy::row::{OwnerIndex, ProtectedRow};
use crate::policy::rule::PolicyPredicate;
use crate::policy::table::Table;
use crate::types::Operation;

/// Applies registry predicates to candidate rows.
///
/// The caller resolves the [`PrincipalContext`] once and passes it by reference;
/// nothing here performs identity or role lookups.
#[derive(Debug, Clone)]
pub struct Authorizer {
    registry: Arc<PolicyRegistry>,
}

impl Authorizer {
    /// Refuses to build unless every known (table, operation) pair has a policy
    pub fn new(registry: PolicyRegistry) -> Result<Self, PolicyError> {
        registry.verify_coverage(&PolicyRegistry::required_pairs())?;
        Ok(Self {
            registry: Arc::new(registry),
        })
    }

    pub fn standard() -> Result<Self, PolicyError> {
        Self::new(PolicyRegistry::standard()?)
    }

    pub fn registry(&self) -> &PolicyRegistry {
        &self.registry
    }

    /// Single-row check without join data: join-based ownership never matches here
    pub fn is_authorized(
        &self,
        table: Table,
        operation: Operation,
        ctx: &PrincipalContext,
        row: &ProtectedRow,
    ) -> bool {
        self.is_authorized_with(table, operation, ctx, row, &OwnerIndex::new())
    }

    pub fn is_authorized_with(
        &self,
        table: Table,
        operation: Operation,
        ctx: &PrincipalContext,
        row: &ProtectedRow,
        owners: &OwnerIndex,
    ) -> bool {
        let Some(predicate) = self.predicate(table, operation) else {
            return false;
        };

        let allowed = predicate.evaluate(ctx, row, owners);
        if !allowed {
            tracing::debug!("Policy '{}' denied {} on {} for {:?}", predicate.name, operation, table, ctx.user_id());
        }
        allowed
    }

    /// Keep only the rows the principal may see or write
    pub fn filter_rows(
        &self,
        table: Table,
        operation: Operation,
        ctx: &PrincipalContext,
        rows: Vec<ProtectedRow>,
        owners: &OwnerIndex,
    ) -> Vec<ProtectedRow> {
        let Some(predicate) = self.predicate(table, operation) else {
            return Vec::new();
        };

        let total = rows.len();
        let admitted: Vec<ProtectedRow> = match predicate.principal_verdict(ctx) {
            Some(true) => rows,
            Some(false) => Vec::new(),
            None => rows
                .into_iter()
                .filter(|row| predicate.evaluate(ctx, row, owners))
                .collect(),
        };

        tracing::debug!(
            "Policy '{}' admitted {}/{} rows on {} ({})",
            predicate.name, admitted.len(), total, table, operation
        );
        admitted
    }

    fn predicate(&self, table: Table, operation: Operation) -> Option<&PolicyPredicate> {
        let predicate = self.registry.lookup(table, operation);
        if predicate.is_none() {
            // Denied rather than allowed; required pairs are verified at construction
            tracing::error!("No policy registered for {} ({}), denying", table, operation);
        }
        predicate
    }
}
