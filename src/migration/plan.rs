use crate::migration::statement::PolicyStatement;
use crate::migration::MigrationError;
use crate::policy::{PolicyRegistry, Table};

/// Overlapping permissive policies the consolidation replaces, per table
pub fn legacy_policies(table: Table) -> &'static [&'static str] {
    match table {
        Table::Customers => &[
            "Staff can view all customers",
            "Customers can view their own profile",
            "customers_own_record",
            "customers_staff_access",
        ],
        Table::Mailboxes => &[
            "mailboxes_own_view",
            "mailboxes_staff_view",
            "mailboxes_public_available",
            "Staff can view all mailboxes",
        ],
        Table::Packages => &[
            "Staff can view all packages",
            "packages_own_view",
            "packages_staff_view",
        ],
        Table::Notifications => &[
            "Staff can view all notifications",
            "notifications_own_view",
            "notifications_staff_view",
        ],
        Table::LoyaltyPoints => &[
            "Public can view leaderboard data",
            "Users can view their own loyalty data",
            "Users can view their own loyalty points",
        ],
        Table::RewardRedemptions => &["Users can create redemptions"],
        Table::WebhookEventLog => &[
            "No client inserts into webhook logs",
            "Admins or managers can insert webhook logs",
            "Admins or managers can view webhook logs",
            "Admins can view webhook logs",
            "No client updates to webhook logs",
            "Admins or managers can update webhook logs",
        ],
    }
}

/// Tables where the consolidation only removes a duplicate and installs nothing new.
/// The surviving policy already lives in the database.
fn is_duplicate_removal_only(table: Table) -> bool {
    matches!(table, Table::RewardRedemptions)
}

/// Ordered DDL for replacing the legacy policies with the registry's consolidated set
#[derive(Debug, Clone, Default)]
pub struct ConsolidationPlan {
    statements: Vec<PolicyStatement>,
}

impl ConsolidationPlan {
    pub fn standard(registry: &PolicyRegistry) -> Result<Self, MigrationError> {
        let mut statements = vec![PolicyStatement::CreateContextFunction];

        for table in Table::ALL {
            for name in legacy_policies(table) {
                statements.push(PolicyStatement::drop_policy(table, *name));
            }

            if is_duplicate_removal_only(table) {
                continue;
            }

            let consolidated: Vec<_> = registry.iter().filter(|(t, _)| *t == table).collect();
            if consolidated.is_empty() {
                return Err(MigrationError::MissingConsolidatedPolicy(table));
            }
            for (_, predicate) in consolidated {
                // Re-runnable: drop the consolidated policy before recreating it
                statements.push(PolicyStatement::drop_policy(table, predicate.name.clone()));
                statements.push(PolicyStatement::CreatePolicy {
                    table,
                    predicate: predicate.clone(),
                });
            }
        }

        Ok(Self { statements })
    }

    pub fn statements(&self) -> &[PolicyStatement] {
        &self.statements
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// The full script, for review or dry runs
    pub fn to_sql(&self) -> Result<String, MigrationError> {
        let rendered = self
            .statements
            .iter()
            .map(PolicyStatement::to_sql)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rendered.join("\n\n"))
    }
}
