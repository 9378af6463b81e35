use std::collections::BTreeMap;

use crate::policy::error::PolicyError;
use crate::policy::rule::{Guard, PolicyPredicate};
use crate::policy::table::Table;
use crate::types::{Operation, PolicyCommand};

/// Exactly one predicate per (table, operation).
///
/// Keys are (table, command). A `FOR ALL` entry covers every operation of its table,
/// so it may not coexist with a per-command entry on the same table.
#[derive(Debug, Clone, Default)]
pub struct PolicyRegistry {
    policies: BTreeMap<(Table, PolicyCommand), PolicyPredicate>,
}

impl PolicyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, table: Table, predicate: PolicyPredicate) -> Result<(), PolicyError> {
        if !predicate.has_admitting_step() {
            return Err(PolicyError::EmptyPolicy(predicate.name));
        }

        let command = predicate.command;
        if let Some(existing) = self.policies.get(&(table, command)) {
            return Err(PolicyError::DuplicatePolicy {
                table,
                command,
                existing: existing.name.clone(),
            });
        }

        let overlap = self
            .policies
            .iter()
            .find(|((t, c), _)| *t == table && (*c == PolicyCommand::All || command == PolicyCommand::All));
        if let Some((_, existing)) = overlap {
            return Err(PolicyError::OverlappingPolicy {
                table,
                command,
                name: predicate.name,
                existing: existing.name.clone(),
            });
        }

        tracing::debug!("Registered policy '{}' on {} ({})", predicate.name, table, command);
        self.policies.insert((table, command), predicate);
        Ok(())
    }

    /// The single predicate governing `operation` on `table`
    pub fn lookup(&self, table: Table, operation: Operation) -> Option<&PolicyPredicate> {
        self.policies
            .get(&(table, PolicyCommand::from(operation)))
            .or_else(|| self.policies.get(&(table, PolicyCommand::All)))
    }

    /// Fail fast when any required pair has no predicate
    pub fn verify_coverage(&self, required: &[(Table, Operation)]) -> Result<(), PolicyError> {
        for &(table, operation) in required {
            if self.lookup(table, operation).is_none() {
                return Err(PolicyError::MissingPolicy { table, operation });
            }
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Table, &PolicyPredicate)> {
        self.policies.iter().map(|((table, _), predicate)| (*table, predicate))
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// The consolidated PRMCMS policy set
    pub fn standard() -> Result<Self, PolicyError> {
        let mut registry = Self::new();

        registry.register(
            Table::Customers,
            PolicyPredicate::new("customers_optimized_select", PolicyCommand::Select)
                .admit_if(Guard::DevEnvironment)
                .admit_if(Guard::Staff)
                // Both owner conventions are live in the customers table
                .admit_if(Guard::OwnerField { field: "user_id" })
                .admit_if(Guard::OwnerField { field: "id" }),
        )?;

        registry.register(
            Table::Mailboxes,
            PolicyPredicate::new("mailboxes_optimized_select", PolicyCommand::Select)
                .admit_if(Guard::DevEnvironment)
                .admit_if(Guard::Staff)
                .admit_if(Guard::VisibilityFlag { field: "is_available" })
                .admit_if(Guard::OwnerField { field: "customer_id" }),
        )?;

        registry.register(
            Table::Packages,
            PolicyPredicate::new("packages_optimized_select", PolicyCommand::Select)
                .admit_if(Guard::DevEnvironment)
                .admit_if(Guard::Staff)
                .admit_if(Guard::OwnerViaCustomer { field: "customer_id" }),
        )?;

        registry.register(
            Table::Notifications,
            PolicyPredicate::new("notifications_optimized_select", PolicyCommand::Select)
                .admit_if(Guard::DevEnvironment)
                .admit_if(Guard::Staff)
                .admit_if(Guard::OwnerField { field: "customer_id" }),
        )?;

        registry.register(
            Table::LoyaltyPoints,
            PolicyPredicate::new("loyalty_points_optimized_select", PolicyCommand::Select)
                .admit_if(Guard::DevEnvironment)
                .admit_if(Guard::Staff)
                .admit_if(Guard::OwnerField { field: "user_id" })
                .admit_if(Guard::VisibilityFlag { field: "show_on_leaderboard" }),
        )?;

        registry.register(
            Table::RewardRedemptions,
            PolicyPredicate::new("reward_redemptions_insert", PolicyCommand::Insert)
                .admit_if(Guard::DevEnvironment)
                .admit_if(Guard::Staff)
                .admit_if(Guard::OwnerField { field: "user_id" }),
        )?;

        // No dev override on webhook logs, unlike every other table
        registry.register(
            Table::WebhookEventLog,
            PolicyPredicate::new("webhook_logs_admin_manager_access", PolicyCommand::All)
                .admit_if(Guard::AdminOrManager),
        )?;

        registry.verify_coverage(&Self::required_pairs())?;
        Ok(registry)
    }

    /// (table, operation) pairs the storage layer is known to check
    pub fn required_pairs() -> Vec<(Table, Operation)> {
        let mut pairs = vec![
            (Table::Customers, Operation::Select),
            (Table::Mailboxes, Operation::Select),
            (Table::Packages, Operation::Select),
            (Table::Notifications, Operation::Select),
            (Table::LoyaltyPoints, Operation::Select),
            (Table::RewardRedemptions, Operation::Insert),
        ];
        pairs.extend(Operation::ALL.into_iter().map(|op| (Table::WebhookEventLog, op)));
        pairs
    }
}
