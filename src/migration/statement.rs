use serde::Serialize;

use crate::migration::{sql, MigrationError};
use crate::policy::{PolicyPredicate, Table};

/// One DDL step of the consolidation, as a typed descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyStatement {
    CreateContextFunction,
    DropPolicy { table: Table, policy_name: String },
    CreatePolicy { table: Table, predicate: PolicyPredicate },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationAction {
    CreateFunction,
    DropPolicy,
    CreatePolicy,
}

impl PolicyStatement {
    pub fn drop_policy(table: Table, policy_name: impl Into<String>) -> Self {
        PolicyStatement::DropPolicy {
            table,
            policy_name: policy_name.into(),
        }
    }

    pub fn action(&self) -> MigrationAction {
        match self {
            PolicyStatement::CreateContextFunction => MigrationAction::CreateFunction,
            PolicyStatement::DropPolicy { .. } => MigrationAction::DropPolicy,
            PolicyStatement::CreatePolicy { .. } => MigrationAction::CreatePolicy,
        }
    }

    /// Human-readable target, e.g. `customers."Staff can view all customers"`
    pub fn target(&self) -> String {
        match self {
            PolicyStatement::CreateContextFunction => format!("{}()", sql::CONTEXT_FUNCTION),
            PolicyStatement::DropPolicy { table, policy_name } => {
                format!("{}.\"{}\"", table, policy_name)
            }
            PolicyStatement::CreatePolicy { table, predicate } => {
                format!("{}.\"{}\"", table, predicate.name)
            }
        }
    }

    pub fn table(&self) -> Option<Table> {
        match self {
            PolicyStatement::CreateContextFunction => None,
            PolicyStatement::DropPolicy { table, .. } | PolicyStatement::CreatePolicy { table, .. } => {
                Some(*table)
            }
        }
    }

    pub fn to_sql(&self) -> Result<String, MigrationError> {
        match self {
            PolicyStatement::CreateContextFunction => Ok(sql::create_context_function()),
            PolicyStatement::DropPolicy { table, policy_name } => sql::drop_policy(*table, policy_name),
            PolicyStatement::CreatePolicy { table, predicate } => sql::create_policy(*table, predicate),
        }
    }
}
