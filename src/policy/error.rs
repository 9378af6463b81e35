use thiserror::Error;

use crate::policy::table::Table;
use crate::types::{Operation, PolicyCommand};

/// Registry and lookup errors. All of these are configuration defects.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Policy for {table} ({command}) is already registered as '{existing}'")]
    DuplicatePolicy {
        table: Table,
        command: PolicyCommand,
        existing: String,
    },

    #[error("Policy '{name}' on {table} ({command}) overlaps '{existing}'")]
    OverlappingPolicy {
        table: Table,
        command: PolicyCommand,
        name: String,
        existing: String,
    },

    #[error("No policy registered for {table} ({operation})")]
    MissingPolicy { table: Table, operation: Operation },

    #[error("Policy '{0}' has no admitting steps")]
    EmptyPolicy(String),
}
