// Installs the consolidated policy set into Postgres as RLS policies

pub mod plan;
pub mod report;
pub mod runner;
pub mod sql;
pub mod statement;

pub use plan::{legacy_policies, ConsolidationPlan};
pub use report::{MigrationRecord, MigrationReport, MigrationSummary, Outcome};
pub use runner::{run_migration, StatementExecutor};
pub use statement::{MigrationAction, PolicyStatement};

use thiserror::Error;

use crate::policy::Table;

#[derive(Error, Debug, Clone)]
pub enum MigrationError {
    #[error("Invalid SQL identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("No consolidated policy registered for {0}")]
    MissingConsolidatedPolicy(Table),

    #[error("Statement failed: {0}")]
    Execution(String),

    #[error("Failed to write report: {0}")]
    Report(String),
}
