use async_trait::async_trait;

use crate::migration::plan::ConsolidationPlan;
use crate::migration::report::{MigrationRecord, MigrationReport, Outcome};
use crate::migration::statement::PolicyStatement;
use crate::migration::MigrationError;

/// Runs one typed statement against a database
#[async_trait]
pub trait StatementExecutor: Send + Sync {
    async fn execute(&self, statement: &PolicyStatement) -> Result<(), MigrationError>;
}

/// Execute every statement in order. A failed statement is recorded and the run
/// continues, matching how each table's consolidation is independent.
pub async fn run_migration<E>(plan: &ConsolidationPlan, executor: &E) -> MigrationReport
where
    E: StatementExecutor + ?Sized,
{
    tracing::info!("Starting RLS policy consolidation ({} statements)", plan.len());

    let mut records = Vec::with_capacity(plan.len());
    for statement in plan.statements() {
        let target = statement.target();
        let outcome = match executor.execute(statement).await {
            Ok(()) => {
                tracing::info!("{:?} {}", statement.action(), target);
                Outcome::Applied
            }
            Err(e) => {
                tracing::error!("{:?} {} failed: {}", statement.action(), target, e);
                Outcome::Failed(e.to_string())
            }
        };
        records.push(MigrationRecord {
            action: statement.action(),
            target,
            outcome,
        });
    }

    let report = MigrationReport::new(records);
    tracing::info!(
        "RLS consolidation finished: {} created, {} dropped, {} errors",
        report.summary.policies_created,
        report.summary.policies_dropped,
        report.summary.errors
    );
    report
}
