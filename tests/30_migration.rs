use std::sync::Mutex;

use async_trait::async_trait;

use prmcms_rls::migration::{
    legacy_policies, run_migration, ConsolidationPlan, MigrationAction, MigrationError, Outcome,
    PolicyStatement, StatementExecutor,
};
use prmcms_rls::policy::{PolicyRegistry, Table};

/// Captures rendered SQL instead of talking to Postgres
#[derive(Default)]
struct RecordingExecutor {
    executed: Mutex<Vec<String>>,
    reject_containing: Option<&'static str>,
}

#[async_trait]
impl StatementExecutor for RecordingExecutor {
    async fn execute(&self, statement: &PolicyStatement) -> Result<(), MigrationError> {
        let sql = statement.to_sql()?;
        if let Some(needle) = self.reject_containing {
            if sql.contains(needle) {
                return Err(MigrationError::Execution(format!("rejected: {}", needle)));
            }
        }
        self.executed.lock().unwrap().push(sql);
        Ok(())
    }
}

fn standard_plan() -> ConsolidationPlan {
    ConsolidationPlan::standard(&PolicyRegistry::standard().unwrap()).unwrap()
}

#[tokio::test]
async fn full_run_reports_every_statement() {
    let plan = standard_plan();
    let executor = RecordingExecutor::default();

    let report = run_migration(&plan, &executor).await;

    assert!(report.is_success());
    assert_eq!(report.records.len(), plan.len());
    assert_eq!(report.summary.functions_created, 1);
    assert_eq!(
        report.summary.functions_created + report.summary.policies_dropped + report.summary.policies_created,
        plan.len()
    );

    let executed = executor.executed.lock().unwrap();
    assert!(executed[0].contains("CREATE OR REPLACE FUNCTION"));
}

#[tokio::test]
async fn legacy_policies_are_dropped_by_quoted_name() {
    let plan = standard_plan();
    let executor = RecordingExecutor::default();
    run_migration(&plan, &executor).await;

    let executed = executor.executed.lock().unwrap();
    for table in Table::ALL {
        for name in legacy_policies(table) {
            let expected = format!("DROP POLICY IF EXISTS \"{}\" ON", name);
            assert!(
                executed.iter().any(|sql| sql.starts_with(&expected) && sql.contains(table.as_str())),
                "missing drop of {} on {}",
                name,
                table
            );
        }
    }
}

#[tokio::test]
async fn a_failing_table_does_not_stop_the_others() {
    let plan = standard_plan();
    let executor = RecordingExecutor {
        reject_containing: Some("CREATE POLICY \"packages_optimized_select\""),
        ..Default::default()
    };

    let report = run_migration(&plan, &executor).await;

    assert!(!report.is_success());
    assert_eq!(report.summary.errors, 1);
    let failure = report.failures().next().unwrap();
    assert_eq!(failure.action, MigrationAction::CreatePolicy);
    assert!(matches!(failure.outcome, Outcome::Failed(_)));

    // Tables after packages were still processed
    let executed = executor.executed.lock().unwrap();
    assert!(executed.iter().any(|sql| sql.contains("notifications_optimized_select")));
}

#[tokio::test]
async fn report_serializes_for_the_json_file() {
    let report = run_migration(&standard_plan(), &RecordingExecutor::default()).await;
    let value = serde_json::to_value(&report).unwrap();

    assert!(value["timestamp"].is_string());
    assert_eq!(value["summary"]["errors"], 0);
    assert_eq!(value["records"][0]["outcome"]["status"], "applied");
}

#[test]
fn webhook_policy_sql_has_no_dev_override() {
    let plan = standard_plan();
    let webhook_sql = plan
        .statements()
        .iter()
        .filter_map(|statement| match statement {
            PolicyStatement::CreatePolicy { table: Table::WebhookEventLog, .. } => statement.to_sql().ok(),
            _ => None,
        })
        .next()
        .unwrap();

    assert!(webhook_sql.contains("FOR ALL"));
    assert!(!webhook_sql.contains("is_dev_env"));
}
