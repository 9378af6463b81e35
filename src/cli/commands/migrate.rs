use std::path::PathBuf;

use anyhow::Context;
use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_json, output_success};
use crate::cli::OutputFormat;
use crate::config;
use crate::database::{DatabaseManager, PgStatementExecutor};
use crate::migration::{run_migration, ConsolidationPlan, Outcome};
use crate::policy::PolicyRegistry;

#[derive(Subcommand)]
pub enum MigrateCommands {
    #[command(about = "Show the consolidation statements without touching the database")]
    Plan {
        #[arg(long, help = "Print the full SQL script instead of a statement list")]
        sql: bool,
    },

    #[command(about = "Apply the consolidation to the database at DATABASE_URL")]
    Run {
        #[arg(long, help = "Where to write the JSON report (defaults to POLICY_REPORT_PATH)")]
        report: Option<PathBuf>,
        #[arg(long, help = "Target database, overriding DATABASE_URL")]
        database_url: Option<String>,
    },
}

pub async fn handle(cmd: MigrateCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let registry = PolicyRegistry::standard()?;
    let plan = ConsolidationPlan::standard(&registry)?;

    match cmd {
        MigrateCommands::Plan { sql } => {
            if sql {
                println!("{}", plan.to_sql()?);
                return Ok(());
            }

            match output_format {
                OutputFormat::Json => {
                    let statements: Vec<_> = plan
                        .statements()
                        .iter()
                        .map(|s| json!({ "action": s.action(), "target": s.target() }))
                        .collect();
                    output_json(&statements)?;
                }
                OutputFormat::Text => {
                    for (i, statement) in plan.statements().iter().enumerate() {
                        println!("{:>3}. {:?} {}", i + 1, statement.action(), statement.target());
                    }
                }
            }
            Ok(())
        }
        MigrateCommands::Run { report, database_url } => {
            let pool = match database_url {
                Some(url) => DatabaseManager::connect(&url).await?,
                None => DatabaseManager::pool().await?,
            };
            let executor = PgStatementExecutor::new(pool);
            let database = executor
                .current_database()
                .await
                .context("cannot reach target database")?;
            tracing::info!("Consolidating RLS policies on database '{}'", database);

            let result = run_migration(&plan, &executor).await;

            let report_path = report.unwrap_or_else(|| PathBuf::from(&config::config().policy.report_path));
            result.write_json(&report_path)?;

            match output_format {
                OutputFormat::Json => output_json(&result)?,
                OutputFormat::Text => {
                    for record in &result.records {
                        let mark = match &record.outcome {
                            Outcome::Applied => "✓".to_string(),
                            Outcome::Failed(e) => format!("✗ {}", e),
                        };
                        println!("{:?} {} {}", record.action, record.target, mark);
                    }
                }
            }

            if !result.is_success() {
                anyhow::bail!(
                    "{} of {} statements failed, see {}",
                    result.summary.errors,
                    result.records.len(),
                    report_path.display()
                );
            }

            if matches!(output_format, OutputFormat::Json) {
                return Ok(());
            }
            output_success(
                &output_format,
                &format!(
                    "Consolidated policies on '{}': {} created, {} dropped",
                    database, result.summary.policies_created, result.summary.policies_dropped
                ),
                None,
            )?;
            Ok(())
        }
    }
}
