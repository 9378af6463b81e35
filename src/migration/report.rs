use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

use crate::migration::statement::MigrationAction;
use crate::migration::MigrationError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum Outcome {
    Applied,
    Failed(String),
}

/// What happened to one statement
#[derive(Debug, Clone, Serialize)]
pub struct MigrationRecord {
    pub action: MigrationAction,
    pub target: String,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationSummary {
    pub functions_created: usize,
    pub policies_dropped: usize,
    pub policies_created: usize,
    pub errors: usize,
}

/// Result value of a consolidation run, in execution order
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub timestamp: DateTime<Utc>,
    pub summary: MigrationSummary,
    pub records: Vec<MigrationRecord>,
}

impl MigrationReport {
    pub fn new(records: Vec<MigrationRecord>) -> Self {
        let mut summary = MigrationSummary::default();
        for record in &records {
            match (&record.outcome, record.action) {
                (Outcome::Failed(_), _) => summary.errors += 1,
                (Outcome::Applied, MigrationAction::CreateFunction) => summary.functions_created += 1,
                (Outcome::Applied, MigrationAction::DropPolicy) => summary.policies_dropped += 1,
                (Outcome::Applied, MigrationAction::CreatePolicy) => summary.policies_created += 1,
            }
        }

        Self {
            timestamp: Utc::now(),
            summary,
            records,
        }
    }

    pub fn is_success(&self) -> bool {
        self.summary.errors == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &MigrationRecord> {
        self.records
            .iter()
            .filter(|r| matches!(r.outcome, Outcome::Failed(_)))
    }

    pub fn write_json(&self, path: &Path) -> Result<(), MigrationError> {
        let body = serde_json::to_string_pretty(self)
            .map_err(|e| MigrationError::Report(e.to_string()))?;
        std::fs::write(path, body).map_err(|e| MigrationError::Report(e.to_string()))?;
        tracing::info!("Wrote migration report to {}", path.display());
        Ok(())
    }
}
