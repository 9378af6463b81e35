use async_trait::async_trait;
use sqlx::PgPool;

use crate::migration::{MigrationError, PolicyStatement, StatementExecutor};

/// Runs policy statements on a Postgres pool, one statement per round trip
#[derive(Clone)]
pub struct PgStatementExecutor {
    pool: PgPool,
}

impl PgStatementExecutor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Confirms the connection before a run and reports which database it hit
    pub async fn current_database(&self) -> Result<String, MigrationError> {
        let (name,): (String,) = sqlx::query_as("SELECT current_database()")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| MigrationError::Execution(e.to_string()))?;
        Ok(name)
    }
}

#[async_trait]
impl StatementExecutor for PgStatementExecutor {
    async fn execute(&self, statement: &PolicyStatement) -> Result<(), MigrationError> {
        let sql = statement.to_sql()?;
        // DDL carries no bind parameters; identifiers were validated by to_sql
        sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .map_err(|e| MigrationError::Execution(e.to_string()))?;
        Ok(())
    }
}
