use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::{ConfigEnvironment, PrincipalContext, PrincipalResolver, Role, RoleFlags};
use crate::cli::utils::output_json;
use crate::cli::OutputFormat;
use crate::config;
use crate::database::{load_owner_index, DatabaseManager, PgRoleStore};
use crate::policy::{Authorizer, Guard, OwnerIndex, ProtectedRow, Table};
use crate::types::Operation;

#[derive(Args)]
pub struct AuthorizeArgs {
    #[arg(long, help = "Table name, e.g. packages")]
    pub table: String,

    #[arg(long, help = "Operation: select, insert, update or delete")]
    pub op: String,

    #[arg(long, help = "Session token; roles are read from the database", conflicts_with_all = ["user", "role"])]
    pub token: Option<String>,

    #[arg(long, help = "Evaluate as this user id without a database")]
    pub user: Option<Uuid>,

    #[arg(long, help = "Role held by --user (repeatable)", requires = "user")]
    pub role: Vec<String>,

    #[arg(long, help = "Candidate row as a JSON object (repeatable)")]
    pub row: Vec<String>,

    #[arg(long, help = "File holding a JSON array of candidate rows")]
    pub rows_file: Option<PathBuf>,

    #[arg(long, help = "Customer ownership as CUSTOMER_ID=USER_ID (repeatable)")]
    pub owner: Vec<String>,
}

pub async fn handle(args: AuthorizeArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let table: Table = args.table.parse()?;
    let operation: Operation = args.op.parse().map_err(anyhow::Error::msg)?;
    let authorizer = Authorizer::standard()?;
    let rows = collect_rows(&args.row, args.rows_file.as_deref())?;
    let is_dev = config::config().dev_override_active();

    let mut owners: OwnerIndex = args
        .owner
        .iter()
        .map(|pair| parse_owner(pair))
        .collect::<anyhow::Result<_>>()?;

    let principal = match (&args.token, args.user) {
        (Some(token), _) => {
            let pool = DatabaseManager::pool().await?;
            let resolver = PrincipalResolver::new(
                Arc::new(PgRoleStore::new(pool.clone())),
                Arc::new(ConfigEnvironment),
                config::config().security.jwt_secret.clone(),
            );
            let principal = resolver.resolve_principal_context(Some(token.as_str())).await;

            if owners.is_empty() {
                if let Some(field) = join_field(&authorizer, table, operation) {
                    owners = load_owner_index(&pool, &rows, field).await?;
                }
            }
            principal
        }
        (None, Some(user_id)) => {
            let roles: HashSet<Role> = args.role.iter().map(|r| Role::from(r.as_str())).collect();
            PrincipalContext::from_flags(user_id, RoleFlags::from_roles(&roles), is_dev)
        }
        (None, None) => PrincipalContext::anonymous(is_dev),
    };

    let submitted = rows.len();
    let admitted = authorizer.filter_rows(table, operation, &principal, rows, &owners);

    match output_format {
        OutputFormat::Json => output_json(&json!({
            "table": table,
            "operation": operation,
            "principal": {
                "user_id": principal.user_id(),
                "is_admin": principal.is_admin(),
                "is_staff": principal.is_staff(),
                "is_manager": principal.is_manager(),
                "is_dev_environment": principal.is_dev_environment(),
            },
            "admitted": admitted,
            "denied": submitted - admitted.len(),
        }))?,
        OutputFormat::Text => {
            println!(
                "{} {}: {} of {} rows admitted",
                table,
                operation,
                admitted.len(),
                submitted
            );
            for row in &admitted {
                println!("  {}", serde_json::to_string(row)?);
            }
        }
    }
    Ok(())
}

fn collect_rows(inline: &[String], file: Option<&std::path::Path>) -> anyhow::Result<Vec<ProtectedRow>> {
    let mut values: Vec<Value> = inline
        .iter()
        .map(|raw| serde_json::from_str(raw).with_context(|| format!("invalid --row JSON: {}", raw)))
        .collect::<anyhow::Result<_>>()?;

    if let Some(path) = file {
        let body = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let parsed: Vec<Value> = serde_json::from_str(&body)
            .with_context(|| format!("{} must hold a JSON array of objects", path.display()))?;
        values.extend(parsed);
    }

    values
        .into_iter()
        .map(|value| ProtectedRow::from_value(value).context("every row must be a JSON object"))
        .collect()
}

fn parse_owner(pair: &str) -> anyhow::Result<(Uuid, Uuid)> {
    let (customer, user) = pair
        .split_once('=')
        .with_context(|| format!("expected CUSTOMER_ID=USER_ID, got '{}'", pair))?;
    Ok((customer.trim().parse()?, user.trim().parse()?))
}

fn join_field(authorizer: &Authorizer, table: Table, operation: Operation) -> Option<&'static str> {
    authorizer
        .registry()
        .lookup(table, operation)?
        .guards()
        .find_map(|guard| match guard {
            Guard::OwnerViaCustomer { field } => Some(*field),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_owner_pairs() {
        let customer = Uuid::new_v4();
        let user = Uuid::new_v4();
        let parsed = parse_owner(&format!("{}={}", customer, user)).unwrap();
        assert_eq!(parsed, (customer, user));
        assert!(parse_owner("no-separator").is_err());
    }

    #[test]
    fn rejects_non_object_rows() {
        assert!(collect_rows(&["[1,2]".to_string()], None).is_err());
        assert_eq!(collect_rows(&[r#"{"id": 1}"#.to_string()], None).unwrap().len(), 1);
    }

    #[test]
    fn packages_select_joins_through_customers() {
        let authorizer = Authorizer::standard().unwrap();
        assert_eq!(join_field(&authorizer, Table::Packages, Operation::Select), Some("customer_id"));
        assert_eq!(join_field(&authorizer, Table::Customers, Operation::Select), None);
    }
}
