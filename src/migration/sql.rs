// SQL rendering for policy statements. Every identifier goes through quote_ident.

use crate::migration::MigrationError;
use crate::policy::{Guard, PolicyPredicate, Table, Verdict};

/// Postgres truncates identifiers beyond NAMEDATALEN - 1 bytes
const MAX_IDENTIFIER_BYTES: usize = 63;

pub const CONTEXT_FUNCTION: &str = "get_current_user_context";

/// Quote an identifier, doubling embedded quotes. Rejects names Postgres would
/// silently truncate or cannot represent.
pub fn quote_ident(name: &str) -> Result<String, MigrationError> {
    if name.is_empty() || name.len() > MAX_IDENTIFIER_BYTES || name.contains('\0') {
        return Err(MigrationError::InvalidIdentifier(name.to_string()));
    }
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

fn context_field(field: &str) -> String {
    format!("(SELECT {} FROM {}())", field, CONTEXT_FUNCTION)
}

/// Boolean SQL expression equivalent to [`Guard::matches`]
pub fn render_guard(table: Table, guard: &Guard) -> Result<String, MigrationError> {
    let table_ident = quote_ident(table.as_str())?;
    let sql = match *guard {
        Guard::DevEnvironment => context_field("is_dev_env"),
        Guard::Staff => context_field("is_staff"),
        Guard::AdminOrManager => context_field("is_admin OR is_manager"),
        Guard::OwnerField { field } => format!(
            "{} = {}.{}",
            context_field("user_id"),
            table_ident,
            quote_ident(field)?
        ),
        Guard::OwnerViaCustomer { field } => format!(
            "EXISTS (SELECT 1 FROM {} c WHERE c.id = {}.{} AND c.user_id = {})",
            quote_ident(Table::Customers.as_str())?,
            table_ident,
            quote_ident(field)?,
            context_field("user_id")
        ),
        Guard::VisibilityFlag { field } => {
            format!("{}.{} = true", table_ident, quote_ident(field)?)
        }
    };
    Ok(sql)
}

/// The policy expression: a bare guard when the chain is a single admit,
/// otherwise a CASE chain in precedence order ending in `ELSE false`.
pub fn render_predicate(table: Table, predicate: &PolicyPredicate) -> Result<String, MigrationError> {
    if let [step] = predicate.steps.as_slice() {
        if step.verdict == Verdict::Admit {
            return Ok(format!("({})", render_guard(table, &step.guard)?));
        }
    }

    let mut sql = String::from("CASE");
    for step in &predicate.steps {
        let verdict = match step.verdict {
            Verdict::Admit => "true",
            Verdict::Deny => "false",
        };
        sql += &format!("\n    WHEN {} THEN {}", render_guard(table, &step.guard)?, verdict);
    }
    sql += "\n    ELSE false\nEND";
    Ok(sql)
}

pub fn create_policy(table: Table, predicate: &PolicyPredicate) -> Result<String, MigrationError> {
    let expression = render_predicate(table, predicate)?;
    let mut sql = format!(
        "CREATE POLICY {} ON {}\nFOR {} TO public",
        quote_ident(&predicate.name)?,
        quote_ident(table.as_str())?,
        predicate.command.as_sql()
    );
    if predicate.command.has_using() {
        sql += &format!("\nUSING ({})", expression);
    }
    if predicate.command.has_with_check() {
        sql += &format!("\nWITH CHECK ({})", expression);
    }
    sql.push(';');
    Ok(sql)
}

pub fn drop_policy(table: Table, policy_name: &str) -> Result<String, MigrationError> {
    Ok(format!(
        "DROP POLICY IF EXISTS {} ON {};",
        quote_ident(policy_name)?,
        quote_ident(table.as_str())?
    ))
}

/// Per-statement principal context: one auth.uid() and one role scan per query
/// instead of one per row and per policy.
pub fn create_context_function() -> String {
    format!(
        r#"CREATE OR REPLACE FUNCTION {name}()
RETURNS TABLE(
  user_id UUID,
  is_admin BOOLEAN,
  is_staff BOOLEAN,
  is_manager BOOLEAN,
  is_authenticated BOOLEAN,
  is_dev_env BOOLEAN
)
LANGUAGE plpgsql
STABLE
SECURITY DEFINER
SET search_path = 'public', 'auth', 'pg_catalog'
AS $$
DECLARE
  current_uid UUID;
  user_admin BOOLEAN := false;
  user_staff BOOLEAN := false;
  user_manager BOOLEAN := false;
  user_auth BOOLEAN := false;
  dev_env BOOLEAN := false;
BEGIN
  current_uid := auth.uid();
  user_auth := current_uid IS NOT NULL;
  dev_env := is_development_env();

  IF user_auth THEN
    SELECT
      bool_or(ur.role = 'admin'),
      bool_or(ur.role = 'staff'),
      bool_or(ur.role = 'manager')
    INTO user_admin, user_staff, user_manager
    FROM user_roles ur
    WHERE ur.user_id = current_uid
    HAVING count(*) > 0;

    IF NOT FOUND THEN
      user_admin := has_role(current_uid, 'admin');
      user_staff := has_role(current_uid, 'staff');
      user_manager := has_role(current_uid, 'manager');
    END IF;
  END IF;

  RETURN QUERY SELECT
    current_uid,
    COALESCE(user_admin, false),
    COALESCE(user_staff OR user_admin OR user_manager, false),
    COALESCE(user_manager OR user_admin, false),
    user_auth,
    dev_env;
END;
$$;"#,
        name = CONTEXT_FUNCTION
    )
}
