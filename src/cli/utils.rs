use serde::Serialize;
use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::policy::{Guard, PolicyPredicate, Verdict};

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(extra)), Some(body)) = (data, response.as_object_mut()) {
                body.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Print any serializable value as pretty JSON
pub fn output_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Human-readable precedence chain, e.g. `dev > staff > owner(user_id)`
pub fn describe_chain(predicate: &PolicyPredicate) -> String {
    predicate
        .steps
        .iter()
        .map(|step| {
            let guard = describe_guard(&step.guard);
            match step.verdict {
                Verdict::Admit => guard,
                Verdict::Deny => format!("!{}", guard),
            }
        })
        .collect::<Vec<_>>()
        .join(" > ")
}

fn describe_guard(guard: &Guard) -> String {
    match guard {
        Guard::DevEnvironment => "dev".to_string(),
        Guard::Staff => "staff".to_string(),
        Guard::AdminOrManager => "admin|manager".to_string(),
        Guard::OwnerField { field } => format!("owner({})", field),
        Guard::OwnerViaCustomer { field } => format!("owner(customers via {})", field),
        Guard::VisibilityFlag { field } => format!("visible({})", field),
    }
}
