use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{describe_chain, output_json};
use crate::cli::OutputFormat;
use crate::policy::{PolicyRegistry, Table};

#[derive(Subcommand)]
pub enum PolicyCommands {
    #[command(about = "List every consolidated policy and its precedence chain")]
    List,

    #[command(about = "Show the policies registered for one table")]
    Show {
        #[arg(help = "Table name, e.g. packages")]
        table: String,
    },
}

pub async fn handle(cmd: PolicyCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let registry = PolicyRegistry::standard()?;

    let selected: Option<Table> = match &cmd {
        PolicyCommands::List => None,
        PolicyCommands::Show { table } => Some(table.parse()?),
    };

    let entries: Vec<_> = registry
        .iter()
        .filter(|(table, _)| selected.map_or(true, |s| s == *table))
        .collect();

    match output_format {
        OutputFormat::Json => {
            let listing: Vec<_> = entries
                .iter()
                .map(|(table, predicate)| {
                    json!({
                        "table": table,
                        "name": predicate.name,
                        "command": predicate.command,
                        "steps": predicate.steps,
                    })
                })
                .collect();
            output_json(&listing)?;
        }
        OutputFormat::Text => {
            for (table, predicate) in &entries {
                println!(
                    "{:<20} {:<7} {:<36} {}",
                    table.as_str(),
                    predicate.command.as_sql(),
                    predicate.name,
                    describe_chain(predicate)
                );
            }
            println!("{} policies", entries.len());
        }
    }

    Ok(())
}
