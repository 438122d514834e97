use std::io::Read;

use clap::Subcommand;
use serde_json::Value;

use crate::cli::config::CliContext;
use crate::cli::utils::{output_records, output_success, output_value};
use crate::cli::OutputFormat;
use crate::resources::{Collection, Resources};

#[derive(Subcommand)]
pub enum DataCommands {
    #[command(about = "List records of a collection")]
    List {
        #[arg(help = "Collection (client, project, supplier, resource, pm, rm, user, baseline, timesheet, leave)")]
        collection: Collection,
    },

    #[command(about = "Show one record")]
    Get {
        #[arg(help = "Collection name")]
        collection: Collection,
        #[arg(help = "Record ID")]
        id: String,
    },

    #[command(about = "Create record from stdin")]
    Create {
        #[arg(help = "Collection name")]
        collection: Collection,
    },

    #[command(about = "Update record from stdin")]
    Update {
        #[arg(help = "Collection name")]
        collection: Collection,
        #[arg(help = "Record ID to update")]
        id: String,
    },

    #[command(about = "Delete record")]
    Delete {
        #[arg(help = "Collection name")]
        collection: Collection,
        #[arg(help = "Record ID to delete")]
        id: String,
    },
}

pub async fn handle(ctx: &CliContext, cmd: DataCommands, output_format: &OutputFormat) -> anyhow::Result<()> {
    let resources = Resources::new(&ctx.client);

    match cmd {
        DataCommands::List { collection } => {
            let records = resources.list(collection).await?;
            output_records(output_format, collection.name(), &records)
        }
        DataCommands::Get { collection, id } => {
            let record = resources.get(collection, &id).await?;
            output_value(output_format, &record)
        }
        DataCommands::Create { collection } => {
            let body = read_stdin_json()?;
            let created = resources.create(collection, &body).await?;
            output_value(output_format, &created)
        }
        DataCommands::Update { collection, id } => {
            let body = read_stdin_json()?;
            let updated = resources.update(collection, &id, &body).await?;
            output_value(output_format, &updated)
        }
        DataCommands::Delete { collection, id } => {
            resources.delete(collection, &id).await?;
            output_success(output_format, &format!("Deleted {} {}", collection, id), None)
        }
    }
}

fn read_stdin_json() -> anyhow::Result<Value> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    serde_json::from_str(&input).map_err(|e| anyhow::anyhow!("stdin is not valid JSON: {}", e))
}
