use clap::Args;
use serde_json::json;

use crate::cli::config::CliContext;
use crate::cli::utils::output_records;
use crate::cli::OutputFormat;
use crate::lookup::{HttpLookupSource, OptionId};

#[derive(Args)]
pub struct LookupArgs {
    #[arg(help = "Lookup field (clientId, projectId, domainId, roleId, levelId, supplierId, pmId, rmId)")]
    pub field: String,

    #[arg(help = "Parent value the options depend on")]
    pub parent: Option<String>,
}

pub async fn handle(ctx: &CliContext, args: LookupArgs, output_format: &OutputFormat) -> anyhow::Result<()> {
    let source = HttpLookupSource::with_default_routes(ctx.client.clone());
    if source.endpoint(&args.field).is_none() {
        let mut known: Vec<&str> = source.fields().collect();
        known.sort_unstable();
        anyhow::bail!("unknown lookup field '{}' (known: {})", args.field, known.join(", "));
    }

    let parent = args.parent.as_deref().and_then(OptionId::parse);
    let options = source.options(&args.field, parent.as_ref()).await?;

    let rows: Vec<serde_json::Value> = options
        .iter()
        .map(|o| json!({ "id": o.id, "name": o.name }))
        .collect();
    output_records(output_format, &args.field, &rows)
}
