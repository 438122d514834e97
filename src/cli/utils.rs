use serde_json::{json, Value};
use crate::cli::OutputFormat;

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

            if let (Some(Value::Object(extra)), Some(obj)) = (data, response.as_object_mut()) {
                obj.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(
    output_format: &OutputFormat,
    message: &str,
    error_code: Option<&str>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(code) = error_code {
                response["error_code"] = json!(code);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Output a list of records, one line per record in text mode
pub fn output_records(
    output_format: &OutputFormat,
    collection_name: &str,
    records: &[Value],
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({
                collection_name: records
            }))?);
        }
        OutputFormat::Text => {
            if records.is_empty() {
                println!("No {} found", collection_name);
            }
            for record in records {
                println!("{}", summarize_record(record));
            }
        }
    }
    Ok(())
}

/// Output a single JSON document
pub fn output_value(output_format: &OutputFormat, value: &Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => println!("{}", summarize_record(value)),
    }
    Ok(())
}

/// `id  name` style one-liner, falling back to compact JSON
pub fn summarize_record(record: &Value) -> String {
    let id = ["id", "Id", "value"]
        .iter()
        .find_map(|k| record.get(*k))
        .map(display_scalar);
    let name = ["name", "displayName", "title", "fullName", "label"]
        .iter()
        .find_map(|k| record.get(*k))
        .map(display_scalar);

    match (id, name) {
        (Some(id), Some(name)) => format!("{:<8} {}", id, name),
        (Some(id), None) => id,
        _ => record.to_string(),
    }
}

fn display_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
