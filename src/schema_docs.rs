//! Schema documentation builder
//!
//! Renders the engine's tables as a markdown document. The generator
//! is grounded on this text, so regenerating it (and then calling
//! `SchemaContext::refresh`) is how schema changes reach the loop.

use crate::error::Result;
use crate::execution::AnalyticalEngine;
use std::path::Path;
use tracing::info;

/// Curated descriptions for the demo `events` table.
fn events_column_description(column: &str) -> &'static str {
    match column {
        "event_id" => "Unique event identifier",
        "user_id" => "User identifier",
        "event_type" => "Categorical event kind: view/click/purchase/signup/refund",
        "amount" => "Monetary amount for purchase/refund; 0 otherwise",
        "event_ts" => "UTC timestamp when event happened",
        "country" => "ISO-like country code",
        "device" => "User device group",
        "source" => "Acquisition channel",
        _ => "",
    }
}

/// Render all engine tables as markdown.
pub fn build_markdown(engine: &dyn AnalyticalEngine) -> Result<String> {
    let mut lines: Vec<String> = Vec::new();
    lines.push("# Data Warehouse Schema (auto-generated)\n".to_string());

    for table in engine.describe_tables()? {
        lines.push(format!("## {}\n", table.name));
        lines.push("| column | type | description |".to_string());
        lines.push("|---|---|---|".to_string());
        for column in &table.columns {
            let descr = if table.name == "events" {
                events_column_description(&column.name)
            } else {
                ""
            };
            lines.push(format!(
                "| {} | {} | {} |",
                column.name, column.data_type, descr
            ));
        }
        lines.push(String::new());
    }

    Ok(lines.join("\n").trim().to_string() + "\n")
}

/// Build and persist the schema docs, creating parent dirs as needed.
pub fn write_schema_docs(engine: &dyn AnalyticalEngine, path: &Path) -> Result<()> {
    let md = build_markdown(engine)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, &md)?;
    info!(path = %path.display(), bytes = md.len(), "schema docs written");
    Ok(())
}
