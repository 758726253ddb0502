//! Seed the demo events dataset and rebuild the schema docs
//!
//! Run with: cargo run --bin seed_demo -- --rows 100000

use anyhow::Result;
use clap::Parser;
use data_copilot::config::Settings;
use data_copilot::demo::seed_events;
use data_copilot::execution::{EngineLimits, PolarsEngine};
use data_copilot::schema_docs::write_schema_docs;

#[derive(Parser)]
#[command(name = "seed-demo")]
#[command(about = "Generate a synthetic events table for local experiments")]
struct Args {
    /// How many events to generate
    #[arg(long, default_value_t = 100_000)]
    rows: usize,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let settings = Settings::from_env()?;

    let stats = seed_events(&settings.data_dir, args.rows)?;
    println!("{}", serde_json::to_string_pretty(&stats)?);

    let engine = PolarsEngine::new(settings.data_dir.clone(), EngineLimits::default());
    write_schema_docs(&engine, &settings.schema_docs_path)?;
    println!("schema docs: {}", settings.schema_docs_path.display());

    Ok(())
}
