use anyhow::Result;
use clap::Parser;
use data_copilot::agent::AgentOrchestrator;
use data_copilot::config::Settings;
use data_copilot::execution::{EngineLimits, PolarsEngine};
use data_copilot::executor::SqlExecutor;
use data_copilot::generator::SqlGenerator;
use data_copilot::llm::LlmClient;
use data_copilot::metrics::MetricsRegistry;
use data_copilot::schema_context::SchemaContext;
use data_copilot::schema_docs::write_schema_docs;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "copilot")]
#[command(about = "Ask a natural-language analytical question, get a safe executed SQL answer")]
struct Args {
    /// The analytical question in natural language
    question: String,

    /// Execute/refine step budget for the run
    #[arg(short, long)]
    max_steps: Option<usize>,

    /// Rebuild schema docs from the data directory before asking
    #[arg(long)]
    refresh_schema: bool,

    /// Print the Prometheus metrics snapshot after the run
    #[arg(long)]
    show_metrics: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let settings = Settings::from_env()?;

    info!(question = %args.question, "copilot starting");

    let engine = Arc::new(PolarsEngine::new(
        settings.data_dir.clone(),
        EngineLimits::default(),
    ));
    let schema = Arc::new(SchemaContext::new(settings.schema_docs_path.clone()));

    if args.refresh_schema {
        write_schema_docs(engine.as_ref(), &settings.schema_docs_path)?;
        schema.refresh();
    }

    let llm = Arc::new(LlmClient::from_settings(&settings)?);
    let generator = SqlGenerator::new(llm);
    let executor = SqlExecutor::new(
        engine,
        Duration::from_secs(settings.exec_timeout_secs),
    );
    let metrics = Arc::new(MetricsRegistry::new());

    let orchestrator = AgentOrchestrator::new(
        generator,
        executor,
        schema,
        Arc::clone(&metrics),
        settings.row_limit,
        settings.max_steps,
    );

    let result = orchestrator.run(&args.question, args.max_steps).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    if args.show_metrics {
        eprintln!("{}", metrics.export_prometheus());
    }

    Ok(())
}
