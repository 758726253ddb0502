//! Polars analytical engine
//!
//! Runs SQL through a Polars SQL context over the csv/parquet files in
//! a data directory. A fresh context is built per statement and every
//! table is re-registered, so statements never share engine state —
//! the moral equivalent of a per-call database connection that is torn
//! down on every exit path.

use crate::error::{CopilotError, Result};
use crate::execution::engine::{
    AnalyticalEngine, ColumnInfo, EngineLimits, StatementOutput, TableInfo,
};
use crate::execution::result::dataframe_to_rows;
use async_trait::async_trait;
use polars::prelude::*;
use polars::sql::SQLContext;
use std::path::{Path, PathBuf};
use tracing::debug;

/// SQL engine over flat files in `data_dir`.
pub struct PolarsEngine {
    data_dir: PathBuf,
    limits: EngineLimits,
}

impl PolarsEngine {
    pub fn new(data_dir: impl Into<PathBuf>, limits: EngineLimits) -> Self {
        // The Polars worker pool is sized once per process; the bound
        // must be in place before the first query runs.
        if std::env::var("POLARS_MAX_THREADS").is_err() {
            std::env::set_var("POLARS_MAX_THREADS", limits.max_threads.to_string());
        }
        Self {
            data_dir: data_dir.into(),
            limits,
        }
    }

    /// Every table the engine can see: file stem → lazy scan.
    fn scan_tables(&self) -> Result<Vec<(String, LazyFrame)>> {
        let mut tables = Vec::new();
        let entries = std::fs::read_dir(&self.data_dir).map_err(|e| {
            CopilotError::Execution(format!(
                "Cannot read data dir {}: {}",
                self.data_dir.display(),
                e
            ))
        })?;

        for entry in entries {
            let path = entry
                .map_err(|e| CopilotError::Execution(format!("Cannot read data dir entry: {}", e)))?
                .path();
            let Some(name) = table_name_of(&path) else {
                continue;
            };
            let lf = scan_file(&path)?;
            tables.push((name, lf));
        }

        tables.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(tables)
    }

    fn run_blocking(&self, sql: &str) -> Result<StatementOutput> {
        let mut ctx = SQLContext::new();
        for (name, lf) in self.scan_tables()? {
            ctx.register(&name, lf);
        }

        let lf = ctx
            .execute(sql)
            .map_err(|e| CopilotError::Execution(e.to_string()))?;

        // Plan first; diagnostic only.
        let plan_text = lf
            .describe_optimized_plan()
            .map_err(|e| CopilotError::Execution(e.to_string()))?;

        let lf = if self.limits.prefer_streaming {
            lf.with_streaming(true)
        } else {
            lf
        };
        let df = lf
            .collect()
            .map_err(|e| CopilotError::Execution(e.to_string()))?;

        debug!(rows = df.height(), "statement executed");

        let row_count = df.height();
        let rows = dataframe_to_rows(&df)?;
        Ok(StatementOutput {
            plan_text: plan_text.trim().to_string(),
            rows,
            row_count,
        })
    }
}

#[async_trait]
impl AnalyticalEngine for PolarsEngine {
    async fn run_statement(&self, sql: &str) -> Result<StatementOutput> {
        self.run_blocking(sql)
    }

    fn describe_tables(&self) -> Result<Vec<TableInfo>> {
        let mut out = Vec::new();
        for (name, lf) in self.scan_tables()? {
            // One-row sample to materialize the schema without a scan.
            let df = lf
                .limit(1)
                .collect()
                .map_err(|e| CopilotError::Execution(format!("Cannot read table {}: {}", name, e)))?;
            let columns = df
                .schema()
                .iter_fields()
                .map(|field| ColumnInfo {
                    name: field.name().to_string(),
                    data_type: format!("{:?}", field.data_type()),
                })
                .collect();
            out.push(TableInfo { name, columns });
        }
        Ok(out)
    }
}

fn table_name_of(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    if ext != "csv" && ext != "parquet" {
        return None;
    }
    Some(path.file_stem()?.to_str()?.to_string())
}

fn scan_file(path: &Path) -> Result<LazyFrame> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_lowercase();
    match ext.as_str() {
        "csv" => LazyCsvReader::new(path)
            .with_has_header(true)
            .with_try_parse_dates(true)
            .finish()
            .map_err(|e| CopilotError::Execution(format!("Failed to scan CSV: {}", e))),
        "parquet" => LazyFrame::scan_parquet(path, ScanArgsParquet::default())
            .map_err(|e| CopilotError::Execution(format!("Failed to scan Parquet: {}", e))),
        other => Err(CopilotError::Execution(format!(
            "Unsupported table file type: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_demo_csv(dir: &Path) {
        std::fs::write(
            dir.join("events.csv"),
            "event_id,event_type,amount\n1,purchase,10.0\n2,view,0.0\n3,purchase,5.5\n",
        )
        .unwrap();
    }

    #[tokio::test]
    async fn test_run_statement_returns_plan_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        write_demo_csv(dir.path());
        let engine = PolarsEngine::new(dir.path(), EngineLimits::default());

        let out = engine
            .run_statement("SELECT event_type, amount FROM events WHERE amount > 1 LIMIT 10")
            .await
            .unwrap();
        assert_eq!(out.row_count, 2);
        assert_eq!(out.rows.len(), 2);
        assert!(!out.plan_text.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_table_is_execution_error() {
        let dir = tempfile::tempdir().unwrap();
        write_demo_csv(dir.path());
        let engine = PolarsEngine::new(dir.path(), EngineLimits::default());

        let err = engine
            .run_statement("SELECT * FROM missing LIMIT 1")
            .await
            .unwrap_err();
        assert!(matches!(err, CopilotError::Execution(_)));
    }

    #[tokio::test]
    async fn test_describe_tables() {
        let dir = tempfile::tempdir().unwrap();
        write_demo_csv(dir.path());
        let engine = PolarsEngine::new(dir.path(), EngineLimits::default());

        let tables = engine.describe_tables().unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].name, "events");
        let names: Vec<&str> = tables[0].columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["event_id", "event_type", "amount"]);
    }
}
