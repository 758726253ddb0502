//! Statement executor
//!
//! Thin layer over the analytical engine: applies the call timeout,
//! truncates the result to a bounded preview, and reports the true
//! fetched row count.

use crate::error::{CopilotError, Result};
use crate::execution::{AnalyticalEngine, Row};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Preview never exceeds this many rows, whatever the statement fetched.
pub const PREVIEW_ROWS: usize = 20;

/// Outcome of one executed statement.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub plan_text: String,
    pub preview_rows: Vec<Row>,
    /// Fetched count before preview truncation.
    pub row_count: usize,
}

pub struct SqlExecutor {
    engine: Arc<dyn AnalyticalEngine>,
    timeout: Duration,
}

impl SqlExecutor {
    pub fn new(engine: Arc<dyn AnalyticalEngine>, timeout: Duration) -> Self {
        Self { engine, timeout }
    }

    /// Run a validated statement and return plan plus bounded preview.
    ///
    /// A timeout is reported as an execution error so the loop refines
    /// it like any other engine failure.
    pub async fn execute(&self, sql: &str) -> Result<ExecutionResult> {
        let output = tokio::time::timeout(self.timeout, self.engine.run_statement(sql))
            .await
            .map_err(|_| {
                CopilotError::Execution(format!(
                    "statement timed out after {}s",
                    self.timeout.as_secs()
                ))
            })??;

        let mut preview_rows = output.rows;
        preview_rows.truncate(PREVIEW_ROWS.min(output.row_count));

        info!(
            row_count = output.row_count,
            preview = preview_rows.len(),
            "statement executed"
        );

        Ok(ExecutionResult {
            plan_text: output.plan_text,
            preview_rows,
            row_count: output.row_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::{StatementOutput, TableInfo};
    use async_trait::async_trait;

    struct FixedEngine {
        rows: usize,
    }

    #[async_trait]
    impl AnalyticalEngine for FixedEngine {
        async fn run_statement(&self, _sql: &str) -> Result<StatementOutput> {
            let rows = (0..self.rows)
                .map(|i| {
                    let mut row = Row::new();
                    row.insert("n".into(), serde_json::json!(i));
                    row
                })
                .collect();
            Ok(StatementOutput {
                plan_text: "PLAN".into(),
                rows,
                row_count: self.rows,
            })
        }

        fn describe_tables(&self) -> Result<Vec<TableInfo>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_preview_is_capped_but_count_is_true() {
        let executor = SqlExecutor::new(
            Arc::new(FixedEngine { rows: 57 }),
            Duration::from_secs(5),
        );
        let result = executor.execute("SELECT 1").await.unwrap();
        assert_eq!(result.row_count, 57);
        assert_eq!(result.preview_rows.len(), PREVIEW_ROWS);
    }

    #[tokio::test]
    async fn test_small_result_not_padded() {
        let executor = SqlExecutor::new(
            Arc::new(FixedEngine { rows: 3 }),
            Duration::from_secs(5),
        );
        let result = executor.execute("SELECT 1").await.unwrap();
        assert_eq!(result.preview_rows.len(), 3);
    }
}
