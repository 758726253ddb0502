//! Analytical engine abstraction
//!
//! The orchestrator only depends on this trait: run one read-only
//! statement, get a plan description plus rows back. Engines are
//! injected, never reached through globals, so runs stay independently
//! testable.

use crate::error::Result;
use crate::execution::result::Row;
use async_trait::async_trait;

/// Resource limits applied before any statement runs.
#[derive(Debug, Clone)]
pub struct EngineLimits {
    /// Upper bound on worker threads used by the engine.
    pub max_threads: usize,
    /// Favor bounded-memory (streaming) execution over speed.
    pub prefer_streaming: bool,
}

impl Default for EngineLimits {
    fn default() -> Self {
        Self {
            max_threads: 2,
            prefer_streaming: true,
        }
    }
}

/// Column of one table, for schema introspection.
#[derive(Debug, Clone)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
}

/// One table known to the engine.
#[derive(Debug, Clone)]
pub struct TableInfo {
    pub name: String,
    pub columns: Vec<ColumnInfo>,
}

/// Raw output of one statement, before preview truncation.
#[derive(Debug, Clone)]
pub struct StatementOutput {
    /// Optimized plan description. Diagnostic only — never parsed or
    /// trusted for safety decisions.
    pub plan_text: String,
    pub rows: Vec<Row>,
    pub row_count: usize,
}

/// One read-only statement in, plan plus rows out.
#[async_trait]
pub trait AnalyticalEngine: Send + Sync {
    async fn run_statement(&self, sql: &str) -> Result<StatementOutput>;

    /// Enumerate tables and columns for schema-docs generation.
    fn describe_tables(&self) -> Result<Vec<TableInfo>>;
}
