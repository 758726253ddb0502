//! Agent orchestrator
//!
//! The state machine that turns an untrusted SQL generator into a
//! bounded, observable query pipeline:
//!
//!   PLAN -> DRAFT -> SAFETY_CHECK -> EXECUTE -> { DONE | REFINE -> DRAFT }
//!
//! The execute/safety retry points are bounded by `max_steps`; the
//! initial draft is not counted. Every attempt is recorded as a
//! `Candidate` in order, so the final answer carries the full
//! negotiation history. Selection rules are deliberately simple:
//! first non-empty success wins; on exhaustion, reverse-scan for the
//! most recent ok candidate and re-execute it; failing that, fall back
//! to the last candidate's SQL with no rows.

use crate::error::{CopilotError, Result};
use crate::execution::Row;
use crate::executor::SqlExecutor;
use crate::extract::extract_sql_from_markdown;
use crate::generator::SqlGenerator;
use crate::metrics::MetricsRegistry;
use crate::planner::make_plan;
use crate::safety::validate_statement;
use crate::schema_context::SchemaContext;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Outcome of one candidate statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CandidateOutcome {
    Blocked { reason: String },
    Ok { row_count: usize, duration_ms: u64 },
    Error { message: String },
}

impl fmt::Display for CandidateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidateOutcome::Blocked { reason } => write!(f, "blocked: {}", reason),
            CandidateOutcome::Ok {
                row_count,
                duration_ms,
            } => write!(f, "ok:{}rows, {}ms", row_count, duration_ms),
            CandidateOutcome::Error { message } => write!(f, "error:{}", message),
        }
    }
}

/// One generated-SQL attempt within a run. Append-only; never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub sql: String,
    pub outcome: CandidateOutcome,
}

impl Candidate {
    fn is_ok(&self) -> bool {
        matches!(self.outcome, CandidateOutcome::Ok { .. })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Telemetry {
    pub generation_time_ms: u64,
    pub execution_time_ms: u64,
    pub retries: u32,
    pub last_error: Option<String>,
}

/// Terminal artifact of one orchestration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResult {
    pub plan: String,
    pub candidates: Vec<Candidate>,
    pub chosen_sql: String,
    pub rows: Vec<Row>,
    pub explain: String,
    pub telemetry: Telemetry,
}

/// Loop states. `Refine` carries the feedback for the next draft,
/// `Execute` the validated statement.
enum AgentState {
    SafetyCheck,
    Execute(String),
    Refine(String),
    Done,
}

pub struct AgentOrchestrator {
    generator: SqlGenerator,
    executor: SqlExecutor,
    schema: Arc<SchemaContext>,
    metrics: Arc<MetricsRegistry>,
    row_limit: usize,
    default_max_steps: usize,
}

impl AgentOrchestrator {
    pub fn new(
        generator: SqlGenerator,
        executor: SqlExecutor,
        schema: Arc<SchemaContext>,
        metrics: Arc<MetricsRegistry>,
        row_limit: usize,
        default_max_steps: usize,
    ) -> Self {
        Self {
            generator,
            executor,
            schema,
            metrics,
            row_limit,
            default_max_steps,
        }
    }

    /// Run the full loop for one question.
    ///
    /// Fails hard only when the provider never produced a draft; every
    /// recoverable condition is absorbed into the candidate history.
    pub async fn run(&self, question: &str, max_steps: Option<usize>) -> Result<AgentResult> {
        // A zero budget would make the fallback rules vacuous; treat
        // it like an absent budget.
        let max_steps = max_steps
            .filter(|&n| n > 0)
            .unwrap_or(self.default_max_steps);
        let run_id = uuid::Uuid::new_v4();
        self.metrics.inc("ai_requests_total", &[("route", "agent")]);
        info!(%run_id, question, max_steps, "agent run started");

        let schema_docs = self.schema.get_schema_text()?;
        // PLAN: computed once, never revisited within the run.
        let plan = make_plan(question, Some(&schema_docs));

        let mut candidates: Vec<Candidate> = Vec::new();
        let mut telemetry = Telemetry::default();
        let mut gen_ms: u64 = 0;
        let mut exec_ms: u64 = 0;

        // Initial DRAFT. Provider failure here is a configuration
        // fault, not a transient one, and is surfaced immediately.
        let t0 = Instant::now();
        let draft = self
            .generator
            .generate(question, &schema_docs, self.row_limit)
            .await;
        gen_ms += t0.elapsed().as_millis() as u64;
        let mut draft = match draft {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                self.metrics
                    .inc("ai_errors_total", &[("stage", "generate")]);
                return Err(CopilotError::Provider(
                    "provider returned an empty draft".to_string(),
                ));
            }
            Err(e) => {
                self.metrics
                    .inc("ai_errors_total", &[("stage", "generate")]);
                return Err(e);
            }
        };
        let mut sql = extract_sql_from_markdown(&draft);

        // Pre-loop safety gate: unsafe SQL is never executed, not even
        // once. Does not consume a step.
        let (verdict, _) = validate_statement(&sql, self.row_limit);
        if !verdict.ok {
            candidates.push(Candidate {
                sql: sql.clone(),
                outcome: CandidateOutcome::Blocked {
                    reason: verdict.reason.clone(),
                },
            });
            telemetry.retries += 1;
            let feedback = format!("unsafe: {}", verdict.reason);
            let t1 = Instant::now();
            match self
                .generator
                .refine(question, &schema_docs, &draft, &feedback)
                .await
            {
                Ok(text) => {
                    gen_ms += t1.elapsed().as_millis() as u64;
                    draft = text;
                    sql = extract_sql_from_markdown(&draft);
                }
                Err(e) => {
                    gen_ms += t1.elapsed().as_millis() as u64;
                    warn!(%run_id, error = %e, "refinement failed, keeping last draft");
                    telemetry.last_error = Some(e.to_string());
                }
            }
        }

        let mut chosen_sql = String::new();
        let mut rows: Vec<Row> = Vec::new();
        let mut explain = String::new();
        let mut steps_used = 0usize;
        let mut state = AgentState::SafetyCheck;

        loop {
            state = match state {
                AgentState::SafetyCheck => {
                    if steps_used == max_steps {
                        AgentState::Done
                    } else {
                        steps_used += 1;
                        // Idempotent re-check: a refined draft must
                        // re-pass the same gate.
                        let (verdict, validated) = validate_statement(&sql, self.row_limit);
                        if verdict.ok {
                            AgentState::Execute(validated)
                        } else {
                            candidates.push(Candidate {
                                sql: sql.clone(),
                                outcome: CandidateOutcome::Blocked {
                                    reason: verdict.reason.clone(),
                                },
                            });
                            AgentState::Refine(format!("unsafe: {}", verdict.reason))
                        }
                    }
                }

                AgentState::Execute(validated) => {
                    let t = Instant::now();
                    match self.executor.execute(&validated).await {
                        Ok(result) => {
                            let duration_ms = t.elapsed().as_millis() as u64;
                            exec_ms += duration_ms;
                            candidates.push(Candidate {
                                sql: validated.clone(),
                                outcome: CandidateOutcome::Ok {
                                    row_count: result.row_count,
                                    duration_ms,
                                },
                            });
                            if result.row_count > 0 {
                                // First non-empty success wins.
                                chosen_sql = validated;
                                rows = result.preview_rows;
                                explain = format!(
                                    "Query follows the plan: {}. Tables and filters match the description.",
                                    plan
                                );
                                AgentState::Done
                            } else {
                                telemetry.last_error = Some("empty".to_string());
                                AgentState::Refine(
                                    "empty result, add broader filters or remove overly strict predicates"
                                        .to_string(),
                                )
                            }
                        }
                        Err(CopilotError::Execution(message)) => {
                            exec_ms += t.elapsed().as_millis() as u64;
                            self.metrics.inc("ai_errors_total", &[("stage", "execute")]);
                            candidates.push(Candidate {
                                sql: validated.clone(),
                                outcome: CandidateOutcome::Error {
                                    message: message.clone(),
                                },
                            });
                            telemetry.last_error = Some(message.clone());
                            AgentState::Refine(format!("execution error: {}", message))
                        }
                        Err(other) => return Err(other),
                    }
                }

                AgentState::Refine(feedback) => {
                    telemetry.retries += 1;
                    let t = Instant::now();
                    match self
                        .generator
                        .refine(question, &schema_docs, &draft, &feedback)
                        .await
                    {
                        Ok(text) => {
                            gen_ms += t.elapsed().as_millis() as u64;
                            draft = text;
                            sql = extract_sql_from_markdown(&draft);
                            AgentState::SafetyCheck
                        }
                        Err(e) => {
                            // A provider that worked once and now fails
                            // is absorbed: fall back to the history.
                            gen_ms += t.elapsed().as_millis() as u64;
                            warn!(%run_id, error = %e, "refinement failed, ending loop");
                            telemetry.last_error = Some(e.to_string());
                            AgentState::Done
                        }
                    }
                }

                AgentState::Done => break,
            };
        }

        // Exhaustion fallback: most recent ok candidate, re-executed
        // defensively rather than trusting stale state.
        if chosen_sql.is_empty() {
            if let Some(candidate) = candidates.iter().rev().find(|c| c.is_ok()) {
                chosen_sql = candidate.sql.clone();
                rows = match self.executor.execute(&chosen_sql).await {
                    Ok(result) => result.preview_rows,
                    Err(e) => {
                        warn!(%run_id, error = %e, "fallback re-execution failed");
                        Vec::new()
                    }
                };
            } else if let Some(candidate) = candidates.last() {
                chosen_sql = candidate.sql.clone();
            }
        }

        if explain.is_empty() {
            let last_status = candidates
                .last()
                .map(|c| c.outcome.to_string())
                .unwrap_or_else(|| "n/a".to_string());
            explain = format!(
                "Query generated according to the plan. Last status: {}.",
                last_status
            );
        }

        telemetry.generation_time_ms = gen_ms;
        telemetry.execution_time_ms = exec_ms;
        self.metrics.observe_ms("ai_sql_generation_ms", gen_ms, &[]);
        self.metrics.observe_ms("ai_sql_exec_ms", exec_ms, &[]);
        if telemetry.last_error.as_deref() == Some("empty") {
            self.metrics.inc("ai_sql_empty_results_total", &[]);
        }

        info!(
            %run_id,
            candidates = candidates.len(),
            retries = telemetry.retries,
            chosen = !chosen_sql.is_empty(),
            "agent run finished"
        );

        Ok(AgentResult {
            plan,
            candidates,
            chosen_sql,
            rows,
            explain,
            telemetry,
        })
    }
}
