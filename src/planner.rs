//! Query planner
//!
//! Produces a short, human-readable plan from the question and the
//! schema docs. This is a cheap token-overlap heuristic, not semantic
//! search — a best-effort grounding aid for the generator and for the
//! final answer's explanation, never a correctness guarantee.

use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

/// How many schema lines the plan quotes at most.
const TOP_K_LINES: usize = 6;

lazy_static! {
    static ref TOKEN: Regex = Regex::new(r"[a-z0-9_]+").unwrap();
    static ref PERIOD_HINT: Regex = Regex::new(
        r"(?i)\b(19|20)\d{2}\b|\b(today|yesterday|last|recent|week|month|quarter|year|daily|weekly|monthly)\b"
    )
    .unwrap();
}

fn tokenize(text: &str) -> HashSet<String> {
    TOKEN
        .find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_string())
        .filter(|t| t.len() >= 3)
        .collect()
}

/// Build the plan text for one orchestration run.
///
/// Selects the schema lines sharing the most tokens with the question
/// (ties broken by shorter, then lexicographically smaller line) and
/// wraps them with a goal statement, an optional time-filter hint, and
/// a closing reminder.
pub fn make_plan(question: &str, schema_docs: Option<&str>) -> String {
    let question_tokens = tokenize(question);

    let mut lines: Vec<String> = Vec::new();
    lines.push(format!(
        "Goal: answer \"{}\" with a single read-only SELECT.",
        question.trim()
    ));

    if let Some(schema) = schema_docs {
        let relevant: Vec<&str> = schema
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(|l| (l, tokenize(l).intersection(&question_tokens).count()))
            .filter(|(_, overlap)| *overlap > 0)
            .sorted_by(|a, b| {
                b.1.cmp(&a.1)
                    .then_with(|| a.0.len().cmp(&b.0.len()))
                    .then_with(|| a.0.cmp(b.0))
            })
            .take(TOP_K_LINES)
            .map(|(l, _)| l)
            .collect();

        if !relevant.is_empty() {
            lines.push("Candidate fields:".to_string());
            for line in relevant {
                lines.push(format!("  - {}", line));
            }
        }
    }

    if PERIOD_HINT.is_match(question) {
        lines.push("Hint: the question names a period — add an explicit time filter.".to_string());
    }

    lines.push("Select explicit columns and keep the LIMIT.".to_string());
    lines.join("\n")
}
