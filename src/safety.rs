//! SQL safety gate
//!
//! Admits only a single, read-only SELECT statement. This is a bounded
//! keyword/shape gate, NOT a SQL parser: it over-rejects ambiguous
//! input rather than risk handing a mutating statement to the engine.
//! A safe query rejected here is an acceptable outcome; an unsafe query
//! executed is not. The rule order below is load-bearing — callers and
//! tests depend on the specific reason returned for a given input.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref FORBIDDEN: Regex = Regex::new(
        r"(?i)\b(INSERT|UPDATE|DELETE|CREATE|DROP|ALTER|ATTACH|COPY|PRAGMA|EXPORT|IMPORT)\b"
    )
    .unwrap();
    static ref SELECT_ONLY: Regex = Regex::new(r"(?is)^\s*SELECT\b").unwrap();
}

/// Verdict of the safety gate. Pure data, no identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyVerdict {
    pub ok: bool,
    pub reason: String,
}

impl SafetyVerdict {
    fn ok() -> Self {
        Self {
            ok: true,
            reason: String::new(),
        }
    }

    fn blocked(reason: &str) -> Self {
        Self {
            ok: false,
            reason: reason.to_string(),
        }
    }
}

/// Classify a SQL string and enforce a bounded result size.
///
/// Returns the verdict together with the statement to execute. When the
/// statement is accepted and carries no LIMIT clause, `LIMIT row_limit`
/// is appended unconditionally; validating an already-limited statement
/// again is a no-op, so the gate is idempotent.
pub fn validate_statement(sql: &str, row_limit: usize) -> (SafetyVerdict, String) {
    // Forbidden keywords anywhere, including subqueries and comments.
    if FORBIDDEN.is_match(sql) {
        return (SafetyVerdict::blocked("forbidden keyword"), sql.to_string());
    }

    if !SELECT_ONLY.is_match(sql) {
        return (
            SafetyVerdict::blocked("only SELECT allowed"),
            sql.to_string(),
        );
    }

    // One trailing semicolon is tolerated; any other blocks stacking.
    let trimmed = sql.trim_end();
    let without_trailing = trimmed.strip_suffix(';').unwrap_or(trimmed);
    if without_trailing.contains(';') {
        return (
            SafetyVerdict::blocked("multiple statements"),
            sql.to_string(),
        );
    }

    // Block comments can hide a second statement from naive splitting.
    if sql.contains("/*") {
        return (
            SafetyVerdict::blocked("block comments not allowed"),
            sql.to_string(),
        );
    }

    // Case-insensitive substring check; any occurrence of "limit"
    // suppresses the append.
    let mut validated = without_trailing.to_string();
    if !validated.to_lowercase().contains("limit") {
        validated.push_str(&format!("\nLIMIT {}", row_limit));
    }
    (SafetyVerdict::ok(), validated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forbidden_keyword_any_case() {
        for sql in [
            "SELECT 1; DROP TABLE t",
            "select * from t where x in (insert into y values (1))",
            "SELECT /* Update t */ 1 FROM t",
            "DELETE FROM t",
        ] {
            let (verdict, _) = validate_statement(sql, 10);
            assert!(!verdict.ok, "should block: {}", sql);
            assert_eq!(verdict.reason, "forbidden keyword");
        }
    }

    #[test]
    fn test_forbidden_wins_over_select_prefix() {
        let (verdict, _) = validate_statement("WITH x AS (SELECT 1) DELETE FROM t", 10);
        assert_eq!(verdict.reason, "forbidden keyword");
    }

    #[test]
    fn test_word_boundary_does_not_block_substrings() {
        // "created_at" contains CREATE only as a prefix, not a word
        let (verdict, _) = validate_statement("SELECT created_at FROM events LIMIT 5", 10);
        assert!(verdict.ok, "{}", verdict.reason);
    }

    #[test]
    fn test_only_select_allowed() {
        let (verdict, _) = validate_statement("EXPLAIN SELECT 1", 10);
        assert!(!verdict.ok);
        assert_eq!(verdict.reason, "only SELECT allowed");

        let (verdict, _) = validate_statement("  WITH t AS (SELECT 1) SELECT * FROM t", 10);
        assert_eq!(verdict.reason, "only SELECT allowed");
    }

    #[test]
    fn test_multiple_statements_blocked() {
        let (verdict, _) = validate_statement("SELECT 1; SELECT 2", 10);
        assert!(!verdict.ok);
        assert_eq!(verdict.reason, "multiple statements");
    }

    #[test]
    fn test_single_trailing_semicolon_ok() {
        let (verdict, validated) = validate_statement("SELECT 1 LIMIT 5;", 10);
        assert!(verdict.ok);
        assert_eq!(validated, "SELECT 1 LIMIT 5");
    }

    #[test]
    fn test_block_comments_blocked() {
        let (verdict, _) = validate_statement("SELECT 1 /* hidden */ FROM t", 10);
        assert!(!verdict.ok);
        assert_eq!(verdict.reason, "block comments not allowed");
    }

    #[test]
    fn test_limit_appended_when_missing() {
        let (verdict, validated) = validate_statement("SELECT a FROM t", 25);
        assert!(verdict.ok);
        assert_eq!(validated, "SELECT a FROM t\nLIMIT 25");
        assert_eq!(validated.matches("LIMIT").count(), 1);
    }

    #[test]
    fn test_limit_not_appended_twice() {
        let (_, once) = validate_statement("SELECT a FROM t", 25);
        let (verdict, twice) = validate_statement(&once, 25);
        assert!(verdict.ok);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_lowercase_select_and_limit() {
        let (verdict, validated) = validate_statement("select a from t limit 3", 25);
        assert!(verdict.ok);
        assert_eq!(validated, "select a from t limit 3");
    }
}
