//! SQL extraction from generator output
//!
//! The generator is instructed to answer with exactly one fenced
//! ```sql block; anything else is treated as raw SQL as a fallback.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SQL_FENCE: Regex = Regex::new(r"(?is)```sql(.*?)```").unwrap();
    static ref ANY_FENCE: Regex = Regex::new(r"(?s)```(.*?)```").unwrap();
}

/// Pull the SQL statement out of a markdown draft.
///
/// Prefers a ```sql fence, falls back to any fenced block, and finally
/// to the trimmed raw text when no fence is present.
pub fn extract_sql_from_markdown(draft: &str) -> String {
    if let Some(caps) = SQL_FENCE.captures(draft) {
        return caps[1].trim().to_string();
    }
    if let Some(caps) = ANY_FENCE.captures(draft) {
        return caps[1].trim().to_string();
    }
    draft.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_sql_fence() {
        let draft = "Here you go:\n```sql\nSELECT 1\n```\nDone.";
        assert_eq!(extract_sql_from_markdown(draft), "SELECT 1");
    }

    #[test]
    fn test_extract_sql_fence_case_insensitive() {
        let draft = "```SQL\nSELECT a FROM t\n```";
        assert_eq!(extract_sql_from_markdown(draft), "SELECT a FROM t");
    }

    #[test]
    fn test_extract_plain_fence() {
        let draft = "```\nSELECT b FROM t\n```";
        assert_eq!(extract_sql_from_markdown(draft), "SELECT b FROM t");
    }

    #[test]
    fn test_extract_no_fence_returns_trimmed() {
        assert_eq!(extract_sql_from_markdown("  SELECT 2  "), "SELECT 2");
    }

    #[test]
    fn test_extract_first_of_multiple_fences() {
        let draft = "```sql\nSELECT 1\n```\n```sql\nSELECT 2\n```";
        assert_eq!(extract_sql_from_markdown(draft), "SELECT 1");
    }
}
