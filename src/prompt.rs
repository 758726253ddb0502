//! Prompt templates for SQL drafting
//!
//! The generator uses one fixed instruction template; refinement reuses
//! it and threads the failure feedback through the user prompt instead.

/// System prompt for the SQL generator.
///
/// `{schema_docs}` and `{row_limit}` are substituted before each call.
pub const SQL_SYSTEM_PROMPT: &str = r#"You convert user questions to a single SAFE SQL SELECT for an analytical engine.
Rules:
- Output ONLY a SQL code block (```sql ... ```), no prose.
- SELECT only. FORBIDDEN: INSERT/UPDATE/DELETE/DDL/ATTACH/COPY.
- Always include an explicit column list and LIMIT {row_limit} if not aggregating large sets.
- Use ISO timestamps; for year filters use BETWEEN y-01-01 AND (y+1)-01-01.
Schema:
{schema_docs}

Example:
Q: top 5 countries by revenue in 2024
SQL:
SELECT c.country, SUM(o.total_amount) AS revenue
FROM orders o JOIN customers c USING(customer_id)
WHERE o.order_ts >= '2024-01-01' AND o.order_ts < '2025-01-01'
GROUP BY 1
ORDER BY revenue DESC
LIMIT 5;
"#;

/// Render the system prompt for a given schema snapshot and row limit.
pub fn build_system_prompt(schema_docs: &str, row_limit: usize) -> String {
    SQL_SYSTEM_PROMPT
        .replace("{schema_docs}", schema_docs)
        .replace("{row_limit}", &row_limit.to_string())
}

/// User prompt carrying the question itself.
pub fn build_user_prompt(question: &str) -> String {
    format!("Q: {}\nSQL:\n", question)
}

/// User prompt for a refinement attempt: the original question, the
/// previous draft, and a short natural-language constraint describing
/// why that draft failed.
pub fn build_refine_prompt(question: &str, previous_markdown: &str, feedback: &str) -> String {
    format!(
        "Q: {}\nPrevious attempt:\n{}\nConstraint: {}\nSQL:\n",
        question,
        previous_markdown.trim(),
        feedback
    )
}
