//! SQL generator and refiner
//!
//! Wraps the completion capability behind the fixed drafting template.
//! Refinement re-invokes generation with feedback about the previous
//! candidate; it always targets a conservative default row limit
//! rather than the caller's, which keeps retry results bounded even
//! when the caller asked for a large preview.

use crate::error::Result;
use crate::llm::Completion;
use crate::prompt::{build_refine_prompt, build_system_prompt, build_user_prompt};
use std::sync::Arc;
use tracing::debug;

/// Row limit used for every refinement attempt.
pub const REFINE_ROW_LIMIT: usize = 200;

pub struct SqlGenerator {
    completion: Arc<dyn Completion>,
}

impl SqlGenerator {
    pub fn new(completion: Arc<dyn Completion>) -> Self {
        Self { completion }
    }

    /// Draft a candidate SQL statement as markdown with one fenced block.
    pub async fn generate(
        &self,
        question: &str,
        schema_docs: &str,
        row_limit: usize,
    ) -> Result<String> {
        let system = build_system_prompt(schema_docs, row_limit);
        let user = build_user_prompt(question);
        debug!(question, row_limit, "drafting SQL");
        self.completion.complete(&system, &user).await
    }

    /// Regenerate with feedback about why the previous draft failed.
    pub async fn refine(
        &self,
        question: &str,
        schema_docs: &str,
        previous_markdown: &str,
        feedback: &str,
    ) -> Result<String> {
        let system = build_system_prompt(schema_docs, REFINE_ROW_LIMIT);
        let user = build_refine_prompt(question, previous_markdown, feedback);
        debug!(question, feedback, "refining SQL");
        self.completion.complete(&system, &user).await
    }
}
