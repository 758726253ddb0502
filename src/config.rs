//! Environment-driven settings
//!
//! All knobs come from environment variables (optionally loaded from a
//! `.env` file by the binaries). Missing values fall back to defaults
//! that work against a local demo dataset.

use crate::error::{CopilotError, Result};
use std::path::PathBuf;

/// Which completion provider backs the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    OpenAi,
    OpenRouter,
    Ollama,
}

impl LlmProvider {
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(LlmProvider::OpenAi),
            "openrouter" => Ok(LlmProvider::OpenRouter),
            "ollama" => Ok(LlmProvider::Ollama),
            other => Err(CopilotError::Config(format!(
                "Unsupported LLM_PROVIDER: {}",
                other
            ))),
        }
    }
}

/// Runtime settings, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub llm_provider: LlmProvider,
    pub llm_model: String,
    pub openai_api_key: Option<String>,
    pub openrouter_api_key: Option<String>,
    pub ollama_base_url: String,

    /// Directory holding the analytical tables (csv/parquet files).
    pub data_dir: PathBuf,
    /// Path of the generated schema documentation markdown.
    pub schema_docs_path: PathBuf,

    /// Row limit appended to statements that carry none.
    pub row_limit: usize,
    /// Default execute/refine step budget for an agent run.
    pub max_steps: usize,

    /// Timeout for one completion call, in seconds.
    pub llm_timeout_secs: u64,
    /// Timeout for one statement execution, in seconds.
    pub exec_timeout_secs: u64,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|_| CopilotError::Config(format!("Invalid value for {}: {}", key, raw))),
        Err(_) => Ok(default),
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let provider = LlmProvider::parse(&env_or("LLM_PROVIDER", "openai"))?;

        Ok(Self {
            llm_provider: provider,
            llm_model: env_or("LLM_MODEL", "gpt-4o-mini"),
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            openrouter_api_key: std::env::var("OPENROUTER_API_KEY").ok(),
            ollama_base_url: env_or("OLLAMA_BASE_URL", "http://localhost:11434"),
            data_dir: PathBuf::from(env_or("DATA_DIR", "data")),
            schema_docs_path: PathBuf::from(env_or("SCHEMA_DOCS_PATH", "data/schema_docs.md")),
            row_limit: env_parse("ROW_LIMIT", 200)?,
            max_steps: env_parse("AGENT_MAX_STEPS", 2)?,
            llm_timeout_secs: env_parse("LLM_TIMEOUT_SECS", 45)?,
            exec_timeout_secs: env_parse("EXEC_TIMEOUT_SECS", 30)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_provider() {
        assert_eq!(LlmProvider::parse("OpenAI").unwrap(), LlmProvider::OpenAi);
        assert_eq!(
            LlmProvider::parse("openrouter").unwrap(),
            LlmProvider::OpenRouter
        );
        assert!(LlmProvider::parse("bedrock").is_err());
    }
}
