use thiserror::Error;

#[derive(Error, Debug)]
pub enum CopilotError {
    #[error("LLM provider error: {0}")]
    Provider(String),

    #[error("Schema docs unavailable: {0}")]
    SchemaUnavailable(String),

    #[error("Unsafe statement: {0}")]
    UnsafeStatement(String),

    #[error("Execution error: {0}")]
    Execution(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CopilotError>;
