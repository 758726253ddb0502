use crate::config::{LlmProvider, Settings};
use crate::error::{CopilotError, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Deterministic generation defaults for SQL drafting.
const TEMPERATURE: f64 = 0.05;
const TOP_P: f64 = 0.9;
const MAX_TOKENS: u32 = 800;

/// One-shot, stateless text completion capability.
///
/// The orchestrator only ever sees this trait, so tests can script the
/// provider without any network access.
#[async_trait]
pub trait Completion: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}

/// HTTP completion client for OpenAI-compatible chat endpoints.
#[derive(Clone)]
pub struct LlmClient {
    provider: LlmProvider,
    model: String,
    api_key: Option<String>,
    base_url: String,
    http: reqwest::Client,
}

impl LlmClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let (api_key, base_url) = match settings.llm_provider {
            LlmProvider::OpenAi => (
                settings.openai_api_key.clone(),
                "https://api.openai.com/v1".to_string(),
            ),
            LlmProvider::OpenRouter => (
                settings.openrouter_api_key.clone(),
                "https://openrouter.ai/api/v1".to_string(),
            ),
            LlmProvider::Ollama => (None, format!("{}/v1", settings.ollama_base_url)),
        };

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.llm_timeout_secs))
            .build()
            .map_err(|e| CopilotError::Provider(format!("HTTP client init failed: {}", e)))?;

        Ok(Self {
            provider: settings.llm_provider,
            model: settings.llm_model.clone(),
            api_key,
            base_url,
            http,
        })
    }

    fn auth_key(&self) -> Result<Option<&str>> {
        match self.provider {
            // Ollama runs locally and needs no key
            LlmProvider::Ollama => Ok(None),
            LlmProvider::OpenAi => match self.api_key.as_deref() {
                Some(k) => Ok(Some(k)),
                None => Err(CopilotError::Provider("OPENAI_API_KEY is not set".into())),
            },
            LlmProvider::OpenRouter => match self.api_key.as_deref() {
                Some(k) => Ok(Some(k)),
                None => Err(CopilotError::Provider(
                    "OPENROUTER_API_KEY is not set".into(),
                )),
            },
        }
    }
}

#[async_trait]
impl Completion for LlmClient {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let key = self.auth_key()?;

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_prompt}
            ],
            "temperature": TEMPERATURE,
            "top_p": TOP_P,
            "max_tokens": MAX_TOKENS,
            "stream": false,
        });

        let mut request = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .header("Content-Type", "application/json")
            .json(&body);
        if let Some(key) = key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request
            .send()
            .await
            .map_err(|e| CopilotError::Provider(format!("LLM API call failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(CopilotError::Provider(format!(
                "LLM API error {}: {}",
                status, text
            )));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| CopilotError::Provider(format!("Failed to parse LLM response: {}", e)))?;

        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| CopilotError::Provider("No content in LLM response".to_string()))?;

        Ok(content.to_string())
    }
}
