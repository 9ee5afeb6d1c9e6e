//! Groq adapter.
//!
//! Non-streaming chat completions. Unlike the single-prompt vendors,
//! Groq receives the envelope's parts structurally: the pattern body as
//! the system message and the input content as the user message. The
//! full response is delivered through the update callback in one piece
//! when a callback is supplied.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

use super::{OnUpdate, Provider, select_model};
use crate::config::{CloudProviderConfig, HttpConfig};
use crate::pattern::PromptEnvelope;
use crate::transport::HttpClient;
use crate::types::{MeshError, Result};

const API_BASE: &str = "https://api.groq.com/openai/v1";
const DEFAULT_MODEL: &str = "mixtral-8x7b-32768";

pub struct GroqProvider {
    client: HttpClient,
    model: String,
}

impl GroqProvider {
    pub fn new(config: &CloudProviderConfig, http: &HttpConfig) -> Result<Self> {
        if !config.has_credential() {
            return Err(MeshError::Config(
                "Groq API key is not configured".to_string(),
            ));
        }
        let api_key = SecretString::from(config.api_key.clone());
        let client = HttpClient::new(API_BASE, Duration::from_secs(http.timeout_secs))?
            .with_auth_header(
                "authorization",
                &format!("Bearer {}", api_key.expose_secret()),
            )?
            .with_header("content-type", "application/json")?;

        Ok(Self {
            client,
            model: select_model("Groq", &config.models, DEFAULT_MODEL),
        })
    }

    async fn generate_inner(
        &self,
        envelope: &PromptEnvelope,
        on_update: Option<OnUpdate<'_>>,
    ) -> Result<String> {
        let payload = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": envelope.pattern() },
                { "role": "user", "content": envelope.input() }
            ],
        });

        let response = self.client.post_json("/chat/completions", &payload).await?;
        let content = response
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .ok_or_else(|| MeshError::unexpected("Groq", "missing choices[0].message.content"))?;

        if let Some(on_update) = on_update {
            on_update(content);
        }
        Ok(content.to_string())
    }
}

#[async_trait]
impl Provider for GroqProvider {
    fn name(&self) -> &'static str {
        "groq"
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        let response = self.client.get_json("/models").await?;
        let data = response["data"]
            .as_array()
            .ok_or_else(|| MeshError::unexpected("Groq", "model list missing data array"))?;
        Ok(data
            .iter()
            .filter_map(|m| m["id"].as_str())
            .map(String::from)
            .collect())
    }

    async fn generate(
        &self,
        envelope: &PromptEnvelope,
        on_update: Option<OnUpdate<'_>>,
    ) -> Result<String> {
        debug!("Using Groq model: {}", self.model);
        self.generate_inner(envelope, on_update)
            .await
            .map_err(|e| MeshError::generation(&self.model, e))
    }
}
