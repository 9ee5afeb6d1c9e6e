//! Anthropic Messages adapter.
//!
//! Always streams `/messages`; partial text arrives in
//! `content_block_delta` events.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

use super::{OnUpdate, Provider, select_model};
use crate::config::{CloudProviderConfig, HttpConfig};
use crate::constants::SYSTEM_PROMPT;
use crate::pattern::PromptEnvelope;
use crate::transport::HttpClient;
use crate::types::{MeshError, Result};

const API_BASE: &str = "https://api.anthropic.com/v1";
const DEFAULT_MODEL: &str = "claude-2";
const MAX_TOKENS: u32 = 1000;

pub struct AnthropicProvider {
    client: HttpClient,
    model: String,
}

impl AnthropicProvider {
    pub fn new(config: &CloudProviderConfig, http: &HttpConfig) -> Result<Self> {
        if !config.has_credential() {
            return Err(MeshError::Config(
                "Anthropic API key is not configured".to_string(),
            ));
        }
        let api_key = SecretString::from(config.api_key.clone());
        let client = HttpClient::new(API_BASE, Duration::from_secs(http.timeout_secs))?
            .with_auth_header("x-api-key", api_key.expose_secret())?
            .with_header("anthropic-version", "2023-06-01")?
            .with_header("content-type", "application/json")?
            .with_stream_mode(http.stream_mode());

        Ok(Self {
            client,
            model: select_model("Anthropic", &config.models, DEFAULT_MODEL),
        })
    }

    async fn generate_inner(
        &self,
        envelope: &PromptEnvelope,
        mut on_update: Option<OnUpdate<'_>>,
    ) -> Result<String> {
        let payload = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": envelope.render() }
            ],
            "max_tokens": MAX_TOKENS,
            "stream": true,
        });

        let mut full = String::new();
        let mut handle = |chunk: Value| {
            if chunk["type"].as_str() == Some("content_block_delta")
                && let Some(text) = chunk.pointer("/delta/text").and_then(Value::as_str)
            {
                full.push_str(text);
                if let Some(on_update) = on_update.as_deref_mut() {
                    on_update(text);
                }
            }
        };
        self.client.post_sse("/messages", &payload, &mut handle).await?;
        Ok(full)
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        let response = self.client.post_json("/models", &json!({})).await?;
        let models = response["models"]
            .as_array()
            .ok_or_else(|| MeshError::unexpected("Anthropic", "model list missing models array"))?;
        Ok(models
            .iter()
            .filter(|m| m["type"].as_str() == Some("chat"))
            .filter_map(|m| m["id"].as_str())
            .map(String::from)
            .collect())
    }

    async fn generate(
        &self,
        envelope: &PromptEnvelope,
        on_update: Option<OnUpdate<'_>>,
    ) -> Result<String> {
        debug!("Using Anthropic model: {}", self.model);
        self.generate_inner(envelope, on_update)
            .await
            .map_err(|e| MeshError::generation(&self.model, e))
    }
}
