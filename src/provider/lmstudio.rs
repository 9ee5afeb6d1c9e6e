//! LM Studio local-server adapter.
//!
//! OpenAI-compatible surface on localhost, but the local server's
//! streaming framing is unreliable across versions, so generation is
//! non-streaming and the full response is delivered through the update
//! callback in one piece.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

use super::{OnUpdate, Provider, select_model, validate_local_endpoint};
use crate::config::{HttpConfig, LocalProviderConfig};
use crate::constants::SYSTEM_PROMPT;
use crate::pattern::PromptEnvelope;
use crate::transport::HttpClient;
use crate::types::{MeshError, Result};

const DEFAULT_SERVER_URL: &str = "http://localhost:1234";
const DEFAULT_MODEL: &str = "default-model";

pub struct LmStudioProvider {
    client: HttpClient,
    model: String,
}

impl LmStudioProvider {
    pub fn new(config: &LocalProviderConfig, http: &HttpConfig) -> Result<Self> {
        let server_url = if config.server_url.trim().is_empty() {
            DEFAULT_SERVER_URL.to_string()
        } else {
            config.server_url.clone()
        };
        let server_url = validate_local_endpoint(&server_url, "LM Studio")?;
        let client = HttpClient::new(server_url, Duration::from_secs(http.timeout_secs))?
            .with_header("content-type", "application/json")?;

        Ok(Self {
            client,
            model: select_model("LM Studio", &config.models, DEFAULT_MODEL),
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
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": envelope.render() }
            ],
            "stream": false,
        });

        let response = self
            .client
            .post_json("/v1/chat/completions", &payload)
            .await?;
        let content = response
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                MeshError::unexpected("LM Studio", "missing choices[0].message.content")
            })?;

        if let Some(on_update) = on_update {
            on_update(content);
        }
        Ok(content.to_string())
    }
}

#[async_trait]
impl Provider for LmStudioProvider {
    fn name(&self) -> &'static str {
        "lmstudio"
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        let response = self.client.get_json("/v1/models").await.map_err(|e| {
            MeshError::Config(format!(
                "Failed to fetch LM Studio models. Please ensure the local server is running and the URL is correct. ({})",
                e
            ))
        })?;
        let data = response["data"]
            .as_array()
            .ok_or_else(|| MeshError::unexpected("LM Studio", "model list missing data array"))?;
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
        debug!("Using LM Studio model: {}", self.model);
        self.generate_inner(envelope, on_update)
            .await
            .map_err(|e| MeshError::generation(&self.model, e))
    }
}
