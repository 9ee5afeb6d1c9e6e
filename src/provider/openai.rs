//! OpenAI Chat Completions adapter.
//!
//! Streams deltas from `/chat/completions` when an update callback is
//! supplied; otherwise uses the plain JSON path. Model listing filters
//! `/models` to `gpt-` prefixed ids.

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

const API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

pub struct OpenAiProvider {
    client: HttpClient,
    model: String,
}

impl OpenAiProvider {
    pub fn new(config: &CloudProviderConfig, http: &HttpConfig) -> Result<Self> {
        if !config.has_credential() {
            return Err(MeshError::Config(
                "OpenAI API key is not configured".to_string(),
            ));
        }
        let api_key = SecretString::from(config.api_key.clone());
        let client = HttpClient::new(API_BASE, Duration::from_secs(http.timeout_secs))?
            .with_auth_header(
                "authorization",
                &format!("Bearer {}", api_key.expose_secret()),
            )?
            .with_header("content-type", "application/json")?
            .with_stream_mode(http.stream_mode());

        Ok(Self {
            client,
            model: select_model("OpenAI", &config.models, DEFAULT_MODEL),
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
                { "role": "system", "content": "You are a helpful assistant." },
                { "role": "user", "content": envelope.render() }
            ],
            "stream": on_update.is_some(),
        });

        if let Some(on_update) = on_update {
            let mut full = String::new();
            let mut handle = |chunk: Value| {
                if let Some(text) = chunk
                    .pointer("/choices/0/delta/content")
                    .and_then(Value::as_str)
                {
                    full.push_str(text);
                    on_update(text);
                }
            };
            self.client
                .post_sse("/chat/completions", &payload, &mut handle)
                .await?;
            Ok(full.trim().to_string())
        } else {
            let response = self.client.post_json("/chat/completions", &payload).await?;
            response
                .pointer("/choices/0/message/content")
                .and_then(Value::as_str)
                .map(|s| s.trim().to_string())
                .ok_or_else(|| MeshError::unexpected("OpenAI", "missing choices[0].message.content"))
        }
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        let response = self.client.get_json("/models").await?;
        let data = response["data"]
            .as_array()
            .ok_or_else(|| MeshError::unexpected("OpenAI", "model list missing data array"))?;
        Ok(data
            .iter()
            .filter_map(|m| m["id"].as_str())
            .filter(|id| id.starts_with("gpt-"))
            .map(String::from)
            .collect())
    }

    async fn generate(
        &self,
        envelope: &PromptEnvelope,
        on_update: Option<OnUpdate<'_>>,
    ) -> Result<String> {
        debug!("Using OpenAI model: {}", self.model);
        self.generate_inner(envelope, on_update)
            .await
            .map_err(|e| MeshError::generation(&self.model, e))
    }
}
