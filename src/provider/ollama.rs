//! Ollama local-server adapter.
//!
//! No authentication headers; the endpoint URL is validated and the
//! target model id does the differentiating. `/api/generate` streams
//! newline-delimited JSON with the partial text in `response`.

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

const DEFAULT_SERVER_URL: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "llama2";

pub struct OllamaProvider {
    client: HttpClient,
    model: String,
}

impl OllamaProvider {
    pub fn new(config: &LocalProviderConfig, http: &HttpConfig) -> Result<Self> {
        let server_url = if config.server_url.trim().is_empty() {
            DEFAULT_SERVER_URL.to_string()
        } else {
            config.server_url.clone()
        };
        let server_url = validate_local_endpoint(&server_url, "Ollama")?;
        let client = HttpClient::new(server_url, Duration::from_secs(http.timeout_secs))?
            .with_header("content-type", "application/json")?
            .with_stream_mode(http.stream_mode());

        Ok(Self {
            client,
            model: select_model("Ollama", &config.models, DEFAULT_MODEL),
        })
    }

    async fn generate_inner(
        &self,
        envelope: &PromptEnvelope,
        mut on_update: Option<OnUpdate<'_>>,
    ) -> Result<String> {
        let payload = json!({
            "model": self.model,
            "system": SYSTEM_PROMPT,
            "prompt": envelope.render(),
            "stream": true,
        });

        let mut full = String::new();
        let mut handle = |chunk: Value| {
            if let Some(text) = chunk["response"].as_str() {
                full.push_str(text);
                if let Some(on_update) = on_update.as_deref_mut() {
                    on_update(text);
                }
            }
        };
        self.client
            .post_ndjson("/api/generate", &payload, &mut handle)
            .await?;
        Ok(full)
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    fn name(&self) -> &'static str {
        "ollama"
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        let response = self.client.get_json("/api/tags").await.map_err(|e| {
            MeshError::Config(format!(
                "Failed to fetch Ollama models. Please ensure the Ollama server is running and the URL is correct. ({})",
                e
            ))
        })?;
        let models = response["models"]
            .as_array()
            .ok_or_else(|| MeshError::unexpected("Ollama", "tag list missing models array"))?;
        Ok(models
            .iter()
            .filter_map(|m| m["name"].as_str())
            .map(String::from)
            .collect())
    }

    async fn generate(
        &self,
        envelope: &PromptEnvelope,
        on_update: Option<OnUpdate<'_>>,
    ) -> Result<String> {
        debug!("Using Ollama model: {}", self.model);
        self.generate_inner(envelope, on_update)
            .await
            .map_err(|e| MeshError::generation(&self.model, e))
    }
}
