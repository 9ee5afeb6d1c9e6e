//! Microsoft Azure OpenAI adapter.
//!
//! Deployment-scoped chat completions; the deployment id stands in for
//! the model name.

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

const API_BASE: &str = "https://api.cognitive.microsoft.com";
const API_VERSION: &str = "2023-05-15";
const DEFAULT_MODEL: &str = "gpt-35-turbo";

pub struct MicrosoftProvider {
    client: HttpClient,
    model: String,
}

impl MicrosoftProvider {
    pub fn new(config: &CloudProviderConfig, http: &HttpConfig) -> Result<Self> {
        if !config.has_credential() {
            return Err(MeshError::Config(
                "Microsoft API key is not configured".to_string(),
            ));
        }
        let api_key = SecretString::from(config.api_key.clone());
        let client = HttpClient::new(API_BASE, Duration::from_secs(http.timeout_secs))?
            .with_auth_header("api-key", api_key.expose_secret())?
            .with_header("content-type", "application/json")?
            .with_stream_mode(http.stream_mode());

        Ok(Self {
            client,
            model: select_model("Microsoft", &config.models, DEFAULT_MODEL),
        })
    }

    async fn generate_inner(
        &self,
        envelope: &PromptEnvelope,
        mut on_update: Option<OnUpdate<'_>>,
    ) -> Result<String> {
        let payload = json!({
            "messages": [ { "role": "user", "content": envelope.render() } ],
            "stream": true,
        });
        let path = format!(
            "/openai/deployments/{}/chat/completions?api-version={}",
            self.model, API_VERSION
        );

        let mut full = String::new();
        let mut handle = |chunk: Value| {
            if let Some(text) = chunk
                .pointer("/choices/0/delta/content")
                .and_then(Value::as_str)
            {
                full.push_str(text);
                if let Some(on_update) = on_update.as_deref_mut() {
                    on_update(text);
                }
            }
        };
        self.client.post_sse(&path, &payload, &mut handle).await?;
        Ok(full)
    }
}

#[async_trait]
impl Provider for MicrosoftProvider {
    fn name(&self) -> &'static str {
        "microsoft"
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        let path = format!("/openai/deployments?api-version={}", API_VERSION);
        let response = self.client.post_json(&path, &json!({})).await?;
        let deployments = response["value"].as_array().ok_or_else(|| {
            MeshError::unexpected("Microsoft", "deployment list missing value array")
        })?;
        Ok(deployments
            .iter()
            .filter(|d| {
                d["model"]
                    .as_str()
                    .is_some_and(|m| m.starts_with("gpt"))
            })
            .filter_map(|d| d["id"].as_str())
            .map(String::from)
            .collect())
    }

    async fn generate(
        &self,
        envelope: &PromptEnvelope,
        on_update: Option<OnUpdate<'_>>,
    ) -> Result<String> {
        debug!("Using Microsoft deployment: {}", self.model);
        self.generate_inner(envelope, on_update)
            .await
            .map_err(|e| MeshError::generation(&self.model, e))
    }
}
