//! Google Generative Language adapter.
//!
//! Streams `:streamGenerateContent` with permissive safety settings;
//! partial text arrives at `candidates[0].content.parts[0].text`. This
//! vendor has no system-role message, so only the rendered envelope is
//! sent.

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

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "chat-bison-001";

pub struct GoogleProvider {
    client: HttpClient,
    model: String,
}

impl GoogleProvider {
    pub fn new(config: &CloudProviderConfig, http: &HttpConfig) -> Result<Self> {
        if !config.has_credential() {
            return Err(MeshError::Config(
                "Google API key is not configured".to_string(),
            ));
        }
        let api_key = SecretString::from(config.api_key.clone());
        let client = HttpClient::new(API_BASE, Duration::from_secs(http.timeout_secs))?
            .with_auth_header("x-goog-api-key", api_key.expose_secret())?
            .with_header("content-type", "application/json")?
            .with_stream_mode(http.stream_mode());

        Ok(Self {
            client,
            model: select_model("Google", &config.models, DEFAULT_MODEL),
        })
    }

    async fn generate_inner(
        &self,
        envelope: &PromptEnvelope,
        mut on_update: Option<OnUpdate<'_>>,
    ) -> Result<String> {
        let payload = json!({
            "contents": [ { "parts": [ { "text": envelope.render() } ] } ],
            "safety_settings": [
                { "category": "HARM_CATEGORY_DANGEROUS", "threshold": "BLOCK_NONE" },
                { "category": "HARM_CATEGORY_HARASSMENT", "threshold": "BLOCK_NONE" },
                { "category": "HARM_CATEGORY_HATE_SPEECH", "threshold": "BLOCK_NONE" },
                { "category": "HARM_CATEGORY_SEXUALLY_EXPLICIT", "threshold": "BLOCK_NONE" },
                { "category": "HARM_CATEGORY_DANGEROUS_CONTENT", "threshold": "BLOCK_NONE" }
            ],
        });
        let path = format!("/models/{}:streamGenerateContent", self.model);

        let mut full = String::new();
        let mut handle = |chunk: Value| {
            if let Some(text) = chunk
                .pointer("/candidates/0/content/parts/0/text")
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
impl Provider for GoogleProvider {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        let response = self.client.post_json("/models", &json!({})).await?;
        let models = response["models"]
            .as_array()
            .ok_or_else(|| MeshError::unexpected("Google", "model list missing models array"))?;
        Ok(models
            .iter()
            .filter(|m| {
                m["supportedGenerationMethods"]
                    .as_array()
                    .is_some_and(|methods| {
                        methods.iter().any(|v| v.as_str() == Some("generateContent"))
                    })
            })
            .filter_map(|m| m["name"].as_str())
            .map(String::from)
            .collect())
    }

    async fn generate(
        &self,
        envelope: &PromptEnvelope,
        on_update: Option<OnUpdate<'_>>,
    ) -> Result<String> {
        debug!("Using Google model: {}", self.model);
        self.generate_inner(envelope, on_update)
            .await
            .map_err(|e| MeshError::generation(&self.model, e))
    }
}
