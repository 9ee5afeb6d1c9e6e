//! Web Search
//!
//! Pathway research runs through one of two interchangeable search
//! backends selected in config: Tavily's dedicated search API, or
//! Perplexity's online chat model. Both return one text blob for
//! downstream pattern processing.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use tracing::debug;

use crate::config::{HttpConfig, SearchConfig, SearchProviderKind};
use crate::transport::HttpClient;
use crate::types::{MeshError, Result};

const TAVILY_SEARCH_URL: &str = "https://api.tavily.com/search";
const TAVILY_MAX_RESULTS: u32 = 10;

const PERPLEXITY_API_BASE: &str = "https://api.perplexity.ai";
const PERPLEXITY_MODEL: &str = "llama-3.1-sonar-large-128k-online";

/// Uniform search interface.
#[async_trait]
pub trait SearchClient: Send + Sync {
    async fn search(&self, query: &str) -> Result<String>;
}

/// Create the configured search backend.
pub fn create_search_client(
    config: &SearchConfig,
    http: &HttpConfig,
) -> Result<Box<dyn SearchClient>> {
    match config.provider {
        SearchProviderKind::Tavily => Ok(Box::new(TavilyClient::new(config, http)?)),
        SearchProviderKind::Perplexity => Ok(Box::new(PerplexityClient::new(config, http)?)),
    }
}

// =============================================================================
// Tavily
// =============================================================================

pub struct TavilyClient {
    client: reqwest::Client,
    api_key: SecretString,
}

impl TavilyClient {
    pub fn new(config: &SearchConfig, http: &HttpConfig) -> Result<Self> {
        if config.tavily_api_key.trim().is_empty() {
            return Err(MeshError::Config(
                "Tavily API key is not configured".to_string(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(http.timeout_secs))
            .build()
            .map_err(|e| MeshError::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            api_key: SecretString::from(config.tavily_api_key.clone()),
        })
    }
}

#[async_trait]
impl SearchClient for TavilyClient {
    /// Run one advanced-depth search and return the raw response body as
    /// a JSON string. The API key travels in the request body, which is
    /// why the body is never logged.
    async fn search(&self, query: &str) -> Result<String> {
        debug!("Searching via Tavily: {}", query);
        let payload = json!({
            "api_key": self.api_key.expose_secret(),
            "query": query,
            "search_depth": "advanced",
            "include_answer": true,
            "max_results": TAVILY_MAX_RESULTS,
        });

        let response = self
            .client
            .post(TAVILY_SEARCH_URL)
            .json(&payload)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MeshError::Search(format!(
                "Search request failed with status {}",
                status.as_u16()
            )));
        }
        let body: Value = response.json().await?;
        Ok(body.to_string())
    }
}

// =============================================================================
// Perplexity
// =============================================================================

pub struct PerplexityClient {
    client: HttpClient,
}

impl PerplexityClient {
    pub fn new(config: &SearchConfig, http: &HttpConfig) -> Result<Self> {
        if config.perplexity_api_key.trim().is_empty() {
            return Err(MeshError::Config(
                "Perplexity API key is not configured".to_string(),
            ));
        }
        let api_key = SecretString::from(config.perplexity_api_key.clone());
        let client = HttpClient::new(PERPLEXITY_API_BASE, Duration::from_secs(http.timeout_secs))?
            .with_auth_header(
                "authorization",
                &format!("Bearer {}", api_key.expose_secret()),
            )?
            .with_header("accept", "application/json")?
            .with_header("content-type", "application/json")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl SearchClient for PerplexityClient {
    /// Ask the online model directly; its answer text is the search
    /// result.
    async fn search(&self, query: &str) -> Result<String> {
        debug!("Searching via Perplexity: {}", query);
        let payload = json!({
            "model": PERPLEXITY_MODEL,
            "messages": [
                { "role": "system", "content": "Be precise and concise." },
                { "role": "user", "content": query }
            ],
            "return_images": true,
        });

        let response = self.client.post_json("/chat/completions", &payload).await?;
        extract_answer(&response)
    }
}

fn extract_answer(response: &Value) -> Result<String> {
    response
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(|| MeshError::Search("no results found in Perplexity response".to_string()))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchConfig;

    #[test]
    fn test_backend_selection_requires_matching_key() {
        let http = HttpConfig::default();

        let tavily_only = SearchConfig {
            provider: SearchProviderKind::Tavily,
            tavily_api_key: "tvly-123".to_string(),
            perplexity_api_key: String::new(),
        };
        assert!(create_search_client(&tavily_only, &http).is_ok());

        let wrong_backend = SearchConfig {
            provider: SearchProviderKind::Perplexity,
            ..tavily_only
        };
        assert!(matches!(
            create_search_client(&wrong_backend, &http),
            Err(MeshError::Config(_))
        ));

        let perplexity = SearchConfig {
            provider: SearchProviderKind::Perplexity,
            tavily_api_key: String::new(),
            perplexity_api_key: "pplx-123".to_string(),
        };
        assert!(create_search_client(&perplexity, &http).is_ok());
    }

    #[test]
    fn test_extract_answer_from_chat_response() {
        let response = serde_json::json!({
            "choices": [ { "message": { "content": "the answer" } } ]
        });
        assert_eq!(extract_answer(&response).unwrap(), "the answer");
    }

    #[test]
    fn test_extract_answer_rejects_empty_choices() {
        let response = serde_json::json!({ "choices": [] });
        assert!(matches!(
            extract_answer(&response),
            Err(MeshError::Search(_))
        ));
    }
}
