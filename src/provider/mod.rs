//! LLM Provider Abstraction
//!
//! One trait, eight vendor adapters. The pipeline only ever sees the
//! trait: adding a vendor means adding a variant and a module here,
//! never touching the orchestrator.
//!
//! All adapters follow the same contract: `generate` with an update
//! callback MUST take the streaming transport path and report each
//! partial fragment; without one it may use the simpler non-streaming
//! path. Model selection takes the first configured model for the
//! vendor, falling back to a hardcoded default with a non-fatal warning.

mod anthropic;
mod google;
mod groq;
mod lmstudio;
mod microsoft;
mod ollama;
mod openai;
mod openrouter;

pub use anthropic::AnthropicProvider;
pub use google::GoogleProvider;
pub use groq::GroqProvider;
pub use lmstudio::LmStudioProvider;
pub use microsoft::MicrosoftProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;
pub use openrouter::OpenRouterProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::Config;
use crate::pattern::PromptEnvelope;
use crate::types::{MeshError, Result};

/// Streaming update callback: receives each partial text fragment as it
/// arrives.
pub type OnUpdate<'a> = &'a mut (dyn FnMut(&str) + Send);

/// Uniform vendor interface.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Vendor name for logging and error context.
    fn name(&self) -> &'static str;

    /// List the vendor's chat-capable model ids.
    async fn list_models(&self) -> Result<Vec<String>>;

    /// Run one envelope through the model, returning the full response
    /// text. With `on_update`, the streaming path is used and each
    /// partial fragment is reported before being accumulated.
    async fn generate(
        &self,
        envelope: &PromptEnvelope,
        on_update: Option<OnUpdate<'_>>,
    ) -> Result<String>;
}

// =============================================================================
// Provider Kinds
// =============================================================================

/// Closed set of supported vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Google,
    Microsoft,
    Anthropic,
    Groq,
    Ollama,
    OpenRouter,
    LmStudio,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 8] = [
        ProviderKind::OpenAi,
        ProviderKind::Google,
        ProviderKind::Microsoft,
        ProviderKind::Anthropic,
        ProviderKind::Groq,
        ProviderKind::Ollama,
        ProviderKind::OpenRouter,
        ProviderKind::LmStudio,
    ];
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Google => "google",
            ProviderKind::Microsoft => "microsoft",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Groq => "groq",
            ProviderKind::Ollama => "ollama",
            ProviderKind::OpenRouter => "openrouter",
            ProviderKind::LmStudio => "lmstudio",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "google" => Ok(ProviderKind::Google),
            "microsoft" => Ok(ProviderKind::Microsoft),
            "anthropic" => Ok(ProviderKind::Anthropic),
            "groq" => Ok(ProviderKind::Groq),
            "ollama" => Ok(ProviderKind::Ollama),
            "openrouter" => Ok(ProviderKind::OpenRouter),
            "lmstudio" => Ok(ProviderKind::LmStudio),
            _ => Err(format!(
                "Unknown provider: {}. Supported: openai, google, microsoft, anthropic, groq, ollama, openrouter, lmstudio",
                s
            )),
        }
    }
}

/// Create a provider adapter from configuration.
pub fn create_provider(kind: ProviderKind, config: &Config) -> Result<Box<dyn Provider>> {
    let http = &config.http;
    let p = &config.providers;
    match kind {
        ProviderKind::OpenAi => Ok(Box::new(OpenAiProvider::new(&p.openai, http)?)),
        ProviderKind::Google => Ok(Box::new(GoogleProvider::new(&p.google, http)?)),
        ProviderKind::Microsoft => Ok(Box::new(MicrosoftProvider::new(&p.microsoft, http)?)),
        ProviderKind::Anthropic => Ok(Box::new(AnthropicProvider::new(&p.anthropic, http)?)),
        ProviderKind::Groq => Ok(Box::new(GroqProvider::new(&p.groq, http)?)),
        ProviderKind::Ollama => Ok(Box::new(OllamaProvider::new(&p.ollama, http)?)),
        ProviderKind::OpenRouter => Ok(Box::new(OpenRouterProvider::new(&p.openrouter, http)?)),
        ProviderKind::LmStudio => Ok(Box::new(LmStudioProvider::new(&p.lmstudio, http)?)),
    }
}

// =============================================================================
// Shared Adapter Helpers
// =============================================================================

/// First configured model for the vendor, else the hardcoded default
/// with a non-fatal warning.
pub(crate) fn select_model(provider: &str, configured: &[String], default: &str) -> String {
    match configured.first() {
        Some(model) => model.clone(),
        None => {
            warn!(
                "No {} model has been selected. Using default model \"{}\".",
                provider, default
            );
            default.to_string()
        }
    }
}

/// Validate a user-supplied local server URL: http/https only, warn for
/// non-localhost hosts, trailing slash trimmed.
pub(crate) fn validate_local_endpoint(endpoint: &str, vendor: &str) -> Result<String> {
    let url = url::Url::parse(endpoint).map_err(|e| {
        MeshError::Config(format!("Invalid {} endpoint URL '{}': {}", vendor, endpoint, e))
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(MeshError::Config(format!(
            "{} endpoint must use http or https scheme, got: {}",
            vendor,
            url.scheme()
        )));
    }

    if let Some(host) = url.host_str()
        && !matches!(host, "localhost" | "127.0.0.1" | "::1")
    {
        warn!(
            "{} endpoint is not localhost: {}. Ensure this is intentional.",
            vendor, host
        );
    }

    let mut result = url.to_string();
    while result.ends_with('/') {
        result.pop();
    }
    Ok(result)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_kind_roundtrip() {
        for kind in ProviderKind::ALL {
            assert_eq!(ProviderKind::from_str(&kind.to_string()).unwrap(), kind);
        }
    }

    #[test]
    fn test_kind_from_str_rejects_unknown() {
        assert!(ProviderKind::from_str("perplexity").is_err());
    }

    #[test]
    fn test_select_model_prefers_configured() {
        let configured = vec!["gpt-4o".to_string(), "gpt-4".to_string()];
        assert_eq!(select_model("openai", &configured, "gpt-3.5-turbo"), "gpt-4o");
    }

    #[test]
    fn test_select_model_falls_back_to_default() {
        assert_eq!(select_model("openai", &[], "gpt-3.5-turbo"), "gpt-3.5-turbo");
    }

    #[test]
    fn test_validate_local_endpoint() {
        assert_eq!(
            validate_local_endpoint("http://localhost:11434/", "Ollama").unwrap(),
            "http://localhost:11434"
        );
        assert!(validate_local_endpoint("ftp://localhost", "Ollama").is_err());
        assert!(validate_local_endpoint("not a url", "Ollama").is_err());
    }
}
