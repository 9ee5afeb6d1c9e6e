//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/promptmesh/) and project (.promptmesh/)
//! level configuration.
//!
//! API keys are never serialized back out (`config show` redacts them);
//! each adapter converts its key to a `SecretString` at construction.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::provider::ProviderKind;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Vault layout (pattern folders, output folders)
    pub vault: VaultConfig,

    /// Per-vendor credentials and model selections
    pub providers: ProvidersConfig,

    /// Web search settings (pathway enrichment)
    pub search: SearchConfig,

    /// Pathways feature settings
    pub pathways: PathwaysConfig,

    /// Saved workflows (provider + ordered patterns + stitching flag)
    pub workflows: Vec<Workflow>,

    /// HTTP transport settings
    pub http: HttpConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            vault: VaultConfig::default(),
            providers: ProvidersConfig::default(),
            search: SearchConfig::default(),
            pathways: PathwaysConfig::default(),
            workflows: Vec::new(),
            http: HttpConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `MeshError::Config` on validation failure.
    pub fn validate(&self) -> crate::types::Result<()> {
        if self.http.timeout_secs == 0 {
            return Err(crate::types::MeshError::Config(
                "http.timeout_secs must be greater than 0".to_string(),
            ));
        }

        for workflow in &self.workflows {
            if workflow.name.trim().is_empty() {
                return Err(crate::types::MeshError::Config(
                    "workflow name must not be empty".to_string(),
                ));
            }
            if workflow.patterns.is_empty() {
                return Err(crate::types::MeshError::Config(format!(
                    "workflow '{}' has no patterns",
                    workflow.name
                )));
            }
        }

        Ok(())
    }

    /// Look up a saved workflow by name.
    pub fn find_workflow(&self, name: &str) -> crate::types::Result<&Workflow> {
        self.workflows
            .iter()
            .find(|w| w.name == name)
            .ok_or_else(|| crate::types::MeshError::WorkflowNotFound(name.to_string()))
    }
}

// =============================================================================
// Vault Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Vault root directory
    pub root: PathBuf,

    /// Folder holding user-authored patterns (relative to root)
    pub custom_patterns_folder: String,

    /// Folder holding downloaded fabric patterns (relative to root)
    pub downloaded_patterns_folder: String,

    /// Folder pipeline output notes are written into (relative to root)
    pub output_folder: String,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            custom_patterns_folder: "Patterns/Custom".to_string(),
            downloaded_patterns_folder: "Patterns/Fabric".to_string(),
            output_folder: "Mesh Output".to_string(),
        }
    }
}

// =============================================================================
// Provider Configuration
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub openai: CloudProviderConfig,
    pub google: CloudProviderConfig,
    pub microsoft: CloudProviderConfig,
    pub anthropic: CloudProviderConfig,
    pub groq: CloudProviderConfig,
    pub openrouter: CloudProviderConfig,
    pub ollama: LocalProviderConfig,
    pub lmstudio: LocalProviderConfig,
}

/// A hosted vendor: API key plus an ordered model preference list.
/// The first configured model wins; adapters fall back to a per-vendor
/// default (with a warning) when the list is empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudProviderConfig {
    /// Never serialized back out for security
    #[serde(skip_serializing)]
    pub api_key: String,

    /// Ordered model preference list
    pub models: Vec<String>,
}

impl CloudProviderConfig {
    /// A provider is usable only with a non-empty credential.
    pub fn has_credential(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

/// A local server vendor: target URL instead of a credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalProviderConfig {
    pub server_url: String,
    pub models: Vec<String>,
}

impl Default for LocalProviderConfig {
    fn default() -> Self {
        Self {
            server_url: String::new(),
            models: Vec::new(),
        }
    }
}

// =============================================================================
// Search & Pathways Configuration
// =============================================================================

/// Which search backend pathway research goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchProviderKind {
    #[default]
    Tavily,
    Perplexity,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Backend used for pathway research
    pub provider: SearchProviderKind,

    /// Tavily API key, never serialized back out
    #[serde(skip_serializing)]
    pub tavily_api_key: String,

    /// Perplexity API key, never serialized back out
    #[serde(skip_serializing)]
    pub perplexity_api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathwaysConfig {
    /// Folder pathway notes are written into (relative to vault root)
    pub output_folder: String,

    /// Name of the workflow used to process pathway search results
    pub default_workflow: Option<String>,
}

impl Default for PathwaysConfig {
    fn default() -> Self {
        Self {
            output_folder: "Pathways".to_string(),
            default_workflow: None,
        }
    }
}

// =============================================================================
// Workflow
// =============================================================================

/// A named, persisted pipeline configuration: provider, ordered pattern
/// list, and whether outputs are stitched into one report instead of
/// chained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub name: String,
    pub provider: ProviderKind,
    pub patterns: Vec<String>,
    #[serde(default)]
    pub stitching: bool,
}

// =============================================================================
// HTTP Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Read streaming bodies eagerly instead of chunk by chunk. For
    /// environments that only deliver complete buffered responses.
    pub buffered: bool,
}

impl HttpConfig {
    pub fn stream_mode(&self) -> crate::transport::StreamMode {
        if self.buffered {
            crate::transport::StreamMode::Buffered
        } else {
            crate::transport::StreamMode::Incremental
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 300,
            buffered: false,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = Config::default();
        config.http.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_workflow_patterns_rejected() {
        let mut config = Config::default();
        config.workflows.push(Workflow {
            name: "daily".to_string(),
            provider: ProviderKind::OpenAi,
            patterns: vec![],
            stitching: false,
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_find_workflow() {
        let mut config = Config::default();
        config.workflows.push(Workflow {
            name: "daily".to_string(),
            provider: ProviderKind::Ollama,
            patterns: vec!["summarize".to_string()],
            stitching: true,
        });
        assert!(config.find_workflow("daily").is_ok());
        assert!(matches!(
            config.find_workflow("weekly"),
            Err(crate::types::MeshError::WorkflowNotFound(_))
        ));
    }

    #[test]
    fn test_search_provider_switch_parses() {
        let config: SearchConfig = serde_json::from_str(
            r#"{ "provider": "perplexity", "perplexity_api_key": "pplx-1" }"#,
        )
        .unwrap();
        assert_eq!(config.provider, SearchProviderKind::Perplexity);

        let default: SearchConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(default.provider, SearchProviderKind::Tavily);
    }

    #[test]
    fn test_credential_presence() {
        let mut p = CloudProviderConfig::default();
        assert!(!p.has_credential());
        p.api_key = "  ".to_string();
        assert!(!p.has_credential());
        p.api_key = "sk-123".to_string();
        assert!(p.has_credential());
    }
}
