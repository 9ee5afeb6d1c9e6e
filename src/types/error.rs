//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//!
//! ## Failure policy
//!
//! - Transport failures (non-2xx, network) always abort the running
//!   pipeline; there are no automatic retries anywhere in the core.
//! - Per-line stream decode failures are swallowed and logged at the
//!   transport layer and never surface as a `MeshError`.
//! - Missing model configuration is downgraded to a warning plus a
//!   per-vendor default inside the adapters.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MeshError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    /// Non-2xx HTTP response. Carries the status code and the raw body
    /// text so the CLI layer can show vendor error payloads verbatim.
    #[error("HTTP error {status}: {body}")]
    Transport { status: u16, body: String },

    // -------------------------------------------------------------------------
    // Provider Errors
    // -------------------------------------------------------------------------
    /// Vendor response missing an expected field.
    #[error("unexpected response from {provider}: {detail}")]
    UnexpectedResponse {
        provider: &'static str,
        detail: String,
    },

    /// Wrapper naming the model a failed generation was attempted with.
    #[error("failed to generate response with model {model}: {source}")]
    Generation {
        model: String,
        #[source]
        source: Box<MeshError>,
    },

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    #[error("pattern '{name}' not found in '{custom}' or '{downloaded}'")]
    PatternNotFound {
        name: String,
        custom: String,
        downloaded: String,
    },

    #[error("workflow '{0}' not found")]
    WorkflowNotFound(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("transcript error: {0}")]
    Transcript(String),

    #[error("search error: {0}")]
    Search(String),

    #[error("pathway error: {0}")]
    Pathway(String),
}

impl MeshError {
    /// Wrap an adapter failure with the model id it was attempted with.
    pub fn generation(model: impl Into<String>, source: MeshError) -> Self {
        Self::Generation {
            model: model.into(),
            source: Box::new(source),
        }
    }

    /// Shorthand for a missing/unexpected field in a vendor response.
    pub fn unexpected(provider: &'static str, detail: impl Into<String>) -> Self {
        Self::UnexpectedResponse {
            provider,
            detail: detail.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MeshError>;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_display() {
        let err = MeshError::Transport {
            status: 500,
            body: "internal".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP error 500: internal");
    }

    #[test]
    fn test_pattern_not_found_names_both_folders() {
        let err = MeshError::PatternNotFound {
            name: "summarize".to_string(),
            custom: "Patterns/Custom".to_string(),
            downloaded: "Patterns/Fabric".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("summarize"));
        assert!(msg.contains("Patterns/Custom"));
        assert!(msg.contains("Patterns/Fabric"));
    }

    #[test]
    fn test_generation_wraps_source() {
        let err = MeshError::generation(
            "gpt-3.5-turbo",
            MeshError::Transport {
                status: 429,
                body: "slow down".to_string(),
            },
        );
        let msg = err.to_string();
        assert!(msg.contains("gpt-3.5-turbo"));
        assert!(msg.contains("429"));
    }
}
