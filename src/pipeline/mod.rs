//! Pattern Pipeline
//!
//! Runs an ordered list of patterns through one provider, strictly
//! sequentially. Two composition modes:
//!
//! - **Chained**: each pattern's response becomes the next pattern's
//!   input. The final response is the pipeline output.
//! - **Stitched**: every pattern receives the original input, and the
//!   responses are concatenated into one labeled report.
//!
//! A failed step aborts the pipeline immediately; there are no retries
//! and later patterns are never invoked.

use tracing::{debug, info};

use crate::config::Workflow;
use crate::pattern::{PatternLibrary, PromptEnvelope};
use crate::provider::{OnUpdate, Provider};
use crate::types::Result;

pub struct Pipeline<'a> {
    provider: &'a dyn Provider,
    patterns: &'a PatternLibrary,
}

impl<'a> Pipeline<'a> {
    pub fn new(provider: &'a dyn Provider, patterns: &'a PatternLibrary) -> Self {
        Self { provider, patterns }
    }

    /// Run patterns in order, feeding each response into the next
    /// pattern. An empty pattern list returns the seed unchanged.
    pub async fn run_chained(
        &self,
        pattern_names: &[String],
        seed: &str,
        mut on_update: Option<OnUpdate<'_>>,
    ) -> Result<String> {
        let mut current = seed.to_string();
        for name in pattern_names {
            debug!("Running pattern: {}", name);
            let contents = self.patterns.resolve(name)?;
            let envelope = PromptEnvelope::new(&contents, &current);
            current = self
                .provider
                .generate(
                    &envelope,
                    on_update
                        .as_deref_mut()
                        .map(|cb| cb as &mut (dyn FnMut(&str) + Send)),
                )
                .await?;
        }
        info!(
            "Chained pipeline complete: {} pattern(s) via {}",
            pattern_names.len(),
            self.provider.name()
        );
        Ok(current)
    }

    /// Run every pattern against the original seed and stitch the
    /// responses into one labeled report.
    pub async fn run_stitched(
        &self,
        pattern_names: &[String],
        seed: &str,
        mut on_update: Option<OnUpdate<'_>>,
    ) -> Result<String> {
        let mut report = String::new();
        for name in pattern_names {
            debug!("Running pattern: {}", name);
            let contents = self.patterns.resolve(name)?;
            let envelope = PromptEnvelope::new(&contents, seed);
            let response = self
                .provider
                .generate(
                    &envelope,
                    on_update
                        .as_deref_mut()
                        .map(|cb| cb as &mut (dyn FnMut(&str) + Send)),
                )
                .await?;
            report.push_str(&format!("# {}\n\n---\n\n{}\n\n\n", name, response));
        }
        info!(
            "Stitched pipeline complete: {} pattern(s) via {}",
            pattern_names.len(),
            self.provider.name()
        );
        Ok(report)
    }

    /// Run a saved workflow in its configured mode.
    pub async fn run_workflow(
        &self,
        workflow: &Workflow,
        seed: &str,
        on_update: Option<OnUpdate<'_>>,
    ) -> Result<String> {
        if workflow.stitching {
            self.run_stitched(&workflow.patterns, seed, on_update).await
        } else {
            self.run_chained(&workflow.patterns, seed, on_update).await
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MeshError;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Records every envelope it sees and echoes a deterministic
    /// response derived from the input.
    struct EchoProvider {
        calls: Mutex<Vec<(String, String)>>,
        fail_on_call: Option<usize>,
    }

    impl EchoProvider {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_on_call: None,
            }
        }

        fn failing_on(call: usize) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_on_call: Some(call),
            }
        }
    }

    #[async_trait]
    impl Provider for EchoProvider {
        fn name(&self) -> &'static str {
            "echo"
        }

        async fn list_models(&self) -> Result<Vec<String>> {
            Ok(vec![])
        }

        async fn generate(
            &self,
            envelope: &PromptEnvelope,
            on_update: Option<OnUpdate<'_>>,
        ) -> Result<String> {
            let mut calls = self.calls.lock().unwrap();
            let index = calls.len();
            calls.push((envelope.pattern().to_string(), envelope.input().to_string()));
            if self.fail_on_call == Some(index) {
                return Err(MeshError::Transport {
                    status: 500,
                    body: "upstream unavailable".to_string(),
                });
            }
            let response = format!("[{}|{}]", envelope.pattern(), envelope.input());
            if let Some(on_update) = on_update {
                on_update(&response);
            }
            Ok(response)
        }
    }

    fn library_with(patterns: &[(&str, &str)]) -> (TempDir, PatternLibrary) {
        let dir = TempDir::new().unwrap();
        let custom = dir.path().join("custom");
        std::fs::create_dir_all(&custom).unwrap();
        for (name, body) in patterns {
            std::fs::write(custom.join(format!("{}.md", name)), body).unwrap();
        }
        let library = PatternLibrary::new(custom, dir.path().join("downloaded"));
        (dir, library)
    }

    #[tokio::test]
    async fn test_chained_feeds_each_response_forward() {
        let (_dir, library) = library_with(&[("first", "P1"), ("second", "P2")]);
        let provider = EchoProvider::new();
        let pipeline = Pipeline::new(&provider, &library);

        let out = pipeline
            .run_chained(&["first".to_string(), "second".to_string()], "seed", None)
            .await
            .unwrap();

        assert_eq!(out, "[P2|[P1|seed]]");
        let calls = provider.calls.lock().unwrap();
        assert_eq!(calls[0], ("P1".to_string(), "seed".to_string()));
        assert_eq!(calls[1], ("P2".to_string(), "[P1|seed]".to_string()));
    }

    #[tokio::test]
    async fn test_chained_empty_returns_seed() {
        let (_dir, library) = library_with(&[]);
        let provider = EchoProvider::new();
        let pipeline = Pipeline::new(&provider, &library);

        let out = pipeline.run_chained(&[], "seed", None).await.unwrap();
        assert_eq!(out, "seed");
        assert!(provider.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stitched_reuses_original_seed() {
        let (_dir, library) = library_with(&[("alpha", "A"), ("beta", "B")]);
        let provider = EchoProvider::new();
        let pipeline = Pipeline::new(&provider, &library);

        let out = pipeline
            .run_stitched(&["alpha".to_string(), "beta".to_string()], "seed", None)
            .await
            .unwrap();

        let calls = provider.calls.lock().unwrap();
        assert_eq!(calls[0].1, "seed");
        assert_eq!(calls[1].1, "seed");
        assert_eq!(out, "# alpha\n\n---\n\n[A|seed]\n\n\n# beta\n\n---\n\n[B|seed]\n\n\n");
    }

    #[tokio::test]
    async fn test_first_error_aborts_pipeline() {
        let (_dir, library) = library_with(&[("one", "P1"), ("two", "P2")]);
        let provider = EchoProvider::failing_on(0);
        let pipeline = Pipeline::new(&provider, &library);

        let err = pipeline
            .run_chained(&["one".to_string(), "two".to_string()], "seed", None)
            .await
            .unwrap_err();

        assert!(matches!(err, MeshError::Transport { status: 500, .. }));
        assert_eq!(provider.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_pattern_aborts_before_provider_call() {
        let (_dir, library) = library_with(&[]);
        let provider = EchoProvider::new();
        let pipeline = Pipeline::new(&provider, &library);

        let err = pipeline
            .run_chained(&["absent".to_string()], "seed", None)
            .await
            .unwrap_err();

        assert!(matches!(err, MeshError::PatternNotFound { .. }));
        assert!(provider.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_workflow_dispatches_on_stitching_flag() {
        let (_dir, library) = library_with(&[("alpha", "A")]);
        let provider = EchoProvider::new();
        let pipeline = Pipeline::new(&provider, &library);

        let workflow = Workflow {
            name: "report".to_string(),
            provider: crate::provider::ProviderKind::OpenAi,
            patterns: vec!["alpha".to_string()],
            stitching: true,
        };
        let out = pipeline.run_workflow(&workflow, "seed", None).await.unwrap();
        assert!(out.starts_with("# alpha\n"));
    }
}
