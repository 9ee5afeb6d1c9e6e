//! Fabric Pattern Downloader
//!
//! Mirrors the public fabric pattern repository into the downloaded
//! patterns folder: the GitHub contents API lists one directory per
//! pattern, and each directory's `system.md` becomes a local
//! `{name}.md`. A failed individual pattern is counted, logged, and
//! skipped; only the initial listing is fatal.

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use serde_json::Value;
use tracing::{info, warn};

use crate::config::HttpConfig;
use crate::constants::{FABRIC_PATTERNS_API_URL, FABRIC_PATTERNS_RAW_URL};
use crate::types::{MeshError, Result};
use crate::vault::Vault;

/// Outcome of a download run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DownloadReport {
    pub succeeded: usize,
    pub failed: usize,
}

pub struct FabricDownloader {
    client: reqwest::Client,
}

impl FabricDownloader {
    pub fn new(http: &HttpConfig) -> Result<Self> {
        // GitHub rejects requests without a User-Agent.
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(http.timeout_secs))
            .user_agent("promptmesh")
            .build()
            .map_err(|e| MeshError::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Download every pattern into `folder` (vault-relative), one
    /// `{name}.md` per upstream directory.
    pub async fn download_patterns(
        &self,
        vault: &Vault,
        folder: &str,
    ) -> Result<DownloadReport> {
        vault.ensure_folder(folder)?;

        let listing: Value = self
            .client
            .get(FABRIC_PATTERNS_API_URL)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| MeshError::Config(format!("Failed to list fabric patterns: {}", e)))?
            .json()
            .await?;

        let names = pattern_names(&listing)?;
        let report = mirror_patterns(&names, &vault.path(folder), |name| async move {
            self.fetch_pattern(&name).await
        })
        .await;

        info!(
            "Fabric download complete: {} succeeded, {} failed",
            report.succeeded, report.failed
        );
        Ok(report)
    }

    async fn fetch_pattern(&self, name: &str) -> Result<String> {
        let url = format!("{}/{}/system.md", FABRIC_PATTERNS_RAW_URL, name);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MeshError::Transport {
                status: status.as_u16(),
                body: format!("no system.md for pattern {}", name),
            });
        }
        Ok(response.text().await?)
    }
}

/// Pattern names from a GitHub contents listing: one per `dir` entry.
fn pattern_names(listing: &Value) -> Result<Vec<String>> {
    let entries = listing
        .as_array()
        .ok_or_else(|| MeshError::unexpected("GitHub", "contents listing is not an array"))?;
    Ok(entries
        .iter()
        .filter(|e| e["type"].as_str() == Some("dir"))
        .filter_map(|e| e["name"].as_str())
        .map(String::from)
        .collect())
}

/// Fetch each named pattern through `fetch` and save it under `dest`,
/// counting per-item outcomes without aborting the run.
async fn mirror_patterns<F, Fut>(names: &[String], dest: &Path, fetch: F) -> DownloadReport
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<String>>,
{
    let mut report = DownloadReport::default();
    for name in names {
        match fetch(name.clone()).await {
            Ok(body) => {
                let path = dest.join(format!("{}.md", name));
                if let Err(e) = std::fs::write(&path, body) {
                    warn!("Failed to save pattern {}: {}", name, e);
                    report.failed += 1;
                } else {
                    report.succeeded += 1;
                }
            }
            Err(e) => {
                warn!("Failed to download pattern {}: {}", name, e);
                report.failed += 1;
            }
        }
    }
    report
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_pattern_names_takes_only_directories() {
        let listing = json!([
            { "type": "dir", "name": "summarize" },
            { "type": "file", "name": "README.md" },
            { "type": "dir", "name": "extract_wisdom" },
        ]);
        assert_eq!(
            pattern_names(&listing).unwrap(),
            vec!["summarize", "extract_wisdom"]
        );
    }

    #[test]
    fn test_pattern_names_rejects_non_array() {
        assert!(matches!(
            pattern_names(&json!({"message": "rate limited"})),
            Err(MeshError::UnexpectedResponse { .. })
        ));
    }

    #[tokio::test]
    async fn test_mirror_counts_failures_without_aborting() {
        let dir = TempDir::new().unwrap();
        let names: Vec<String> = ["alpha", "broken", "beta"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let report = mirror_patterns(&names, dir.path(), |name| async move {
            if name == "broken" {
                Err(MeshError::Transport {
                    status: 404,
                    body: "missing".to_string(),
                })
            } else {
                Ok(format!("# {}", name))
            }
        })
        .await;

        assert_eq!(
            report,
            DownloadReport {
                succeeded: 2,
                failed: 1
            }
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("alpha.md")).unwrap(),
            "# alpha"
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("beta.md")).unwrap(),
            "# beta"
        );
        assert!(!dir.path().join("broken.md").exists());
    }

    #[tokio::test]
    async fn test_mirror_overwrites_existing_pattern() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("alpha.md"), "stale").unwrap();
        let names = vec!["alpha".to_string()];

        let report =
            mirror_patterns(&names, dir.path(), |_| async move { Ok("fresh".to_string()) }).await;

        assert_eq!(report.succeeded, 1);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("alpha.md")).unwrap(),
            "fresh"
        );
    }
}
