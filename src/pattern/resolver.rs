//! Pattern Resolver
//!
//! Looks up a named prompt template across the two pattern folders:
//! user-authored patterns first, downloaded fabric patterns second.
//! Within a folder the match order is exact filename, `.md`-appended,
//! then case-insensitive.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::types::{MeshError, Result};

/// The two designated pattern folders. Templates are plain files; the
/// resolver only ever reads them.
#[derive(Debug, Clone)]
pub struct PatternLibrary {
    custom_dir: PathBuf,
    downloaded_dir: PathBuf,
}

impl PatternLibrary {
    pub fn new(custom_dir: impl Into<PathBuf>, downloaded_dir: impl Into<PathBuf>) -> Self {
        Self {
            custom_dir: custom_dir.into(),
            downloaded_dir: downloaded_dir.into(),
        }
    }

    pub fn custom_dir(&self) -> &Path {
        &self.custom_dir
    }

    pub fn downloaded_dir(&self) -> &Path {
        &self.downloaded_dir
    }

    /// Resolve a pattern name to its raw template text.
    pub fn resolve(&self, name: &str) -> Result<String> {
        debug!("Resolving pattern: {}", name);
        for dir in [&self.custom_dir, &self.downloaded_dir] {
            if let Some(path) = Self::find_in_dir(dir, name) {
                debug!("Pattern found: {}", path.display());
                return Ok(fs::read_to_string(path)?);
            }
        }
        Err(MeshError::PatternNotFound {
            name: name.to_string(),
            custom: self.custom_dir.display().to_string(),
            downloaded: self.downloaded_dir.display().to_string(),
        })
    }

    /// Sorted, deduplicated basenames of all `.md` patterns across both
    /// folders.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for dir in [&self.custom_dir, &self.downloaded_dir] {
            for entry in Self::md_files(dir) {
                if let Some(stem) = entry.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        names.dedup();
        names
    }

    fn find_in_dir(dir: &Path, name: &str) -> Option<PathBuf> {
        let entries: Vec<PathBuf> = match fs::read_dir(dir) {
            Ok(rd) => rd
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.is_file())
                .collect(),
            Err(_) => {
                debug!("Pattern folder not found: {}", dir.display());
                return None;
            }
        };

        let file_name = |p: &PathBuf| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.to_string())
        };

        // Exact filename match
        if let Some(hit) = entries
            .iter()
            .find(|p| file_name(p).as_deref() == Some(name))
        {
            return Some(hit.clone());
        }

        // With the default extension appended
        let with_ext = format!("{}.md", name);
        if let Some(hit) = entries
            .iter()
            .find(|p| file_name(p).as_deref() == Some(with_ext.as_str()))
        {
            return Some(hit.clone());
        }

        // Case-insensitive
        let lower = name.to_lowercase();
        let lower_ext = with_ext.to_lowercase();
        entries
            .iter()
            .find(|p| {
                file_name(p)
                    .map(|n| {
                        let n = n.to_lowercase();
                        n == lower || n == lower_ext
                    })
                    .unwrap_or(false)
            })
            .cloned()
    }

    fn md_files(dir: &Path) -> Vec<PathBuf> {
        match fs::read_dir(dir) {
            Ok(rd) => rd
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| {
                    p.is_file() && p.extension().and_then(|e| e.to_str()) == Some("md")
                })
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn library() -> (TempDir, TempDir, PatternLibrary) {
        let custom = TempDir::new().unwrap();
        let downloaded = TempDir::new().unwrap();
        let lib = PatternLibrary::new(custom.path(), downloaded.path());
        (custom, downloaded, lib)
    }

    #[test]
    fn test_exact_match() {
        let (custom, _d, lib) = library();
        fs::write(custom.path().join("summarize.md"), "body").unwrap();
        assert_eq!(lib.resolve("summarize.md").unwrap(), "body");
    }

    #[test]
    fn test_extension_appended_match() {
        let (custom, _d, lib) = library();
        fs::write(custom.path().join("summarize.md"), "body").unwrap();
        assert_eq!(lib.resolve("summarize").unwrap(), "body");
    }

    #[test]
    fn test_case_insensitive_match() {
        let (custom, _d, lib) = library();
        fs::write(custom.path().join("summary.md"), "case body").unwrap();
        assert_eq!(lib.resolve("Summary").unwrap(), "case body");
    }

    #[test]
    fn test_custom_folder_wins() {
        let (custom, downloaded, lib) = library();
        fs::write(custom.path().join("extract.md"), "custom").unwrap();
        fs::write(downloaded.path().join("extract.md"), "fabric").unwrap();
        assert_eq!(lib.resolve("extract").unwrap(), "custom");
    }

    #[test]
    fn test_falls_through_to_downloaded() {
        let (_c, downloaded, lib) = library();
        fs::write(downloaded.path().join("extract.md"), "fabric").unwrap();
        assert_eq!(lib.resolve("extract").unwrap(), "fabric");
    }

    #[test]
    fn test_not_found_names_both_folders() {
        let (custom, downloaded, lib) = library();
        let err = lib.resolve("missing").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("missing"));
        assert!(msg.contains(custom.path().to_str().unwrap()));
        assert!(msg.contains(downloaded.path().to_str().unwrap()));
    }

    #[test]
    fn test_list_is_sorted_and_deduplicated() {
        let (custom, downloaded, lib) = library();
        fs::write(custom.path().join("b.md"), "").unwrap();
        fs::write(custom.path().join("a.md"), "").unwrap();
        fs::write(downloaded.path().join("a.md"), "").unwrap();
        fs::write(downloaded.path().join("c.txt"), "").unwrap();
        assert_eq!(lib.list(), vec!["a", "b"]);
    }

    #[test]
    fn test_missing_folders_are_empty_not_errors() {
        let lib = PatternLibrary::new("/nonexistent/custom", "/nonexistent/fabric");
        assert!(lib.list().is_empty());
        assert!(matches!(
            lib.resolve("anything"),
            Err(MeshError::PatternNotFound { .. })
        ));
    }
}
