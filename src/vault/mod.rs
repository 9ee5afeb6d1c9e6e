//! Vault Filesystem
//!
//! All note and folder access goes through a root-anchored [`Vault`].
//! Output notes never overwrite: a taken name gets a ` (n)` suffix with
//! the smallest free counter.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::constants::DEFAULT_OUTPUT_BASENAME;
use crate::types::Result;

#[derive(Debug, Clone)]
pub struct Vault {
    root: PathBuf,
}

impl Vault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of a vault-relative location.
    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }

    pub fn exists(&self, relative: impl AsRef<Path>) -> bool {
        self.path(relative).exists()
    }

    /// Read a note's full text.
    pub fn read_note(&self, relative: impl AsRef<Path>) -> Result<String> {
        Ok(fs::read_to_string(self.path(relative))?)
    }

    /// Overwrite a note in place (backlink insertion).
    pub fn write_note(&self, relative: impl AsRef<Path>, content: &str) -> Result<()> {
        Ok(fs::write(self.path(relative), content)?)
    }

    /// Create the folder (and parents) if absent.
    pub fn ensure_folder(&self, relative: impl AsRef<Path>) -> Result<()> {
        let path = self.path(relative);
        if !path.exists() {
            debug!("Creating folder: {}", path.display());
            fs::create_dir_all(&path)?;
        }
        Ok(())
    }

    /// Remove every file directly inside the folder. Subfolders are left
    /// alone; a missing folder is a no-op.
    pub fn clear_folder(&self, relative: impl AsRef<Path>) -> Result<usize> {
        let path = self.path(relative);
        let Ok(entries) = fs::read_dir(&path) else {
            return Ok(0);
        };
        let mut removed = 0;
        for entry in entries.filter_map(|e| e.ok()) {
            if entry.path().is_file() {
                fs::remove_file(entry.path())?;
                removed += 1;
            }
        }
        info!("Cleared {} file(s) from {}", removed, path.display());
        Ok(removed)
    }

    /// Write `content` as a new `.md` note under `folder`, never
    /// overwriting: a taken basename gets ` (1)`, ` (2)`, ... appended.
    /// An empty basename falls back to the default. Returns the path of
    /// the created note.
    pub fn create_output_file(
        &self,
        folder: impl AsRef<Path>,
        basename: &str,
        content: &str,
    ) -> Result<PathBuf> {
        self.ensure_folder(folder.as_ref())?;
        let folder = self.path(folder);

        let basename = basename.trim();
        let basename = if basename.is_empty() {
            DEFAULT_OUTPUT_BASENAME
        } else {
            basename
        };

        let mut candidate = folder.join(format!("{}.md", basename));
        let mut counter = 1;
        while candidate.exists() {
            candidate = folder.join(format!("{} ({}).md", basename, counter));
            counter += 1;
        }

        fs::write(&candidate, content)?;
        info!("Created note: {}", candidate.display());
        Ok(candidate)
    }

    /// Basenames (without extension) of the `.md` notes directly inside
    /// a folder. Missing folders yield an empty list.
    pub fn list_note_basenames(&self, folder: impl AsRef<Path>) -> Vec<String> {
        let Ok(entries) = fs::read_dir(self.path(folder)) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && p.extension().and_then(|e| e.to_str()) == Some("md"))
            .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(String::from))
            .collect();
        names.sort();
        names
    }

    /// Basenames of every `.md` note anywhere under the vault root,
    /// walking subfolders.
    pub fn list_all_note_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        Self::walk(&self.root, &mut names);
        names.sort();
        names.dedup();
        names
    }

    fn walk(dir: &Path, names: &mut Vec<String>) {
        let Ok(entries) = fs::read_dir(dir) else {
            return;
        };
        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();
            if path.is_dir() {
                Self::walk(&path, names);
            } else if path.extension().and_then(|e| e.to_str()) == Some("md")
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                names.push(stem.to_string());
            }
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

    fn vault() -> (TempDir, Vault) {
        let dir = TempDir::new().unwrap();
        let vault = Vault::new(dir.path());
        (dir, vault)
    }

    #[test]
    fn test_create_output_file_increments_on_collision() {
        let (_dir, vault) = vault();
        let first = vault.create_output_file("out", "Note", "one").unwrap();
        let second = vault.create_output_file("out", "Note", "two").unwrap();
        let third = vault.create_output_file("out", "Note", "three").unwrap();

        assert!(first.ends_with("Note.md"));
        assert!(second.ends_with("Note (1).md"));
        assert!(third.ends_with("Note (2).md"));
        assert_eq!(fs::read_to_string(first).unwrap(), "one");
        assert_eq!(fs::read_to_string(third).unwrap(), "three");
    }

    #[test]
    fn test_create_output_file_empty_basename_falls_back() {
        let (_dir, vault) = vault();
        let path = vault.create_output_file("out", "  ", "body").unwrap();
        assert!(path.ends_with(format!("{}.md", DEFAULT_OUTPUT_BASENAME)));
    }

    #[test]
    fn test_read_note_roundtrip() {
        let (_dir, vault) = vault();
        let path = vault.create_output_file("out", "Note", "hello").unwrap();
        let relative = path.strip_prefix(vault.root()).unwrap();
        assert_eq!(vault.read_note(relative).unwrap(), "hello");
    }

    #[test]
    fn test_clear_folder_removes_files_only() {
        let (_dir, vault) = vault();
        vault.create_output_file("out", "a", "").unwrap();
        vault.create_output_file("out", "b", "").unwrap();
        vault.ensure_folder("out/nested").unwrap();

        assert_eq!(vault.clear_folder("out").unwrap(), 2);
        assert!(vault.exists("out/nested"));
        assert!(vault.list_note_basenames("out").is_empty());
    }

    #[test]
    fn test_clear_missing_folder_is_noop() {
        let (_dir, vault) = vault();
        assert_eq!(vault.clear_folder("absent").unwrap(), 0);
    }

    #[test]
    fn test_list_note_basenames_filters_and_sorts() {
        let (_dir, vault) = vault();
        vault.create_output_file("out", "b", "").unwrap();
        vault.create_output_file("out", "a", "").unwrap();
        fs::write(vault.path("out/ignored.txt"), "").unwrap();
        assert_eq!(vault.list_note_basenames("out"), vec!["a", "b"]);
    }

    #[test]
    fn test_list_all_note_names_walks_subfolders() {
        let (_dir, vault) = vault();
        vault.create_output_file("one", "top", "").unwrap();
        vault.create_output_file("one/deep", "inner", "").unwrap();
        let names = vault.list_all_note_names();
        assert!(names.contains(&"top".to_string()));
        assert!(names.contains(&"inner".to_string()));
    }
}
