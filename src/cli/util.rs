//! Shared Command Plumbing
//!
//! Every command starts from a [`CommandContext`]: the merged
//! configuration plus the vault and pattern library it implies.

use std::io::Read;
use std::path::Path;

use crate::config::{Config, ConfigLoader};
use crate::pattern::PatternLibrary;
use crate::types::Result;
use crate::vault::Vault;

pub struct CommandContext {
    pub config: Config,
    pub vault: Vault,
    pub patterns: PatternLibrary,
}

impl CommandContext {
    pub fn load() -> Result<Self> {
        let config = ConfigLoader::load()?;
        let vault = Vault::new(&config.vault.root);
        let patterns = PatternLibrary::new(
            vault.path(&config.vault.custom_patterns_folder),
            vault.path(&config.vault.downloaded_patterns_folder),
        );
        Ok(Self {
            config,
            vault,
            patterns,
        })
    }
}

/// Seed text for a pipeline: a vault-relative note when given, stdin
/// otherwise.
pub fn read_seed(vault: &Vault, input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) => vault.read_note(path),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}
