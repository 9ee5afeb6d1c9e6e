//! Config Command
//!
//! Manage promptmesh configuration.
//!
//! Usage:
//!   promptmesh config show [-f json]
//!   promptmesh config path
//!   promptmesh config init [--force]

use console::style;

use crate::config::ConfigLoader;
use crate::types::Result;

/// Show the merged effective configuration
pub fn show(format: &str) -> Result<()> {
    ConfigLoader::show_config(format == "json")
}

/// Show configuration file paths
pub fn path() -> Result<()> {
    ConfigLoader::show_path();
    Ok(())
}

/// Write a default project configuration
pub fn init(force: bool) -> Result<()> {
    let path = ConfigLoader::init_project(force)?;
    println!("{} Initialized project configuration", style("✓").green());
    println!("  Config: {}", path.display());
    println!();
    println!("Next steps:");
    println!("  1. Add an API key (config file or PROMPTMESH_PROVIDERS__OPENAI__API_KEY)");
    println!("  2. Run 'promptmesh patterns download' to fetch the fabric collection");
    Ok(())
}
