//! Patterns Command
//!
//! Manage the pattern folders.
//!
//! Usage:
//!   promptmesh patterns list
//!   promptmesh patterns download
//!   promptmesh patterns clear

use console::style;

use crate::cli::util::CommandContext;
use crate::fabric::FabricDownloader;
use crate::types::Result;

pub fn list() -> Result<()> {
    let ctx = CommandContext::load()?;
    let names = ctx.patterns.list();
    if names.is_empty() {
        println!("No patterns found.");
        println!("Run 'promptmesh patterns download' to fetch the fabric collection,");
        println!(
            "or add .md files under {}.",
            ctx.patterns.custom_dir().display()
        );
        return Ok(());
    }
    println!("{} pattern(s):", names.len());
    for name in names {
        println!("  {}", name);
    }
    Ok(())
}

pub async fn download() -> Result<()> {
    let ctx = CommandContext::load()?;
    println!("Downloading fabric patterns...");
    let downloader = FabricDownloader::new(&ctx.config.http)?;
    let report = downloader
        .download_patterns(&ctx.vault, &ctx.config.vault.downloaded_patterns_folder)
        .await?;

    println!(
        "{} Downloaded {} pattern(s){}",
        style("✓").green(),
        report.succeeded,
        if report.failed > 0 {
            format!(", {} failed", report.failed)
        } else {
            String::new()
        }
    );
    Ok(())
}

pub fn clear() -> Result<()> {
    let ctx = CommandContext::load()?;
    let removed = ctx
        .vault
        .clear_folder(&ctx.config.vault.downloaded_patterns_folder)?;
    println!(
        "{} Removed {} downloaded pattern(s)",
        style("✓").green(),
        removed
    );
    Ok(())
}
