//! Pathways Command
//!
//! Analyze a note for backlink opportunities; optionally insert the
//! backlinks and research each topic into a new note via the default
//! pathways workflow.
//!
//! Usage:
//!   promptmesh pathways "Note.md"
//!   promptmesh pathways "Note.md" --apply

use std::path::PathBuf;

use console::style;

use crate::cli::util::CommandContext;
use crate::pathways::{analyze, create_pathway, insert_backlink};
use crate::pipeline::Pipeline;
use crate::provider::create_provider;
use crate::search::create_search_client;
use crate::types::{MeshError, Result};

pub async fn run(note: PathBuf, apply: bool) -> Result<()> {
    let ctx = CommandContext::load()?;
    let workflow_name = ctx
        .config
        .pathways
        .default_workflow
        .as_deref()
        .ok_or_else(|| {
            MeshError::Config("pathways.default_workflow is not configured".to_string())
        })?;
    let workflow = ctx.config.find_workflow(workflow_name)?;
    let provider = create_provider(workflow.provider, &ctx.config)?;

    let content = ctx.vault.read_note(&note)?;
    let existing = ctx.vault.list_all_note_names();

    println!("Analyzing {}...", note.display());
    let suggestions = analyze(provider.as_ref(), &content, &existing).await?;
    if suggestions.is_empty() {
        println!("No pathway suggestions.");
        return Ok(());
    }

    for pathway in &suggestions {
        println!("{}", style(&pathway.backlink).bold());
        println!("  question: {}", pathway.question);
        println!("  anchor:   {}", pathway.match_text);
        if !pathway.potential_links.is_empty() {
            println!("  existing: {}", pathway.potential_links.join(", "));
        }
    }

    if !apply {
        return Ok(());
    }

    let search = create_search_client(&ctx.config.search, &ctx.config.http)?;
    let pipeline = Pipeline::new(provider.as_ref(), &ctx.patterns);

    let mut updated = content;
    for pathway in &suggestions {
        updated = insert_backlink(&updated, pathway);
        // notes that already exist are linked, not re-researched
        if pathway.potential_links.is_empty() {
            let path = create_pathway(
                pathway,
                search.as_ref(),
                &pipeline,
                workflow,
                &ctx.vault,
                &ctx.config.pathways.output_folder,
            )
            .await?;
            println!("{} Created {}", style("✓").green(), path.display());
        }
    }
    ctx.vault.write_note(&note, &updated)?;
    println!(
        "{} Inserted {} backlink(s) into {}",
        style("✓").green(),
        suggestions.len(),
        note.display()
    );
    Ok(())
}
