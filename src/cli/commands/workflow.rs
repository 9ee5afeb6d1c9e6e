//! Workflow Command
//!
//! Run a saved workflow, or list the configured ones.
//!
//! Usage:
//!   promptmesh workflow run <name> [--input Note.md] [--name "My Note"] [--stdout]
//!   promptmesh workflow list

use std::io::Write;
use std::path::PathBuf;

use console::style;

use crate::cli::util::{CommandContext, read_seed};
use crate::pipeline::Pipeline;
use crate::provider::create_provider;
use crate::types::Result;

pub async fn run(
    name: &str,
    input: Option<PathBuf>,
    output_name: Option<String>,
    stdout: bool,
) -> Result<()> {
    let ctx = CommandContext::load()?;
    let workflow = ctx.config.find_workflow(name)?;
    let provider = create_provider(workflow.provider, &ctx.config)?;
    let seed = read_seed(&ctx.vault, input.as_deref())?;
    let pipeline = Pipeline::new(provider.as_ref(), &ctx.patterns);

    let output = if stdout {
        let mut print_fragment = |fragment: &str| {
            print!("{}", fragment);
            let _ = std::io::stdout().flush();
        };
        let output = pipeline
            .run_workflow(workflow, &seed, Some(&mut print_fragment))
            .await?;
        println!();
        output
    } else {
        pipeline.run_workflow(workflow, &seed, None).await?
    };

    if !stdout {
        let basename = output_name.as_deref().unwrap_or(&workflow.name);
        let path =
            ctx.vault
                .create_output_file(&ctx.config.vault.output_folder, basename, &output)?;
        println!("{} Created {}", style("✓").green(), path.display());
    }
    Ok(())
}

pub fn list() -> Result<()> {
    let ctx = CommandContext::load()?;
    if ctx.config.workflows.is_empty() {
        println!("No workflows configured.");
        println!("Add [[workflows]] entries to your config to define one.");
        return Ok(());
    }
    for workflow in &ctx.config.workflows {
        let mode = if workflow.stitching {
            "stitched"
        } else {
            "chained"
        };
        println!(
            "{}  provider={} mode={} patterns={}",
            style(&workflow.name).bold(),
            workflow.provider,
            mode,
            workflow.patterns.join(" -> ")
        );
    }
    Ok(())
}
