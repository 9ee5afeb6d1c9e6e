//! Models Command
//!
//! List the chat-capable models a vendor offers.
//!
//! Usage:
//!   promptmesh models <provider>

use console::style;

use crate::cli::util::CommandContext;
use crate::provider::{ProviderKind, create_provider};
use crate::types::Result;

pub async fn run(kind: ProviderKind) -> Result<()> {
    let ctx = CommandContext::load()?;
    let provider = create_provider(kind, &ctx.config)?;
    let models = provider.list_models().await?;

    if models.is_empty() {
        println!("No models available for {}.", kind);
        return Ok(());
    }
    println!("{} ({} models):", style(kind.to_string()).bold(), models.len());
    for model in models {
        println!("  {}", model);
    }
    Ok(())
}
