//! Search Command
//!
//! One-off web search through the configured backend; prints the raw
//! result text.
//!
//! Usage:
//!   promptmesh search "<query>"

use crate::cli::util::CommandContext;
use crate::search::create_search_client;
use crate::types::Result;

pub async fn run(query: &str) -> Result<()> {
    let ctx = CommandContext::load()?;
    let client = create_search_client(&ctx.config.search, &ctx.config.http)?;
    let results = client.search(query).await?;
    println!("{}", results);
    Ok(())
}
