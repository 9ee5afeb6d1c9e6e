//! Transcript Command
//!
//! Fetch YouTube transcripts, either for one URL or for every video
//! linked from a vault note.
//!
//! Usage:
//!   promptmesh transcript <url>
//!   promptmesh transcript --note "Talks.md"

use std::path::PathBuf;

use console::style;

use crate::cli::util::CommandContext;
use crate::transcript::{TranscriptFetcher, find_youtube_urls};
use crate::types::{MeshError, Result};

pub async fn run(url: Option<String>, note: Option<PathBuf>) -> Result<()> {
    let ctx = CommandContext::load()?;
    let fetcher = TranscriptFetcher::new(&ctx.config.http)?;

    let urls = match (url, note) {
        (Some(url), _) => vec![url],
        (None, Some(note)) => {
            let content = ctx.vault.read_note(&note)?;
            let found = find_youtube_urls(&content);
            if found.is_empty() {
                return Err(MeshError::Transcript(format!(
                    "no YouTube links found in {}",
                    note.display()
                )));
            }
            found
        }
        (None, None) => {
            return Err(MeshError::Transcript(
                "provide a URL or --note".to_string(),
            ));
        }
    };

    for url in &urls {
        if urls.len() > 1 {
            println!("{}", style(url).bold());
        }
        let transcript = fetcher.fetch_transcript(url).await?;
        println!("{}", transcript);
        if urls.len() > 1 {
            println!();
        }
    }
    Ok(())
}
