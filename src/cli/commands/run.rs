//! Run Command
//!
//! Run an ad-hoc pattern pipeline over a note or stdin.
//!
//! Usage:
//!   promptmesh run <pattern>... [--provider openai] [--input Note.md]
//!                  [--name "My Note"] [--stitch] [--stdout] [--buffered]
//!                  [--transcripts]

use std::io::Write;
use std::path::PathBuf;

use console::style;

use crate::cli::util::{CommandContext, read_seed};
use crate::pipeline::Pipeline;
use crate::provider::{ProviderKind, create_provider};
use crate::transcript::{TranscriptFetcher, find_youtube_urls};
use crate::types::Result;

pub struct RunOptions {
    pub patterns: Vec<String>,
    pub provider: ProviderKind,
    pub input: Option<PathBuf>,
    pub name: Option<String>,
    pub stitch: bool,
    pub stdout: bool,
    pub buffered: bool,
    pub transcripts: bool,
}

pub async fn run(opts: RunOptions) -> Result<()> {
    let mut ctx = CommandContext::load()?;
    if opts.buffered {
        ctx.config.http.buffered = true;
    }
    let provider = create_provider(opts.provider, &ctx.config)?;
    let mut seed = read_seed(&ctx.vault, opts.input.as_deref())?;

    if opts.transcripts {
        let fetcher = TranscriptFetcher::new(&ctx.config.http)?;
        for url in find_youtube_urls(&seed) {
            println!("Fetching transcript: {}", url);
            let transcript = fetcher.fetch_transcript(&url).await?;
            seed.push_str("\n\n");
            seed.push_str(&transcript);
        }
    }

    let pipeline = Pipeline::new(provider.as_ref(), &ctx.patterns);

    let output = if opts.stdout {
        // stream fragments straight to the terminal as they arrive
        let mut print_fragment = |fragment: &str| {
            print!("{}", fragment);
            let _ = std::io::stdout().flush();
        };
        let output = if opts.stitch {
            pipeline
                .run_stitched(&opts.patterns, &seed, Some(&mut print_fragment))
                .await?
        } else {
            pipeline
                .run_chained(&opts.patterns, &seed, Some(&mut print_fragment))
                .await?
        };
        println!();
        output
    } else if opts.stitch {
        pipeline.run_stitched(&opts.patterns, &seed, None).await?
    } else {
        pipeline.run_chained(&opts.patterns, &seed, None).await?
    };

    if !opts.stdout {
        let basename = opts.name.as_deref().unwrap_or_default();
        let path =
            ctx.vault
                .create_output_file(&ctx.config.vault.output_folder, basename, &output)?;
        println!("{} Created {}", style("✓").green(), path.display());
    }
    Ok(())
}
