use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use promptmesh::provider::ProviderKind;

/// Parse a provider name from string
fn parse_provider(s: &str) -> Result<ProviderKind, String> {
    s.parse()
}

#[derive(Parser)]
#[command(name = "promptmesh")]
#[command(
    version,
    about = "Pattern-chaining AI pipelines for markdown vaults"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long)]
    verbose: bool,

    #[arg(long, short)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an ad-hoc pattern pipeline over a note or stdin
    Run {
        #[arg(required = true, help = "Pattern names, in execution order")]
        patterns: Vec<String>,
        #[arg(long, short, value_parser = parse_provider, default_value = "openai",
              help = "Provider: openai, google, microsoft, anthropic, groq, ollama, openrouter, lmstudio")]
        provider: ProviderKind,
        #[arg(long, short, help = "Vault-relative input note (stdin if omitted)")]
        input: Option<PathBuf>,
        #[arg(long, short, help = "Basename for the output note")]
        name: Option<String>,
        #[arg(long, help = "Stitch outputs into one report instead of chaining")]
        stitch: bool,
        #[arg(long, help = "Print to stdout instead of creating a note")]
        stdout: bool,
        #[arg(long, help = "Buffer streaming responses instead of decoding incrementally")]
        buffered: bool,
        #[arg(long, help = "Append transcripts of YouTube links found in the input")]
        transcripts: bool,
    },

    /// Run or list saved workflows
    Workflow {
        #[command(subcommand)]
        action: WorkflowAction,
    },

    /// List a vendor's available models
    Models {
        #[arg(value_parser = parse_provider, help = "Provider to query")]
        provider: ProviderKind,
    },

    /// Manage pattern folders
    Patterns {
        #[command(subcommand)]
        action: PatternsAction,
    },

    /// Suggest and create backlink pathways for a note
    Pathways {
        #[arg(help = "Vault-relative note to analyze")]
        note: PathBuf,
        #[arg(long, help = "Insert backlinks and create research notes")]
        apply: bool,
    },

    /// Web search via Tavily
    Search {
        #[arg(help = "Search query")]
        query: String,
    },

    /// Fetch YouTube transcripts
    Transcript {
        #[arg(help = "YouTube video URL")]
        url: Option<String>,
        #[arg(long, help = "Fetch transcripts for every video linked in this note")]
        note: Option<PathBuf>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum WorkflowAction {
    /// Run a saved workflow
    Run {
        #[arg(help = "Workflow name")]
        name: String,
        #[arg(long, short, help = "Vault-relative input note (stdin if omitted)")]
        input: Option<PathBuf>,
        #[arg(long, short = 'n', help = "Basename for the output note")]
        name_output: Option<String>,
        #[arg(long, help = "Print to stdout instead of creating a note")]
        stdout: bool,
    },
    /// List configured workflows
    List,
}

#[derive(Subcommand)]
enum PatternsAction {
    /// List patterns across both folders
    List,
    /// Download the public fabric pattern collection
    Download,
    /// Delete all downloaded patterns
    Clear,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(short = 'f', long, default_value = "toml", help = "Output format: toml, json")]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Initialize project configuration
    Init {
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

fn main() -> ExitCode {
    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", console::style("Error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    use promptmesh::cli::commands;

    match cli.command {
        Commands::Run {
            patterns,
            provider,
            input,
            name,
            stitch,
            stdout,
            buffered,
            transcripts,
        } => {
            let rt = Runtime::new()?;
            rt.block_on(commands::run::run(commands::run::RunOptions {
                patterns,
                provider,
                input,
                name,
                stitch,
                stdout,
                buffered,
                transcripts,
            }))?;
        }
        Commands::Workflow { action } => match action {
            WorkflowAction::Run {
                name,
                input,
                name_output,
                stdout,
            } => {
                let rt = Runtime::new()?;
                rt.block_on(commands::workflow::run(&name, input, name_output, stdout))?;
            }
            WorkflowAction::List => {
                commands::workflow::list()?;
            }
        },
        Commands::Models { provider } => {
            let rt = Runtime::new()?;
            rt.block_on(commands::models::run(provider))?;
        }
        Commands::Patterns { action } => match action {
            PatternsAction::List => {
                commands::patterns::list()?;
            }
            PatternsAction::Download => {
                let rt = Runtime::new()?;
                rt.block_on(commands::patterns::download())?;
            }
            PatternsAction::Clear => {
                commands::patterns::clear()?;
            }
        },
        Commands::Pathways { note, apply } => {
            let rt = Runtime::new()?;
            rt.block_on(commands::pathways::run(note, apply))?;
        }
        Commands::Search { query } => {
            let rt = Runtime::new()?;
            rt.block_on(commands::search::run(&query))?;
        }
        Commands::Transcript { url, note } => {
            let rt = Runtime::new()?;
            rt.block_on(commands::transcript::run(url, note))?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => {
                commands::config::show(&format)?;
            }
            ConfigAction::Path => {
                commands::config::path()?;
            }
            ConfigAction::Init { force } => {
                commands::config::init(force)?;
            }
        },
    }

    Ok(())
}
