//! promptmesh - Pattern-Chaining AI Pipeline for Markdown Vaults
//!
//! Runs reusable prompt templates ("patterns") over notes through a
//! unified multi-vendor LLM interface, and writes the results back into
//! the vault as new notes.
//!
//! ## Core Features
//!
//! - **Pattern Pipelines**: chain patterns (each output feeds the next)
//!   or stitch them (every pattern sees the original input, outputs are
//!   concatenated into one labeled report)
//! - **Eight Vendors**: OpenAI, Google, Microsoft Azure, Anthropic,
//!   Groq, OpenRouter, plus local Ollama and LM Studio, behind one trait
//! - **Streaming**: SSE and NDJSON decoding with interchangeable
//!   incremental/buffered backends
//! - **Fabric Patterns**: one-command download of the public fabric
//!   pattern collection
//! - **Pathways**: model-suggested backlinks with web-search-fed
//!   research notes
//!
//! ## Quick Start
//!
//! ```ignore
//! use promptmesh::{ConfigLoader, PatternLibrary, Pipeline};
//! use promptmesh::provider::{ProviderKind, create_provider};
//!
//! let config = ConfigLoader::load()?;
//! let provider = create_provider(ProviderKind::Ollama, &config)?;
//! let patterns = PatternLibrary::new("Patterns/Custom", "Patterns/Fabric");
//! let pipeline = Pipeline::new(provider.as_ref(), &patterns);
//! let output = pipeline.run_chained(&names, &note_text, None).await?;
//! ```
//!
//! ## Modules
//!
//! - [`provider`]: the vendor trait, its eight adapters, and the factory
//! - [`pipeline`]: chained and stitched pattern execution
//! - [`pattern`]: pattern resolution, sanitizing, and the prompt envelope
//! - [`transport`]: HTTP client plus SSE/NDJSON stream decoding
//! - [`vault`]: note IO with collision-safe output naming
//! - [`pathways`]: backlink analysis and research-note creation

pub mod cli;
pub mod config;
pub mod constants;
pub mod fabric;
pub mod pathways;
pub mod pattern;
pub mod pipeline;
pub mod provider;
pub mod search;
pub mod transcript;
pub mod transport;
pub mod types;
pub mod vault;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader, Workflow};

// Error Types
pub use types::{MeshError, Result};

// Pipeline
pub use pattern::{PatternLibrary, PromptEnvelope};
pub use pipeline::Pipeline;
pub use provider::{Provider, ProviderKind, create_provider};

// Vault
pub use vault::Vault;
