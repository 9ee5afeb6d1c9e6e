//! Prompt patterns: folder-based template resolution, delimiter
//! sanitization, and the prompt envelope wire format.

mod envelope;
mod resolver;
mod sanitize;

pub use envelope::PromptEnvelope;
pub use resolver::PatternLibrary;
pub use sanitize::sanitize;
