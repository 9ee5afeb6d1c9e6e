//! Prompt Envelope
//!
//! The fixed wrapper sent to every model: a pattern body slot and an
//! input slot inside stable markers. Both parts are sanitized at
//! construction, so neither can forge the markers or the placeholder
//! tokens. The parts stay accessible after construction — adapters that
//! submit the pattern and input as separate messages (Groq) read them
//! structurally instead of re-parsing the rendered string.

use crate::constants::{FULL_PROMPT_TEMPLATE, INPUT_PLACEHOLDER, PATTERN_PLACEHOLDER};
use crate::pattern::sanitize;

#[derive(Debug, Clone)]
pub struct PromptEnvelope {
    pattern: String,
    input: String,
}

impl PromptEnvelope {
    /// Build an envelope from a raw pattern body and input content.
    /// Both are sanitized here; callers pass raw text.
    pub fn new(pattern_body: &str, input: &str) -> Self {
        Self {
            pattern: sanitize(pattern_body),
            input: sanitize(input),
        }
    }

    /// The sanitized pattern body.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The sanitized input content.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Render the full wrapper text for single-prompt submission.
    pub fn render(&self) -> String {
        FULL_PROMPT_TEMPLATE
            .replace(PATTERN_PLACEHOLDER, &self.pattern)
            .replace(INPUT_PLACEHOLDER, &self.input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_contains_both_sections() {
        let envelope = PromptEnvelope::new("Summarize the text.", "Some long document.");
        let rendered = envelope.render();
        assert!(rendered.contains("<prompt>\nSummarize the text.\n</prompt>"));
        assert!(rendered.contains("<input>\nSome long document.\n</input>"));
    }

    #[test]
    fn test_parts_are_sanitized() {
        let envelope = PromptEnvelope::new(
            &format!("evil {} pattern", "*".repeat(20)),
            "payload {input} here",
        );
        assert_eq!(envelope.pattern(), "evil  pattern");
        assert_eq!(envelope.input(), "payload  here");
    }

    #[test]
    fn test_placeholder_in_input_cannot_capture_pattern_slot() {
        // If the input kept its {input} token, rendering would leave a
        // dangling placeholder in the output.
        let envelope = PromptEnvelope::new("body", "{input}{patternContents}");
        let rendered = envelope.render();
        assert!(!rendered.contains("{patternContents}"));
        // exactly the template's own substitution, nothing re-expandable
        assert_eq!(rendered.matches("<input>").count(), 1);
    }
}
