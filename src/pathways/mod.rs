//! Pathways
//!
//! Backlink discovery over an existing note: the model proposes topics
//! worth linking out to, each with a question for a web-search-fed
//! workflow and the exact source string to anchor the backlink on.

use std::path::PathBuf;

use serde::Deserialize;
use tracing::{debug, info};

use crate::config::Workflow;
use crate::constants::PATHWAYS_PROMPT;
use crate::pattern::PromptEnvelope;
use crate::pipeline::Pipeline;
use crate::provider::Provider;
use crate::search::SearchClient;
use crate::types::{MeshError, Result};
use crate::vault::Vault;

/// One suggested backlink, as returned by the analysis prompt.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Pathway {
    /// Topic to link out to; becomes the new note's name.
    pub backlink: String,

    /// Question to feed an internet-connected workflow.
    #[serde(rename = "content")]
    pub question: String,

    /// Exact string in the source note the backlink anchors on.
    #[serde(rename = "match")]
    pub match_text: String,

    /// Existing notes that could serve the topic instead.
    #[serde(rename = "potential links", default)]
    pub potential_links: Vec<String>,
}

/// Ask the model for backlink suggestions over `content`. The list of
/// existing note names rides along so the model can propose reusing
/// them instead of creating duplicates.
pub async fn analyze(
    provider: &dyn Provider,
    content: &str,
    existing_notes: &[String],
) -> Result<Vec<Pathway>> {
    let input = format!(
        "{}\n<files>\n{}\n</files>\n",
        content,
        existing_notes.join("\n")
    );
    let envelope = PromptEnvelope::new(PATHWAYS_PROMPT, &input);
    let response = provider.generate(&envelope, None).await?;

    // Models occasionally pretty-print; collapsing whitespace keeps the
    // parse independent of their formatting mood.
    let collapsed: String = response.split_whitespace().collect::<Vec<_>>().join(" ");
    let pathways: Vec<Pathway> = serde_json::from_str(&collapsed)
        .map_err(|e| MeshError::Pathway(format!("analysis did not return a JSON array: {}", e)))?;
    debug!("Analysis proposed {} pathway(s)", pathways.len());
    Ok(pathways)
}

/// Insert `[[backlink]]` immediately after the first occurrence of the
/// pathway's match string. When the match is absent the backlink is
/// appended to the end instead.
pub fn insert_backlink(content: &str, pathway: &Pathway) -> String {
    let link = format!("[[{}]]", pathway.backlink);
    match content.find(&pathway.match_text) {
        Some(pos) => {
            let end = pos + pathway.match_text.len();
            format!("{} {}{}", &content[..end], link, &content[end..])
        }
        None => format!("{}\n\n{}", content, link),
    }
}

/// Research a pathway's question through web search plus a workflow and
/// persist the result as a new note named after the backlink.
pub async fn create_pathway(
    pathway: &Pathway,
    search: &dyn SearchClient,
    pipeline: &Pipeline<'_>,
    workflow: &Workflow,
    vault: &Vault,
    output_folder: &str,
) -> Result<PathBuf> {
    info!("Creating pathway note: {}", pathway.backlink);
    let results = search.search(&pathway.question).await?;
    let body = pipeline.run_workflow(workflow, &results, None).await?;
    let basename = note_basename(&pathway.backlink);
    vault.create_output_file(output_folder, &basename, &body)
}

/// Strip filesystem-hostile characters from a proposed note name.
fn note_basename(backlink: &str) -> String {
    backlink
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => ' ',
            other => other,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_analysis_response() {
        let json = r#"[
            {
                "backlink": "Spaced Repetition",
                "content": "What is spaced repetition and how does it improve retention?",
                "match": "reviewing at increasing intervals",
                "potential links": ["Memory", "Anki"]
            },
            {
                "backlink": "Zettelkasten",
                "content": "How does the Zettelkasten method work?",
                "match": "linked note system"
            }
        ]"#;
        let pathways: Vec<Pathway> = serde_json::from_str(json).unwrap();
        assert_eq!(pathways.len(), 2);
        assert_eq!(pathways[0].backlink, "Spaced Repetition");
        assert_eq!(pathways[0].potential_links, vec!["Memory", "Anki"]);
        assert_eq!(pathways[1].match_text, "linked note system");
        assert!(pathways[1].potential_links.is_empty());
    }

    fn pathway(backlink: &str, match_text: &str) -> Pathway {
        Pathway {
            backlink: backlink.to_string(),
            question: String::new(),
            match_text: match_text.to_string(),
            potential_links: Vec::new(),
        }
    }

    #[test]
    fn test_insert_after_first_match() {
        let content = "Learning works best when reviewing often. Reviewing often helps.";
        let out = insert_backlink(content, &pathway("Spacing", "reviewing often"));
        assert_eq!(
            out,
            "Learning works best when reviewing often [[Spacing]]. Reviewing often helps."
        );
    }

    #[test]
    fn test_appends_when_match_absent() {
        let out = insert_backlink("No anchor here.", &pathway("Topic", "missing text"));
        assert_eq!(out, "No anchor here.\n\n[[Topic]]");
    }

    #[test]
    fn test_note_basename_strips_hostile_characters() {
        assert_eq!(note_basename("A/B: C?"), "A B  C");
    }
}
