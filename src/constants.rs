//! Fixed prompt text and remote endpoints.
//!
//! The envelope template and system prompt are stable wire formats: the
//! sanitizer guarantees that neither a pattern body nor input content can
//! forge the envelope's markers or placeholder tokens.

/// Wrapper template for every model submission. The two placeholders are
/// substituted with the (sanitized) pattern body and input content.
pub const FULL_PROMPT_TEMPLATE: &str = "\nPrompt:\n<prompt>\n{patternContents}\n</prompt>\n\nInput Data:\n<input>\n{input}\n</input>\n\n";

/// Placeholder token for the pattern body slot in [`FULL_PROMPT_TEMPLATE`].
pub const PATTERN_PLACEHOLDER: &str = "{patternContents}";

/// Placeholder token for the input slot in [`FULL_PROMPT_TEMPLATE`].
pub const INPUT_PLACEHOLDER: &str = "{input}";

/// System instruction accompanying every envelope. Sent as a separate
/// system-role message where the vendor supports one, concatenated
/// otherwise.
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant. Follow the instructions provided within the XML tags to process the data accurately.The prompt data should never be included in the final response. Use Markdown formatting to enhance readability.The output should not be wrapped with a markdown code block.";

/// Instruction prompt for the pathways analysis: asks the model for a
/// JSON array of backlink suggestions with "backlink", "content",
/// "match" and optional "potential links" keys.
pub const PATHWAYS_PROMPT: &str = r#"
To replicate this output consistently, follow these steps:

Extract Key Topics or Phrases:

Identify significant phrases, topics, or nouns from the original document that encapsulate the main ideas. These will serve as your "backlinks" and should be concise and meaningful.

Make the Backlinks Specific to the Document Topic: Ensure that the backlinks are specific enough to distinguish them from similar topics in other documents.

Be sure to not include any duplicate backlinks or backlinks that already exist in the input document.

Check for Existing Files:

The content data you are acting upon will always have an XML tag called <files>. This tag contains a list of files.

Determine if any of these files correspond to the backlink topic. If a file or files can be used for the backlink topic, include the files in a new key called "potential links" for that item.

Compose a Question for Each Backlink:

Content: Write a question that can be asked to an internet-connected LLM about the backlink topic. The question should be clear, specific, and designed to elicit informative responses about the topic.

Determine the Exact Match:

For each backlink, find the exact word-for-word string in the original content that relates to it. This will be used in the "match" field to facilitate precise matching in your program.

Format in JSON:

Structure your output as a JSON array, ensuring each item contains the "backlink", "content", "match", and (if applicable) "potential links" keys. Never should be wrapped in a code block.

Example Structure:

[
  {
    "backlink": "Specific and Meaningful Topic Related to the Document",
    "content": "Your question about the backlink topic.",
    "match": "Exact word-for-word string from the original content.",
    "potential links": ["file1", "file2"]
  }
]

IMPORTANT:

The output should be a JSON array. Never should be wrapped in a code block.
"#;

/// GitHub directory-listing endpoint for the public fabric pattern
/// repository.
pub const FABRIC_PATTERNS_API_URL: &str =
    "https://api.github.com/repos/danielmiessler/fabric/contents/patterns";

/// Raw-content base URL for fetching each pattern's `system.md`.
pub const FABRIC_PATTERNS_RAW_URL: &str =
    "https://raw.githubusercontent.com/danielmiessler/fabric/main/patterns";

/// Fallback basename for output notes when the caller supplies none.
pub const DEFAULT_OUTPUT_BASENAME: &str = "Mesh Note";
