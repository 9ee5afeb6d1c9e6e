//! YouTube Transcript Scraper
//!
//! No official API: the watch page embeds a `captionTracks` JSON blob
//! whose first track's `baseUrl` serves the caption XML. The XML's
//! `<text>` nodes are stripped to plain text and joined with spaces.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::config::HttpConfig;
use crate::types::{MeshError, Result};

static YOUTUBE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://(?:www\.)?(?:youtube\.com/watch\?\S*v=|youtu\.be/)[\w-]{11}\S*")
        .expect("valid regex")
});

static VIDEO_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:youtube\.com/watch\?\S*v=|youtu\.be/)([\w-]{11})").expect("valid regex")
});

static CAPTION_TRACKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""captionTracks":(\[.*?\])"#).expect("valid regex"));

static TEXT_NODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<text[^>]*>(.*?)</text>").expect("valid regex"));

/// Every YouTube watch/short URL appearing in the text, in order.
pub fn find_youtube_urls(text: &str) -> Vec<String> {
    YOUTUBE_URL
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// The 11-character video id of a watch or youtu.be URL.
pub fn extract_video_id(url: &str) -> Option<String> {
    VIDEO_ID
        .captures(url)
        .map(|c| c[1].to_string())
}

pub struct TranscriptFetcher {
    client: reqwest::Client,
}

impl TranscriptFetcher {
    pub fn new(http: &HttpConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(http.timeout_secs))
            .build()
            .map_err(|e| MeshError::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Fetch and flatten the transcript of a YouTube URL.
    pub async fn fetch_transcript(&self, url: &str) -> Result<String> {
        let video_id = extract_video_id(url)
            .ok_or_else(|| MeshError::Transcript(format!("not a YouTube video URL: {}", url)))?;
        debug!("Fetching transcript for video: {}", video_id);

        let watch_url = format!("https://www.youtube.com/watch?v={}", video_id);
        let page = self.fetch_text(&watch_url).await?;

        let tracks_json = CAPTION_TRACKS
            .captures(&page)
            .map(|c| c[1].to_string())
            .ok_or_else(|| {
                MeshError::Transcript(format!("no caption tracks found for video {}", video_id))
            })?;
        let tracks: Value = serde_json::from_str(&tracks_json)
            .map_err(|e| MeshError::Transcript(format!("malformed caption track data: {}", e)))?;
        let base_url = tracks
            .get(0)
            .and_then(|t| t["baseUrl"].as_str())
            .ok_or_else(|| {
                MeshError::Transcript(format!("caption track has no baseUrl for {}", video_id))
            })?;

        // captionTracks is JSON-escaped inside the page source
        let base_url = base_url.replace("\\u0026", "&");
        let xml = self.fetch_text(&base_url).await?;
        Ok(flatten_caption_xml(&xml))
    }

    async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(status.as_u16(), url));
        }
        Ok(response.text().await?)
    }
}

/// Non-2xx while scraping stays inside the transcript taxonomy, not the
/// transport one.
fn fetch_error(status: u16, url: &str) -> MeshError {
    MeshError::Transcript(format!("HTTP {} fetching {}", status, url))
}

/// Extract the plain text of every caption `<text>` node, unescape XML
/// entities, and join the pieces with single spaces.
fn flatten_caption_xml(xml: &str) -> String {
    let pieces: Vec<String> = TEXT_NODE
        .captures_iter(xml)
        .map(|c| unescape(&c[1]))
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.trim().to_string())
        .collect();
    pieces.join(" ")
}

fn unescape(text: &str) -> String {
    text.replace("&amp;#39;", "'")
        .replace("&amp;quot;", "\"")
        .replace("&#39;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_urls_in_note_text() {
        let text = "Watch https://www.youtube.com/watch?v=dQw4w9WgXcQ and \
                    also https://youtu.be/abcDEF12345 for context.";
        let urls = find_youtube_urls(text);
        assert_eq!(urls.len(), 2);
        assert!(urls[0].contains("dQw4w9WgXcQ"));
        assert!(urls[1].contains("abcDEF12345"));
    }

    #[test]
    fn test_non_youtube_urls_ignored() {
        let text = "See https://example.com/watch?v=dQw4w9WgXcQ here.";
        assert!(find_youtube_urls(text).is_empty());
    }

    #[test]
    fn test_extract_video_id_watch_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
    }

    #[test]
    fn test_extract_video_id_short_url_with_params() {
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ?t=42").as_deref(),
            Some("dQw4w9WgXcQ")
        );
    }

    #[test]
    fn test_extract_video_id_with_extra_params() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?list=PL123&v=dQw4w9WgXcQ&t=1")
                .as_deref(),
            Some("dQw4w9WgXcQ")
        );
    }

    #[test]
    fn test_extract_video_id_rejects_other_urls() {
        assert_eq!(extract_video_id("https://example.com/video"), None);
    }

    #[test]
    fn test_flatten_caption_xml() {
        let xml = r#"<transcript><text start="0.0" dur="1.2">Hello &amp;#39;world&amp;#39;</text><text start="1.2" dur="0.8">second &amp; line</text></transcript>"#;
        assert_eq!(flatten_caption_xml(xml), "Hello 'world' second & line");
    }

    #[test]
    fn test_fetch_failures_use_transcript_taxonomy() {
        let err = fetch_error(404, "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
        assert!(matches!(err, MeshError::Transcript(_)));
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn test_flatten_skips_empty_nodes() {
        let xml = r#"<text start="0" dur="1">a</text><text start="1" dur="1"> </text><text start="2" dur="1">b</text>"#;
        assert_eq!(flatten_caption_xml(xml), "a b");
    }
}
