//! Transport Client
//!
//! Issues GET/POST requests with per-vendor headers against a fixed base
//! URL and decodes the two streaming wire formats the vendors use:
//! Server-Sent-Events-like `data: {...}` lines (cloud chat APIs) and
//! newline-delimited JSON (Ollama).
//!
//! Two interchangeable streaming backends are selected at composition
//! time: [`StreamMode::Incremental`] reads the body chunk by chunk;
//! [`StreamMode::Buffered`] reads it eagerly and replays the identical
//! decoder over the whole blob. Callers cannot tell them apart except by
//! latency, because both feed the same line-buffering decoders.

use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::types::{MeshError, Result};

/// Literal end-of-stream sentinel used by SSE chat endpoints.
const DONE_SENTINEL: &str = "[DONE]";

/// How a streaming response body is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamMode {
    /// Decode chunks as they arrive.
    #[default]
    Incremental,
    /// Read the full body first, then decode. For host environments
    /// that only deliver complete buffered responses.
    Buffered,
}

// =============================================================================
// Line Decoders
// =============================================================================

/// Incremental SSE-style decoder. Accumulates bytes, splits on newline
/// boundaries, strips the `data: ` prefix, and emits one parsed JSON
/// value per payload line. `[DONE]` halts decoding; a malformed payload
/// is logged and skipped without aborting the stream.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    done: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once the `[DONE]` sentinel has been seen.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Feed raw bytes, invoking `on_chunk` for each complete payload.
    pub fn feed(&mut self, bytes: &[u8], on_chunk: &mut dyn FnMut(Value)) {
        if self.done {
            return;
        }
        self.buffer.extend_from_slice(bytes);
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.handle_line(&line[..line.len() - 1], on_chunk);
            if self.done {
                return;
            }
        }
    }

    /// Flush any trailing line left without a final newline.
    pub fn finish(&mut self, on_chunk: &mut dyn FnMut(Value)) {
        if self.done || self.buffer.is_empty() {
            return;
        }
        let line = std::mem::take(&mut self.buffer);
        self.handle_line(&line, on_chunk);
    }

    fn handle_line(&mut self, line: &[u8], on_chunk: &mut dyn FnMut(Value)) {
        let line = String::from_utf8_lossy(line);
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        let Some(payload) = line.strip_prefix("data: ") else {
            // event:/comment lines are not payloads
            return;
        };
        if payload == DONE_SENTINEL {
            self.done = true;
            return;
        }
        match serde_json::from_str::<Value>(payload) {
            Ok(value) => on_chunk(value),
            Err(e) => warn!("Skipping malformed stream line: {}", e),
        }
    }
}

/// Newline-delimited JSON decoder (Ollama's generate endpoint). Every
/// non-blank line is one JSON document; malformed lines are logged and
/// skipped.
#[derive(Debug, Default)]
pub struct NdjsonDecoder {
    buffer: Vec<u8>,
}

impl NdjsonDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, bytes: &[u8], on_chunk: &mut dyn FnMut(Value)) {
        self.buffer.extend_from_slice(bytes);
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            Self::handle_line(&line[..line.len() - 1], on_chunk);
        }
    }

    pub fn finish(&mut self, on_chunk: &mut dyn FnMut(Value)) {
        if self.buffer.is_empty() {
            return;
        }
        let line = std::mem::take(&mut self.buffer);
        Self::handle_line(&line, on_chunk);
    }

    fn handle_line(line: &[u8], on_chunk: &mut dyn FnMut(Value)) {
        let line = String::from_utf8_lossy(line);
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        match serde_json::from_str::<Value>(line) {
            Ok(value) => on_chunk(value),
            Err(e) => warn!("Skipping malformed stream line: {}", e),
        }
    }
}

// =============================================================================
// HTTP Client
// =============================================================================

/// Shared HTTP client for one vendor endpoint: base URL, default header
/// set, timeout, and streaming backend.
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    headers: HeaderMap,
    client: reqwest::Client,
    stream_mode: StreamMode,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MeshError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self {
            base_url,
            headers: HeaderMap::new(),
            client,
            stream_mode: StreamMode::default(),
        })
    }

    /// Add a default header sent with every request.
    pub fn with_header(mut self, name: &'static str, value: &str) -> Result<Self> {
        let value = HeaderValue::from_str(value)
            .map_err(|e| MeshError::Config(format!("Invalid header value for {}: {}", name, e)))?;
        self.headers.insert(HeaderName::from_static(name), value);
        Ok(self)
    }

    /// Add a credential-bearing header. Marked sensitive so the value
    /// never appears in Debug output of the header map.
    pub fn with_auth_header(mut self, name: &'static str, value: &str) -> Result<Self> {
        let mut value = HeaderValue::from_str(value)
            .map_err(|e| MeshError::Config(format!("Invalid header value for {}: {}", name, e)))?;
        value.set_sensitive(true);
        self.headers.insert(HeaderName::from_static(name), value);
        Ok(self)
    }

    /// Select the streaming backend.
    pub fn with_stream_mode(mut self, mode: StreamMode) -> Self {
        self.stream_mode = mode;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET, expecting a 2xx JSON body.
    pub async fn get_json(&self, path: &str) -> Result<Value> {
        debug!("GET {}{}", self.base_url, path);
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .headers(self.headers.clone())
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    /// POST, expecting a 2xx JSON body.
    pub async fn post_json(&self, path: &str, body: &Value) -> Result<Value> {
        debug!("POST {}{}", self.base_url, path);
        let response = self.send_post(path, body).await?;
        Ok(response.json().await?)
    }

    /// POST with an SSE-decoded streaming response. `on_chunk` receives
    /// each parsed payload in arrival order; the `[DONE]` sentinel stops
    /// decoding without being delivered.
    pub async fn post_sse(
        &self,
        path: &str,
        body: &Value,
        on_chunk: &mut (dyn FnMut(Value) + Send),
    ) -> Result<()> {
        debug!("POST (sse) {}{}", self.base_url, path);
        let response = self.send_post(path, body).await?;
        let mut decoder = SseDecoder::new();

        match self.stream_mode {
            StreamMode::Incremental => {
                let mut stream = response.bytes_stream();
                while let Some(chunk) = stream.next().await {
                    decoder.feed(&chunk?, on_chunk);
                    if decoder.is_done() {
                        return Ok(());
                    }
                }
            }
            StreamMode::Buffered => {
                let bytes = response.bytes().await?;
                decoder.feed(&bytes, on_chunk);
            }
        }
        decoder.finish(on_chunk);
        Ok(())
    }

    /// POST with an NDJSON-decoded streaming response.
    pub async fn post_ndjson(
        &self,
        path: &str,
        body: &Value,
        on_chunk: &mut (dyn FnMut(Value) + Send),
    ) -> Result<()> {
        debug!("POST (ndjson) {}{}", self.base_url, path);
        let response = self.send_post(path, body).await?;
        let mut decoder = NdjsonDecoder::new();

        match self.stream_mode {
            StreamMode::Incremental => {
                let mut stream = response.bytes_stream();
                while let Some(chunk) = stream.next().await {
                    decoder.feed(&chunk?, on_chunk);
                }
            }
            StreamMode::Buffered => {
                let bytes = response.bytes().await?;
                decoder.feed(&bytes, on_chunk);
            }
        }
        decoder.finish(on_chunk);
        Ok(())
    }

    async fn send_post(&self, path: &str, body: &Value) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .headers(self.headers.clone())
            .json(body)
            .send()
            .await?;
        Self::check_status(response).await
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MeshError::Transport {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn collect_sse(chunks: &[&[u8]]) -> Vec<Value> {
        let mut decoder = SseDecoder::new();
        let mut out = Vec::new();
        for chunk in chunks {
            decoder.feed(chunk, &mut |v| out.push(v));
        }
        decoder.finish(&mut |v| out.push(v));
        out
    }

    #[test]
    fn test_sse_two_payloads_then_done() {
        let out = collect_sse(&[b"data: {\"a\":1}\ndata: {\"a\":2}\ndata: [DONE]\n"]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0]["a"], 1);
        assert_eq!(out[1]["a"], 2);
    }

    #[test]
    fn test_sse_done_stops_decoding() {
        let out = collect_sse(&[b"data: [DONE]\ndata: {\"after\":true}\n"]);
        assert!(out.is_empty());
    }

    #[test]
    fn test_sse_malformed_line_skipped() {
        let out = collect_sse(&[b"data: {not json}\ndata: {\"ok\":1}\n"]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["ok"], 1);
    }

    #[test]
    fn test_sse_line_split_across_chunks() {
        let out = collect_sse(&[b"data: {\"sp", b"lit\":3}\nda", b"ta: {\"b\":4}\n"]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0]["split"], 3);
        assert_eq!(out[1]["b"], 4);
    }

    #[test]
    fn test_sse_trailing_line_without_newline() {
        let out = collect_sse(&[b"data: {\"tail\":true}"]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["tail"], true);
    }

    #[test]
    fn test_sse_non_data_lines_ignored() {
        let out = collect_sse(&[b"event: ping\n: comment\n\ndata: {\"x\":9}\n"]);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_sse_buffered_equals_incremental() {
        let body = b"data: {\"n\":1}\ndata: {\"n\":2}\ndata: [DONE]\n";
        let incremental: Vec<Value> = {
            // byte-at-a-time is the worst case for the line buffer
            let singles: Vec<&[u8]> = body.chunks(1).collect();
            collect_sse(&singles)
        };
        let buffered = collect_sse(&[body]);
        assert_eq!(incremental, buffered);
    }

    #[test]
    fn test_ndjson_decodes_each_line() {
        let mut decoder = NdjsonDecoder::new();
        let mut out = Vec::new();
        decoder.feed(b"{\"response\":\"a\"}\n\n{\"response\":\"b\"}\n", &mut |v| {
            out.push(v)
        });
        decoder.finish(&mut |v| out.push(v));
        assert_eq!(out.len(), 2);
        assert_eq!(out[0]["response"], "a");
        assert_eq!(out[1]["response"], "b");
    }

    #[test]
    fn test_ndjson_malformed_line_skipped() {
        let mut decoder = NdjsonDecoder::new();
        let mut out = Vec::new();
        decoder.feed(b"garbage\n{\"ok\":true}\n", &mut |v| out.push(v));
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client =
            HttpClient::new("http://localhost:11434/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:11434");
    }
}
