//! Chat backend client — streams completions from an Ollama-compatible
//! `/api/generate` endpoint and re-emits only the text fragments.

pub mod handlers;

use bytes::Bytes;
use futures_util::{future, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::AppError;

const SYSTEM_FRAME: &str =
    "You are a friendly AI assistant for resume and job-related questions.";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateChunk {
    #[serde(default)]
    response: Option<String>,
}

#[derive(Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl ChatClient {
    pub fn new(base_url: String, model: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            base_url,
            model,
        }
    }

    /// Opens a streaming completion for one user message. The returned
    /// stream yields decoded text fragments in arrival order; it ends when
    /// the upstream stream closes.
    pub async fn generate(
        &self,
        message: &str,
    ) -> Result<impl Stream<Item = Result<Bytes, reqwest::Error>>, AppError> {
        let body = GenerateRequest {
            model: &self.model,
            prompt: format!("{SYSTEM_FRAME}\nUser: {message}\nAI:"),
            stream: true,
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::External(format!("Chat backend unreachable: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::External(format!(
                "Chat backend returned {status}"
            )));
        }

        // The upstream emits newline-delimited JSON; lines may split across
        // transport chunks, so decoding buffers partial lines between polls.
        let stream = response
            .bytes_stream()
            .scan(String::new(), |buffer, chunk| {
                let item = match chunk {
                    Ok(bytes) => Ok(drain_response_lines(buffer, &bytes)),
                    Err(err) => Err(err),
                };
                future::ready(Some(item))
            })
            .filter(|item| future::ready(!matches!(item, Ok(text) if text.is_empty())))
            .map(|item| item.map(Bytes::from));

        Ok(stream)
    }
}

/// Appends a transport chunk to the line buffer, drains every complete
/// NDJSON line, and concatenates their `response` fragments.
fn drain_response_lines(buffer: &mut String, chunk: &[u8]) -> String {
    buffer.push_str(&String::from_utf8_lossy(chunk));

    let mut text = String::new();
    while let Some(newline) = buffer.find('\n') {
        let line: String = buffer.drain(..=newline).collect();
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<GenerateChunk>(line) {
            Ok(part) => {
                if let Some(fragment) = part.response {
                    text.push_str(&fragment);
                }
            }
            Err(_) => continue, // skip malformed lines, keep the stream alive
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drains_complete_lines() {
        let mut buffer = String::new();
        let text = drain_response_lines(
            &mut buffer,
            b"{\"response\":\"Hel\"}\n{\"response\":\"lo\"}\n",
        );
        assert_eq!(text, "Hello");
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_partial_line_is_buffered_until_complete() {
        let mut buffer = String::new();
        let text = drain_response_lines(&mut buffer, b"{\"response\":\"par");
        assert_eq!(text, "");
        assert_eq!(buffer, "{\"response\":\"par");

        let text = drain_response_lines(&mut buffer, b"tial\"}\n");
        assert_eq!(text, "partial");
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let mut buffer = String::new();
        let text =
            drain_response_lines(&mut buffer, b"not json\n{\"response\":\"ok\"}\n");
        assert_eq!(text, "ok");
    }

    #[test]
    fn test_lines_without_response_field_yield_nothing() {
        let mut buffer = String::new();
        let text = drain_response_lines(&mut buffer, b"{\"done\":true}\n");
        assert_eq!(text, "");
    }
}
