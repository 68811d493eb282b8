//! Chat widget core: an ordered transcript with a streaming accumulator
//! bound to a single in-flight request. A second send while one is
//! streaming is rejected outright — two streams never share a slot.

use futures_util::StreamExt;
use serde_json::json;

use crate::error::{Error, Result};
use crate::http::{error_from_response, ApiClient};

const GREETING: &str = "Hi! I'm your AI assistant. How can I help you today?";
const CONNECT_FAILURE: &str =
    "Unable to connect to the assistant. Ensure the backend is running.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    pub speaker: Speaker,
    pub text: String,
}

pub struct ChatWidget {
    api: ApiClient,
    turns: Vec<ChatTurn>,
    /// Id of the request currently streaming into the last turn, if any.
    in_flight: Option<u64>,
    next_request_id: u64,
}

impl ChatWidget {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            turns: vec![ChatTurn {
                speaker: Speaker::Bot,
                text: GREETING.to_string(),
            }],
            in_flight: None,
            next_request_id: 0,
        }
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn is_streaming(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Sends one message: appends the user turn and an empty assistant
    /// placeholder, then streams the reply into that placeholder. A stream
    /// that closes with zero bytes leaves the placeholder empty; transport
    /// errors finalize it with a failure message.
    pub async fn send(&mut self, message: &str) -> Result<()> {
        let message = message.trim();
        if message.is_empty() {
            return Ok(());
        }
        if self.in_flight.is_some() {
            return Err(Error::Busy);
        }

        let request_id = self.next_request_id;
        self.next_request_id += 1;
        self.in_flight = Some(request_id);

        self.turns.push(ChatTurn {
            speaker: Speaker::User,
            text: message.to_string(),
        });
        let slot = self.turns.len();
        self.turns.push(ChatTurn {
            speaker: Speaker::Bot,
            text: String::new(),
        });

        let result = self.stream_into_slot(slot, message).await;
        self.in_flight = None;

        if let Err(e) = result {
            tracing::warn!("Chat stream failed: {e}");
            if self.turns[slot].text.is_empty() {
                self.turns[slot].text = CONNECT_FAILURE.to_string();
            }
            return Err(e);
        }
        Ok(())
    }

    async fn stream_into_slot(&mut self, slot: usize, message: &str) -> Result<()> {
        let response = self
            .api
            .http
            .post(self.api.url("/chat"))
            .json(&json!({ "message": message }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let mut pending: Vec<u8> = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(Error::Network)?;
            decode_push(&mut pending, &chunk, &mut self.turns[slot].text);
        }
        // Whatever trails the final chunk decodes lossily.
        if !pending.is_empty() {
            self.turns[slot]
                .text
                .push_str(&String::from_utf8_lossy(&pending));
        }
        Ok(())
    }
}

/// Appends a transport chunk to `pending`, moves the longest valid UTF-8
/// prefix into `out`, and keeps any incomplete trailing sequence buffered
/// for the next chunk.
fn decode_push(pending: &mut Vec<u8>, chunk: &[u8], out: &mut String) {
    pending.extend_from_slice(chunk);
    match std::str::from_utf8(pending) {
        Ok(text) => {
            out.push_str(text);
            pending.clear();
        }
        Err(err) => {
            let valid = err.valid_up_to();
            // Safe: valid_up_to marks a UTF-8 boundary.
            out.push_str(&String::from_utf8_lossy(&pending[..valid]));
            pending.drain(..valid);
        }
    }
}
