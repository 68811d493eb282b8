use axum::{
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

/// POST /chat — streams the assistant reply as plain text.
///
/// Failures deliberately answer 200 with a JSON `{reply}` body: the widget
/// renders whatever it gets, and an unreachable backend is a conversational
/// outcome, not a transport error.
pub async fn chat(State(state): State<AppState>, Json(req): Json<ChatRequest>) -> Response {
    let message = req.message.trim();
    if message.is_empty() {
        return Json(json!({ "reply": "Please type something." })).into_response();
    }

    match state.chat.generate(message).await {
        Ok(stream) => (
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            Body::from_stream(stream),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!("Chat stream failed to open: {e}");
            Json(json!({
                "reply": "Could not connect to the assistant backend. Is it running?",
            }))
            .into_response()
        }
    }
}
