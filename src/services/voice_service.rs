use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use uuid::Uuid;

use crate::shared_state::SharedState;

/// Live voice session over a WebSocket.
///
/// Independent of the analysis workflow: its lifecycle is the socket's —
/// connect starts the session, close (or drop) stops it and releases the
/// slot. At most one session is active at a time; a second connect is
/// refused immediately, not queued.
///
/// Frame protocol: the client sends plain text turns; the server answers
/// with JSON frames `{"kind": "reply", "text": ...}` followed by a
/// best-effort `{"kind": "audio", "data": <base64>}`.
pub async fn run_session(socket: WebSocket, shared: SharedState) {
    let (mut sender, mut receiver) = socket.split();

    if !shared.state.try_begin_voice() {
        let refusal = crate::errors::AnalysisError::VoiceSessionActive;
        let _ = sender
            .send(frame(&serde_json::json!({
                "kind": "error",
                "error": refusal.code(),
                "message": refusal.to_string()
            })))
            .await;
        let _ = sender.close().await;
        return;
    }

    let session_id = Uuid::new_v4();
    println!("[VOICE] session {} started", session_id);

    let _ = sender
        .send(frame(&serde_json::json!({
            "kind": "status",
            "session_id": session_id.to_string(),
            "message": "Connected"
        })))
        .await;

    while let Some(incoming) = receiver.next().await {
        let text = match incoming {
            Ok(Message::Text(text)) => text.to_string(),
            Ok(Message::Close(_)) | Err(_) => break,
            // Binary audio upload is not part of this relay; pings are
            // answered by axum automatically.
            Ok(_) => continue,
        };
        if text.trim().is_empty() {
            continue;
        }

        match shared.gemini.voice_reply(&text).await {
            Ok(reply) => {
                if sender
                    .send(frame(&serde_json::json!({ "kind": "reply", "text": reply })))
                    .await
                    .is_err()
                {
                    break;
                }
                // Spoken form is an extra; the text reply already landed.
                if let Ok(audio) = shared.gemini.synthesize_speech(&reply).await {
                    let _ = sender
                        .send(frame(&serde_json::json!({ "kind": "audio", "data": audio })))
                        .await;
                }
            }
            Err(e) => {
                eprintln!("[VOICE] session {}: {}", session_id, e);
                let _ = sender
                    .send(frame(&serde_json::json!({
                        "kind": "error",
                        "error": e.code(),
                        "message": e.to_string()
                    })))
                    .await;
            }
        }
    }

    shared.state.end_voice();
    println!("[VOICE] session {} stopped", session_id);
}

fn frame(value: &serde_json::Value) -> Message {
    Message::Text(value.to_string().into())
}
