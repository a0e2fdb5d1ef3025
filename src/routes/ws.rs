//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{info, error, instrument, debug};

use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::logic::*;
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "devskill_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "devskill_backend", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        let reply = reply_to_text(&txt, &state).await;
        if let Err(e) = socket.send(Message::Text(reply)).await {
          error!(target: "devskill_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "devskill_backend", "WebSocket disconnected");
}

/// Parse one text frame, dispatch it and serialize the reply.
async fn reply_to_text(txt: &str, state: &AppState) -> String {
  let reply_msg = match serde_json::from_str::<ClientWsMessage>(txt) {
    Ok(incoming) => {
      debug!(target: "devskill_backend", "WS received: {:?}", &incoming);
      handle_client_ws(incoming, state).await
    }
    Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
  };

  serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
    serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
  })
}

#[instrument(level = "info", skip(state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::SessionUpdate { session_id, metrics } => {
      match update_session(state, &session_id, metrics).await {
        Ok(()) => ServerWsMessage::SessionUpdated { session_id },
        Err(e) => ServerWsMessage::Error { message: e.to_string() },
      }
    }

    ClientWsMessage::AnalyzeSession { session_id } => {
      match reanalyze_session(state, &session_id).await {
        Ok((_, detection, tips)) => {
          info!(target: "session", %session_id, score = detection.ai_likelihood_score, "WS analyze_session served");
          ServerWsMessage::Analysis { session_id, detection, tips }
        }
        Err(e) => ServerWsMessage::Error { message: e.to_string() },
      }
    }

    ClientWsMessage::NewQuest { skill_level, language } => {
      let quest = serve_quest(state, &skill_level, language.as_deref()).await;
      info!(target: "quest", id = quest.id, %skill_level, "WS new_quest served");
      ServerWsMessage::Quest { quest }
    }
  }
}
