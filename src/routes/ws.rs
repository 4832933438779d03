//! WebSocket upgrade + message loop. Each connection owns one learner `Session`.
//! Client messages are parsed as JSON and forwarded to core logic; every reply
//! carries the freshly rendered view.
//!
//! Feedback calls run in spawned tasks so the learner can keep navigating while
//! HQ is analyzing. Their results come back through a channel and are applied
//! to the session like any other event.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tokio::sync::mpsc;
use tracing::{info, error, instrument, debug};

use crate::feedback::FeedbackError;
use crate::logic::{fetch_feedback, handle_client_message, resolve_feedback, FeedbackJob, Reply};
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::session::Session;
use crate::state::AppState;

type Resolved = (u64, Result<String, FeedbackError>);

/// Run each feedback call on its own task; results come back on `tx` tagged with the attempt id.
fn spawn_feedback_jobs(state: &Arc<AppState>, jobs: Vec<FeedbackJob>, tx: &mpsc::UnboundedSender<Resolved>) {
  for job in jobs {
    let state = state.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
      let result = fetch_feedback(&state, &job.request).await;
      // The connection may be gone by now; nothing to deliver to.
      let _ = tx.send((job.attempt_id, result));
    });
  }
}

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "mission_possible", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "mission_possible", "WebSocket connected");
  let mut session = Session::default();
  let (tx, mut rx) = mpsc::unbounded_channel::<Resolved>();

  loop {
    let reply = tokio::select! {
      incoming = socket.recv() => match incoming {
        Some(Ok(Message::Text(txt))) => {
          match serde_json::from_str::<ClientWsMessage>(&txt) {
            Ok(msg) => {
              debug!(target: "mission_possible", "WS received: {:?}", &msg);
              handle_client_message(&state, &mut session, msg).await
            }
            Err(e) => Reply {
              messages: vec![ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) }],
              jobs: vec![],
            },
          }
        }
        Some(Ok(Message::Ping(payload))) => {
          let _ = socket.send(Message::Pong(payload)).await;
          continue;
        }
        Some(Ok(Message::Close(_))) | None => break,
        Some(Ok(_)) => continue,
        Some(Err(e)) => {
          error!(target: "mission_possible", error = %e, "WS receive error");
          break;
        }
      },
      Some((attempt_id, result)) = rx.recv() => {
        resolve_feedback(&state, &mut session, attempt_id, result).await
      }
    };

    spawn_feedback_jobs(&state, reply.jobs, &tx);

    for msg in reply.messages {
      let out = serde_json::to_string(&msg).unwrap_or_else(|e| {
        serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
      });
      if let Err(e) = socket.send(Message::Text(out)).await {
        error!(target: "mission_possible", error = %e, "WS send error");
        info!(target: "mission_possible", "WebSocket disconnected");
        return;
      }
    }
  }
  info!(target: "mission_possible", "WebSocket disconnected");
}

#[cfg(test)]
mod tests {
  use super::*;

  use async_trait::async_trait;

  use crate::domain::Role;
  use crate::feedback::FeedbackClient;
  use crate::identity::PassphraseGate;
  use crate::session::View;

  struct Approving;

  #[async_trait]
  impl FeedbackClient for Approving {
    async fn get_feedback(&self, _text: &str, _prompt: &str) -> Result<String, FeedbackError> {
      Ok("Good work, Agent. Over and out.".into())
    }
  }

  fn state() -> Arc<AppState> {
    let client: Arc<dyn FeedbackClient> = Arc::new(Approving);
    Arc::new(AppState::from_parts(None, Arc::new(PassphraseGate::new("invisible")), Some(client)))
  }

  /// Log in, open a standard mission and submit; returns the pending feedback jobs.
  async fn submit_dossier(state: &AppState, session: &mut Session) -> Vec<FeedbackJob> {
    for msg in [
      ClientWsMessage::Login { role: Role::Student, name: "Bond".into(), passphrase: String::new() },
      ClientWsMessage::OpenMission { mission_id: "da-01".into() },
      ClientWsMessage::EditSubmission { text: "I wake up at 7 AM.".into() },
    ] {
      handle_client_message(state, session, msg).await;
    }
    let reply = handle_client_message(state, session, ClientWsMessage::SubmitDossier).await;
    assert_eq!(reply.jobs.len(), 1);
    reply.jobs
  }

  #[tokio::test]
  async fn spawned_feedback_comes_back_through_the_channel() {
    let state = state();
    let mut session = Session::default();
    let (tx, mut rx) = mpsc::unbounded_channel::<Resolved>();

    let jobs = submit_dossier(&state, &mut session).await;
    spawn_feedback_jobs(&state, jobs, &tx);
    let (attempt_id, result) = rx.recv().await.unwrap();
    resolve_feedback(&state, &mut session, attempt_id, result).await;

    assert_eq!(session.attempt().unwrap().feedback, "Good work, Agent. Over and out.");
    let board = state.leaderboard.read().await;
    assert_eq!(board.entries().len(), 1);
    assert_eq!(board.entries()[0].score, 100);
  }

  #[tokio::test]
  async fn feedback_after_navigating_away_is_discarded() {
    let state = state();
    let mut session = Session::default();
    let (tx, mut rx) = mpsc::unbounded_channel::<Resolved>();

    let jobs = submit_dossier(&state, &mut session).await;
    spawn_feedback_jobs(&state, jobs, &tx);
    handle_client_message(&state, &mut session, ClientWsMessage::Navigate { view: View::Leaderboard }).await;

    let (attempt_id, result) = rx.recv().await.unwrap();
    let reply = resolve_feedback(&state, &mut session, attempt_id, result).await;

    assert!(reply.jobs.is_empty());
    assert!(!reply.messages.iter().any(|m| matches!(m, ServerWsMessage::Error { .. })));
    assert!(session.attempt().is_none());
    assert_eq!(session.view(), View::Leaderboard);
    assert!(state.leaderboard.read().await.entries().is_empty());
  }
}
