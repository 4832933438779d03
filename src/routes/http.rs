//! HTTP endpoint handlers. These are thin, read-only wrappers over the shared stores;
//! everything stateful goes through the WebSocket session.

use std::sync::Arc;
use axum::{extract::{Path, State}, http::StatusCode, Json, response::{IntoResponse, Response}};
use tracing::{info, instrument};

use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut { ok: true, feedback_enabled: state.feedback.is_some() })
}

#[instrument(level = "info", skip(state))]
pub async fn http_list_missions(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let missions: Vec<MissionSummary> = state.catalog.read().await.list().iter().map(to_summary).collect();
  info!(target: "mission", count = missions.len(), "HTTP missions served");
  Json(missions)
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_get_mission(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Response {
  match state.catalog.read().await.get(&id) {
    Some(m) => Json(to_out(m)).into_response(),
    None => (StatusCode::NOT_FOUND, Json(ErrorOut { message: format!("Unknown mission: {}", id) })).into_response(),
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_leaderboard(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(state.leaderboard.read().await.entries().to_vec())
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{body::{to_bytes, Body}, http::{Request, StatusCode}};
  use tower::ServiceExt;

  use crate::domain::User;
  use crate::identity::PassphraseGate;
  use crate::routes::build_router;
  use crate::state::AppState;

  fn state() -> Arc<AppState> {
    Arc::new(AppState::from_parts(None, Arc::new(PassphraseGate::new("invisible")), None))
  }

  async fn get_json(state: Arc<AppState>, uri: &str) -> (StatusCode, serde_json::Value) {
    let res = build_router(state)
      .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
      .await
      .unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
  }

  #[tokio::test]
  async fn health_reports_feedback_disabled() {
    let (status, body) = get_json(state(), "/api/v1/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["feedback_enabled"], false);
  }

  #[tokio::test]
  async fn lists_seed_missions() {
    let (status, body) = get_json(state(), "/api/v1/missions").await;
    assert_eq!(status, StatusCode::OK);
    let missions = body.as_array().unwrap();
    assert_eq!(missions.len(), 6);
    assert_eq!(missions[0]["id"], "dp-01");
    assert_eq!(missions[0]["interactive"], true);
  }

  #[tokio::test]
  async fn mission_detail_hides_the_prompt() {
    let (status, body) = get_json(state(), "/api/v1/missions/dir-01").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "The Secret Dead Drop");
    assert!(body.get("feedback_prompt").is_none());

    let (status, body) = get_json(state(), "/api/v1/missions/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Unknown mission: nope");
  }

  #[tokio::test]
  async fn leaderboard_reflects_completions() {
    let state = state();
    state.leaderboard.write().await.record_completion(&User::student("Bond"), 100);
    let (_, body) = get_json(state, "/api/v1/leaderboard").await;
    assert_eq!(body[0]["name"], "Bond");
    assert_eq!(body[0]["rank"], 1);
    assert_eq!(body[0]["missions_completed"], 1);
  }
}
