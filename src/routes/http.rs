//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs its parameters and basic result info.

use std::sync::Arc;
use axum::{extract::{Path, Query, State}, Json, response::IntoResponse};
use tracing::{info, instrument};

use crate::config::QuestCfg;
use crate::error::ApiError;
use crate::protocol::*;
use crate::state::AppState;
use crate::logic::*;

#[instrument(level = "info")]
pub async fn http_root() -> impl IntoResponse {
  Json(RootOut { status: "ok", message: "DevSkill Tracker API is running" })
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { status: "healthy", version: env!("CARGO_PKG_VERSION") })
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_user_id(
  State(state): State<Arc<AppState>>,
  Path(email): Path<String>,
) -> Result<Json<UserIdOut>, ApiError> {
  let user_id = lookup_user(&state, &email).await?;
  Ok(Json(UserIdOut { status: "success", user_id, email }))
}

#[instrument(level = "info", skip(state, body), fields(user_id = %body.user_id))]
pub async fn http_session_start(
  State(state): State<Arc<AppState>>,
  Json(body): Json<SessionStartIn>,
) -> impl IntoResponse {
  let session_id = start_session(&state, body).await;
  Json(SessionAckOut { status: "success", session_id })
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_session_update(
  State(state): State<Arc<AppState>>,
  Path(session_id): Path<String>,
  Json(body): Json<SessionMetricsIn>,
) -> Result<Json<SessionAckOut>, ApiError> {
  update_session(&state, &session_id, body).await?;
  Ok(Json(SessionAckOut { status: "success", session_id }))
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_session_end(
  State(state): State<Arc<AppState>>,
  Path(session_id): Path<String>,
  Json(body): Json<SessionMetricsIn>,
) -> Result<Json<SessionAnalysisOut>, ApiError> {
  let (detection, tips) = end_session(&state, &session_id, body).await?;
  info!(target: "session", %session_id, score = detection.ai_likelihood_score, "HTTP session end analyzed");
  Ok(Json(SessionAnalysisOut {
    status: "success",
    session_id,
    session_status: crate::domain::SessionStatus::Completed,
    detection,
    tips,
  }))
}

#[instrument(level = "info", skip(state))]
pub async fn http_session_analysis(
  State(state): State<Arc<AppState>>,
  Path(session_id): Path<String>,
) -> Result<Json<SessionAnalysisOut>, ApiError> {
  let (session_status, detection, tips) = reanalyze_session(&state, &session_id).await?;
  Ok(Json(SessionAnalysisOut { status: "success", session_id, session_status, detection, tips }))
}

#[instrument(level = "info", skip(state), fields(language = ?q.language))]
pub async fn http_get_quest(
  State(state): State<Arc<AppState>>,
  Path(skill_level): Path<String>,
  Query(q): Query<QuestQuery>,
) -> impl IntoResponse {
  let quest = serve_quest(&state, &skill_level, q.language.as_deref()).await;
  info!(target: "quest", id = quest.id, %skill_level, "HTTP quest served");
  Json(quest)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_quest_languages(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(LanguagesOut { languages: quest_languages(&state).await })
}

#[instrument(level = "info", skip(state, body), fields(user_id = %body.user_id, code_len = body.code.len()))]
pub async fn http_post_analyze(
  State(state): State<Arc<AppState>>,
  Json(body): Json<CodeSessionIn>,
) -> impl IntoResponse {
  let stats = analyze_submission(&state, body).await;
  Json(AnalyzeOut { status: "success", stats })
}

#[instrument(level = "info", skip(state, body), fields(title = %body.title))]
pub async fn http_add_quest(
  State(state): State<Arc<AppState>>,
  Json(body): Json<QuestCfg>,
) -> Result<Json<QuestOut>, ApiError> {
  let quest = add_quest(&state, body).await?;
  Ok(Json(QuestOut { status: "success", quest }))
}

#[instrument(level = "info", skip(state))]
pub async fn http_remove_quest(
  State(state): State<Arc<AppState>>,
  Path(id): Path<u32>,
) -> Result<Json<QuestOut>, ApiError> {
  let quest = remove_quest(&state, id).await?;
  Ok(Json(QuestOut { status: "success", quest }))
}

#[instrument(level = "info", skip(state))]
pub async fn http_reload_quests(State(state): State<Arc<AppState>>) -> Result<Json<ReloadOut>, ApiError> {
  let (remote_quests, total_quests) = reload_remote_quests(&state).await?;
  Ok(Json(ReloadOut { status: "success", remote_quests, total_quests }))
}
