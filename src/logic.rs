//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Session lifecycle (start, counter updates, end with scoring, re-analysis)
//!   - Code submission analysis (skill estimate, quest validation, detection)
//!   - Quest serving and catalog administration (custom quests, remote reload)

use chrono::Utc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::bursts::count_bursts;
use crate::catalog::LanguageInfo;
use crate::config::{BurstConfig, QuestCfg};
use crate::detection::{analyze, DetectionResult, SessionTelemetry};
use crate::domain::{Quest, SessionRecord, SessionStatus, SkillLevel, SubmissionRecord, SubmissionStats};
use crate::error::ApiError;
use crate::protocol::{CodeSessionIn, SessionMetricsIn, SessionStartIn};
use crate::skill::estimate_skill;
use crate::state::AppState;
use crate::tips::coaching_tips;
use crate::util::trunc_for_log;
use crate::validator::{validate_solution, ValidationReport};

/// Fill in `burstCount` from the typing intervals when the client did not count bursts itself.
pub fn prepare_telemetry(mut t: SessionTelemetry, burst: &BurstConfig) -> SessionTelemetry {
  if let Some(b) = t.behavioral_signals.as_mut() {
    if b.burst_count.is_none() {
      b.burst_count = Some(count_bursts(&b.typing_intervals, burst));
    }
  }
  t
}

/// Score a telemetry snapshot and log the outcome.
fn score(t: &SessionTelemetry, context: &str) -> DetectionResult {
  let result = analyze(t);
  info!(
    target: "detection",
    context,
    score = result.ai_likelihood_score,
    confidence = result.confidence,
    "Session scored."
  );
  result
}

#[instrument(level = "info", skip(state, req), fields(user_id = %req.user_id))]
pub async fn start_session(state: &AppState, req: SessionStartIn) -> String {
  let session_id = Uuid::new_v4().to_string();
  state.remember_user(&req.email, &req.user_id).await;
  state
    .insert_session(SessionRecord {
      session_id: session_id.clone(),
      user_id: req.user_id,
      email: req.email,
      status: SessionStatus::Active,
      language: req.language,
      start_time: Utc::now(),
      end_time: None,
      last_updated: None,
      telemetry: SessionTelemetry::default(),
      files_edited: vec![],
      languages_used: vec![],
      detection: None,
    })
    .await;
  info!(target: "session", %session_id, "Session started.");
  session_id
}

/// Replace the stored counters of a session with the latest snapshot.
#[instrument(level = "info", skip(state, metrics), fields(%session_id))]
pub async fn update_session(state: &AppState, session_id: &str, metrics: SessionMetricsIn) -> Result<(), ApiError> {
  let telemetry = prepare_telemetry(metrics.telemetry, &state.burst);
  let updated = state
    .modify_session(session_id, move |rec| {
      if rec.status == SessionStatus::Completed {
        warn!(target: "session", session_id = %rec.session_id, "Update received for a completed session.");
      }
      rec.telemetry = telemetry;
      rec.files_edited = metrics.files_edited;
      rec.languages_used = metrics.languages_used;
      rec.last_updated = Some(Utc::now());
    })
    .await;

  match updated {
    Some(rec) => {
      debug!(target: "session", %session_id, keystrokes = rec.telemetry.total_keystrokes, "Session counters replaced.");
      Ok(())
    }
    None => Err(ApiError::SessionNotFound(session_id.to_string())),
  }
}

/// Mark a session completed, score its final counters and persist the result.
#[instrument(level = "info", skip(state, metrics), fields(%session_id))]
pub async fn end_session(
  state: &AppState,
  session_id: &str,
  metrics: SessionMetricsIn,
) -> Result<(DetectionResult, Vec<String>), ApiError> {
  let telemetry = prepare_telemetry(metrics.telemetry, &state.burst);
  let detection = score(&telemetry, "session_end");
  let stored = detection.clone();

  let updated = state
    .modify_session(session_id, move |rec| {
      let now = Utc::now();
      rec.status = SessionStatus::Completed;
      rec.end_time = Some(now);
      rec.last_updated = Some(now);
      rec.telemetry = telemetry;
      rec.files_edited = metrics.files_edited;
      rec.languages_used = metrics.languages_used;
      rec.detection = Some(stored);
    })
    .await;

  if updated.is_none() {
    return Err(ApiError::SessionNotFound(session_id.to_string()));
  }
  info!(target: "session", %session_id, score = detection.ai_likelihood_score, "Session ended.");
  let tips = coaching_tips(&detection);
  Ok((detection, tips))
}

/// Re-run the scorer over the stored counters. The new result replaces the stored one.
#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn reanalyze_session(
  state: &AppState,
  session_id: &str,
) -> Result<(SessionStatus, DetectionResult, Vec<String>), ApiError> {
  let rec = state
    .get_session(session_id)
    .await
    .ok_or_else(|| ApiError::SessionNotFound(session_id.to_string()))?;

  let detection = score(&rec.telemetry, "reanalysis");
  let stored = detection.clone();
  state.modify_session(session_id, move |r| r.detection = Some(stored)).await;

  let tips = coaching_tips(&detection);
  Ok((rec.status, detection, tips))
}

/// Skill estimate, quest validation and behavioral detection for one submission.
#[instrument(
  level = "info",
  skip(state, req),
  fields(user_id = %req.user_id, quest_id = ?req.quest_id, code_len = req.code.len())
)]
pub async fn analyze_submission(state: &AppState, req: CodeSessionIn) -> SubmissionStats {
  debug!(target: "detection", code = %trunc_for_log(&req.code, 200), "Analyzing submission.");
  let skill = estimate_skill(&req.code);

  let validation = match req.quest_id.filter(|&id| id != 0) {
    None => ValidationReport::not_requested(),
    Some(id) => match state.catalog.read().await.get(id) {
      Some(quest) => validate_solution(&req.code, quest),
      None => {
        warn!(target: "quest", quest_id = id, "Submission names an unknown quest.");
        ValidationReport::quest_not_found(id)
      }
    },
  };

  let telemetry = prepare_telemetry(
    SessionTelemetry {
      total_keystrokes: req.keystrokes,
      active_duration: req.duration,
      behavioral_signals: req.behavioral_signals,
      ..Default::default()
    },
    &state.burst,
  );
  let detection = score(&telemetry, "submission");

  let stats = SubmissionStats {
    skill_level: skill.skill_level,
    confidence: skill.confidence,
    complexity: skill.complexity,
    ai_probability: detection.ai_likelihood_score,
    passed: validation.passed,
    tests_passed: validation.tests_passed,
    tests_total: validation.tests_total,
    validation_message: validation.message,
    validation_details: validation.details,
    detection,
  };

  info!(
    target: "detection",
    skill = %stats.skill_level,
    passed = stats.passed,
    tests_passed = stats.tests_passed,
    tests_total = stats.tests_total,
    ai_probability = stats.ai_probability,
    "Submission analyzed."
  );

  state
    .record_submission(SubmissionRecord {
      user_id: req.user_id,
      email: req.email,
      code: req.code,
      language: req.language,
      file_name: req.file_name,
      quest_id: req.quest_id,
      duration: req.duration,
      keystrokes: req.keystrokes,
      timestamp: Utc::now(),
      stats: stats.clone(),
    })
    .await;

  stats
}

#[instrument(level = "info", skip(state))]
pub async fn serve_quest(state: &AppState, skill_level: &str, language: Option<&str>) -> Quest {
  let level = SkillLevel::parse_lenient(skill_level);
  let quest = state.catalog.read().await.pick(language, level);
  debug!(target: "quest", id = quest.id, language = %quest.language, %level, "Serving quest.");
  quest
}

pub async fn quest_languages(state: &AppState) -> Vec<LanguageInfo> {
  state.catalog.read().await.languages()
}

#[instrument(level = "info", skip(state))]
pub async fn lookup_user(state: &AppState, email: &str) -> Result<String, ApiError> {
  state
    .lookup_user(email)
    .await
    .ok_or_else(|| ApiError::UserNotFound(email.to_string()))
}

#[instrument(level = "info", skip(state, cfg), fields(title = %cfg.title))]
pub async fn add_quest(state: &AppState, cfg: QuestCfg) -> Result<Quest, ApiError> {
  let quest = state.catalog.write().await.add_custom(cfg)?;
  info!(target: "quest", id = quest.id, language = %quest.language, level = %quest.level, "Custom quest added.");
  Ok(quest)
}

#[instrument(level = "info", skip(state))]
pub async fn remove_quest(state: &AppState, id: u32) -> Result<Quest, ApiError> {
  let quest = state.catalog.write().await.remove_custom(id)?;
  info!(target: "quest", id, "Custom quest removed.");
  Ok(quest)
}

/// Refetch the remote layer. On failure the previous remote quests stay in place.
/// Returns (remote quest count, total quest count).
#[instrument(level = "info", skip(state))]
pub async fn reload_remote_quests(state: &AppState) -> Result<(usize, usize), ApiError> {
  let src = state.quest_source.as_ref().ok_or(ApiError::RemoteDisabled)?;
  let entries = src.fetch().await.map_err(|e| {
    error!(target: "quest", url = %src.url, error = %e, "Remote quest fetch failed; keeping previous remote quests.");
    ApiError::Remote(e)
  })?;

  let mut catalog = state.catalog.write().await;
  let remote = catalog.replace_remote(entries);
  let total = catalog.len();
  info!(target: "quest", remote, total, "Remote quests reloaded.");
  Ok((remote, total))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::AppConfig;
  use crate::detection::BehavioralSignals;

  fn state() -> AppState {
    AppState::from_config(AppConfig::default(), None)
  }

  fn start_req() -> SessionStartIn {
    SessionStartIn { user_id: "u-1".into(), email: "Ada@Example.com".into(), language: Some("python".into()) }
  }

  fn pasted_metrics() -> SessionMetricsIn {
    SessionMetricsIn {
      telemetry: SessionTelemetry {
        total_keystrokes: 40,
        total_pastes: 6,
        total_edits: 2,
        active_duration: 30.0,
        idle_duration: 0.0,
        behavioral_signals: Some(BehavioralSignals {
          total_paste_characters: 4000,
          total_copilot_accepts: 12,
          ..Default::default()
        }),
        ..Default::default()
      },
      files_edited: vec!["main.py".into()],
      languages_used: vec!["python".into()],
    }
  }

  #[test]
  fn prepare_fills_missing_burst_count_only() {
    let mut intervals = vec![];
    for _ in 0..3 {
      intervals.extend([0.05, 0.05, 0.05, 0.05, 3.0]);
    }
    let t = SessionTelemetry {
      behavioral_signals: Some(BehavioralSignals { typing_intervals: intervals.clone(), ..Default::default() }),
      ..Default::default()
    };
    let filled = prepare_telemetry(t, &BurstConfig::default());
    assert_eq!(filled.burst_count(), 3);

    let reported = SessionTelemetry {
      behavioral_signals: Some(BehavioralSignals { typing_intervals: intervals, burst_count: Some(1), ..Default::default() }),
      ..Default::default()
    };
    assert_eq!(prepare_telemetry(reported, &BurstConfig::default()).burst_count(), 1);

    let bare = prepare_telemetry(SessionTelemetry::default(), &BurstConfig::default());
    assert!(bare.behavioral_signals.is_none());
  }

  #[tokio::test]
  async fn session_lifecycle_persists_detection() {
    let st = state();
    let id = start_session(&st, start_req()).await;
    assert_eq!(lookup_user(&st, "ada@example.com").await.unwrap(), "u-1");

    update_session(&st, &id, pasted_metrics()).await.unwrap();
    let rec = st.get_session(&id).await.unwrap();
    assert_eq!(rec.status, SessionStatus::Active);
    assert_eq!(rec.telemetry.total_keystrokes, 40);
    assert!(rec.last_updated.is_some());

    let (detection, tips) = end_session(&st, &id, pasted_metrics()).await.unwrap();
    assert!(detection.ai_likelihood_score >= 40);
    assert!(!tips.is_empty());

    let rec = st.get_session(&id).await.unwrap();
    assert_eq!(rec.status, SessionStatus::Completed);
    assert!(rec.end_time.is_some());
    assert_eq!(rec.detection.as_ref(), Some(&detection));

    let (status, again, _) = reanalyze_session(&st, &id).await.unwrap();
    assert_eq!(status, SessionStatus::Completed);
    assert_eq!(again, detection);
  }

  #[tokio::test]
  async fn unknown_sessions_and_users_are_not_found() {
    let st = state();
    assert_eq!(
      update_session(&st, "nope", SessionMetricsIn::default()).await,
      Err(ApiError::SessionNotFound("nope".into()))
    );
    assert!(end_session(&st, "nope", SessionMetricsIn::default()).await.is_err());
    assert!(reanalyze_session(&st, "nope").await.is_err());
    assert_eq!(lookup_user(&st, "x@y.z").await, Err(ApiError::UserNotFound("x@y.z".into())));
  }

  #[tokio::test]
  async fn submission_is_validated_scored_and_recorded() {
    let st = state();
    let req = CodeSessionIn {
      user_id: "u-2".into(),
      email: "b@example.com".into(),
      code: "print('Hello World')".into(),
      language: "python".into(),
      file_name: "hello.py".into(),
      duration: 60.0,
      keystrokes: 120,
      quest_id: Some(1),
      behavioral_signals: None,
    };
    let stats = analyze_submission(&st, req).await;
    assert_eq!(stats.skill_level, SkillLevel::Beginner);
    assert!(stats.tests_total > 0);
    assert_eq!(stats.ai_probability, stats.detection.ai_likelihood_score);

    let subs = st.submissions.read().await;
    assert_eq!(subs.len(), 1);
    assert_eq!(subs[0].quest_id, Some(1));
  }

  #[tokio::test]
  async fn submission_for_unknown_quest_fails_validation() {
    let st = state();
    let req = CodeSessionIn {
      user_id: "u".into(),
      email: "e".into(),
      code: "x = 1".into(),
      language: String::new(),
      file_name: String::new(),
      duration: 10.0,
      keystrokes: 5,
      quest_id: Some(99_999),
      behavioral_signals: None,
    };
    let stats = analyze_submission(&st, req).await;
    assert!(!stats.passed);
    assert_eq!(stats.validation_message, "Quest not found: 99999");
  }

  #[tokio::test]
  async fn quests_are_served_and_administered() {
    let st = state();
    let q = serve_quest(&st, "advanced", Some("js")).await;
    assert_eq!(q.language, "javascript");
    assert_eq!(q.level, SkillLevel::Advanced);
    assert_eq!(quest_languages(&st).await.len(), 4);

    let cfg = QuestCfg {
      id: None,
      language: "go".into(),
      level: SkillLevel::Beginner,
      title: "Goroutines".into(),
      task: "Start one".into(),
      xp: 20,
      test_cases: vec![],
    };
    let added = add_quest(&st, cfg).await.unwrap();
    assert_eq!(serve_quest(&st, "Beginner", Some("go")).await.id, added.id);
    assert_eq!(remove_quest(&st, added.id).await.unwrap().title, "Goroutines");
    assert_eq!(remove_quest(&st, added.id).await, Err(ApiError::QuestNotFound(added.id)));
  }

  #[tokio::test]
  async fn reload_without_source_is_disabled() {
    assert_eq!(reload_remote_quests(&state()).await, Err(ApiError::RemoteDisabled));
  }
}
