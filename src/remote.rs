//! Minimal client for the optional remote quest source.
//!
//! QUEST_BANK_URL points at a JSON document holding quest entries, either a bare
//! array or `{ "quests": [...] }`. Calls are instrumented and log status, latency
//! and payload size (contents only truncated, on failure).

use std::time::{Duration, Instant};

use reqwest::header::{ACCEPT, USER_AGENT};
use serde::Deserialize;
use tracing::{error, info, instrument};

use crate::config::QuestCfg;
use crate::util::trunc_for_log;

#[derive(Clone)]
pub struct QuestSource {
  pub client: reqwest::Client,
  pub url: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum QuestPayload {
  Bare(Vec<QuestCfg>),
  Wrapped { quests: Vec<QuestCfg> },
}

/// Decode a remote quest document.
pub fn parse_quest_payload(body: &str) -> Result<Vec<QuestCfg>, String> {
  match serde_json::from_str::<QuestPayload>(body) {
    Ok(QuestPayload::Bare(q)) | Ok(QuestPayload::Wrapped { quests: q }) => Ok(q),
    Err(e) => Err(format!("invalid quest JSON: {e}")),
  }
}

impl QuestSource {
  /// Construct the client if we find QUEST_BANK_URL; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let url = std::env::var("QUEST_BANK_URL").ok().filter(|u| !u.trim().is_empty())?;
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(20))
      .build()
      .ok()?;
    Some(Self { client, url })
  }

  #[instrument(level = "info", skip(self), fields(url = %self.url))]
  pub async fn fetch(&self) -> Result<Vec<QuestCfg>, String> {
    let started = Instant::now();
    let resp = self
      .client
      .get(&self.url)
      .header(USER_AGENT, concat!("devskill-backend/", env!("CARGO_PKG_VERSION")))
      .header(ACCEPT, "application/json")
      .send()
      .await
      .map_err(|e| format!("request failed: {e}"))?;

    let status = resp.status();
    let body = resp.text().await.map_err(|e| format!("reading body failed: {e}"))?;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if !status.is_success() {
      error!(target: "quest", %status, elapsed_ms, body = %trunc_for_log(&body, 300), "Remote quest source returned an error");
      return Err(format!("HTTP {status}"));
    }

    let quests = parse_quest_payload(&body)?;
    info!(target: "quest", %status, elapsed_ms, bytes = body.len(), count = quests.len(), "Fetched remote quests");
    Ok(quests)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn accepts_bare_and_wrapped_documents() {
    let bare = r#"[{"id": 500, "language": "go", "title": "Goroutines", "task": "Fan out work.", "xp": 120,
      "testCases": [{"type": "code_contains", "expected": ["go func"]}]}]"#;
    let q = parse_quest_payload(bare).unwrap();
    assert_eq!(q.len(), 1);
    assert_eq!(q[0].id, Some(500));

    let wrapped = r#"{"quests": [{"title": "T", "task": "X"}]}"#;
    let q = parse_quest_payload(wrapped).unwrap();
    assert_eq!(q[0].language, "python");
    assert_eq!(q[0].id, None);
  }

  #[test]
  fn rejects_garbage() {
    assert!(parse_quest_payload("{\"nope\": 1}").is_err());
    assert!(parse_quest_payload("not json").is_err());
  }
}
