//! Domain models used by the backend: skill levels, quests and their embedded
//! test cases, plus the session and submission records persisted in memory.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::detection::{DetectionResult, SessionTelemetry};

/// Difficulty tier of a quest, also the estimated skill of a submission.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SkillLevel {
  #[default]
  #[serde(alias = "beginner")]
  Beginner,
  #[serde(alias = "intermediate")]
  Intermediate,
  #[serde(alias = "advanced")]
  Advanced,
}

impl SkillLevel {
  pub const ALL: [SkillLevel; 3] = [SkillLevel::Beginner, SkillLevel::Intermediate, SkillLevel::Advanced];

  /// Case-insensitive; anything unrecognised is a beginner.
  pub fn parse_lenient(s: &str) -> Self {
    let s = s.trim();
    SkillLevel::ALL
      .into_iter()
      .find(|level| level.as_str().eq_ignore_ascii_case(s))
      .unwrap_or_default()
  }

  pub fn as_str(self) -> &'static str {
    match self {
      SkillLevel::Beginner => "Beginner",
      SkillLevel::Intermediate => "Intermediate",
      SkillLevel::Advanced => "Advanced",
    }
  }
}

impl fmt::Display for SkillLevel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Pattern rule a submission is checked against.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TestCase {
  /// Every literal must appear in the source.
  CodeContains { expected: Vec<String> },
  /// No literal may appear in the source.
  CodeNotContains { expected: Vec<String> },
  /// At least one literal must appear.
  CodeContainsAny { expected: Vec<String> },
  /// Expected program output. Code is never executed, see `validator`.
  OutputContains { expected: Vec<String> },
  /// Named function with sample inputs/outputs, shown to the client as examples.
  FunctionTest {
    function: String,
    #[serde(default)] inputs: Vec<serde_json::Value>,
    #[serde(default)] expected: Vec<serde_json::Value>,
  },
  CodeLineCount { max_lines: usize },
  CodeCount { pattern: String, min_count: usize },
}

/// Core quest structure held by the catalog.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
  pub id: u32,
  pub language: String,
  pub level: SkillLevel,
  pub title: String,
  pub task: String,
  pub xp: u32,
  #[serde(default)]
  pub test_cases: Vec<TestCase>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
  Active,
  Completed,
}

/// One tracked IDE session. Counters are replaced wholesale on every update.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
  pub session_id: String,
  pub user_id: String,
  pub email: String,
  pub status: SessionStatus,
  pub language: Option<String>,
  pub start_time: DateTime<Utc>,
  pub end_time: Option<DateTime<Utc>>,
  pub last_updated: Option<DateTime<Utc>>,
  pub telemetry: SessionTelemetry,
  pub files_edited: Vec<String>,
  pub languages_used: Vec<String>,
  /// Latest scoring result, set when the session ends or is re-analyzed.
  pub detection: Option<DetectionResult>,
}

/// Outcome of `/analyze` for one code submission.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionStats {
  pub skill_level: SkillLevel,
  pub confidence: f64,
  pub complexity: usize,
  pub ai_probability: u8,
  pub passed: bool,
  pub tests_passed: usize,
  pub tests_total: usize,
  pub validation_message: String,
  pub validation_details: Vec<String>,
  pub detection: DetectionResult,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
  pub user_id: String,
  pub email: String,
  pub code: String,
  pub language: String,
  pub file_name: String,
  pub quest_id: Option<u32>,
  pub duration: f64,
  pub keystrokes: u64,
  pub timestamp: DateTime<Utc>,
  pub stats: SubmissionStats,
}
