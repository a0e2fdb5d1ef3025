//! Loading service configuration (burst parameters, extra quests, known users) from TOML.
//!
//! See `AppConfig` for the expected schema. Every table is optional.

use serde::Deserialize;
use tracing::{info, error};

use crate::domain::{Quest, SkillLevel, TestCase};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub burst: BurstConfig,
  #[serde(default)]
  pub quests: Vec<QuestCfg>,
  #[serde(default)]
  pub users: Vec<UserCfg>,
}

/// Parameters of the burst detector. A burst is a run of at least `min_run`
/// intervals typed faster than `rate_multiplier` times the session's baseline
/// rate, followed by a pause longer than `pause_secs`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct BurstConfig {
  pub rate_multiplier: f64,
  pub pause_secs: f64,
  pub min_run: usize,
}

impl Default for BurstConfig {
  fn default() -> Self {
    Self { rate_multiplier: 3.0, pause_secs: 2.0, min_run: 3 }
  }
}

/// Quest entry accepted from TOML (config bank, built-in bank) or the remote JSON source.
/// `id` may be omitted for custom quests; the catalog assigns one.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestCfg {
  #[serde(default)] pub id: Option<u32>,
  #[serde(default = "default_language")] pub language: String,
  #[serde(default)] pub level: SkillLevel,
  pub title: String,
  pub task: String,
  #[serde(default)] pub xp: u32,
  #[serde(default)] pub test_cases: Vec<TestCase>,
}

fn default_language() -> String { "python".into() }

impl QuestCfg {
  pub fn into_quest(self, id: u32) -> Quest {
    Quest {
      id,
      language: self.language.to_lowercase(),
      level: self.level,
      title: self.title,
      task: self.task,
      xp: self.xp,
      test_cases: self.test_cases,
    }
  }
}

/// Directory entry: lets `/get-user-id/{email}` answer before the user's first session.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCfg {
  pub user_id: String,
  pub email: String,
}

/// Attempt to load `AppConfig` from APP_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_app_config_from_env() -> Option<AppConfig> {
  let path = std::env::var("APP_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<AppConfig>(&s) {
      Ok(cfg) => {
        info!(target: "devskill_backend", %path, quests = cfg.quests.len(), users = cfg.users.len(), "Loaded app config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "devskill_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "devskill_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
