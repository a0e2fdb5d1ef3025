//! Built-in quest bank and the last-resort fallback quest.

use serde::Deserialize;
use tracing::{error, warn};

use crate::config::QuestCfg;
use crate::domain::{Quest, SkillLevel, TestCase};

/// Python quests keep ids 1-36; JavaScript, Java and C# quests start at 100.
const QUEST_BANK_TOML: &str = include_str!("../data/quests.toml");

#[derive(Deserialize)]
struct QuestBank {
  #[serde(default)]
  quests: Vec<QuestCfg>,
}

/// Quests that guarantee the app is useful without any config or remote source.
pub fn builtin_quests() -> Vec<Quest> {
  let bank = match toml::from_str::<QuestBank>(QUEST_BANK_TOML) {
    Ok(b) => b,
    Err(e) => {
      error!(target: "quest", error = %e, "Built-in quest bank failed to parse");
      return Vec::new();
    }
  };

  bank
    .quests
    .into_iter()
    .filter_map(|q| match q.id {
      Some(id) => Some(q.into_quest(id)),
      None => {
        warn!(target: "quest", title = %q.title, "Skipping built-in quest without id");
        None
      }
    })
    .collect()
}

/// Absolute last-resort fallback: if every pool is empty, we serve this.
pub fn hard_fallback_quest(language: &str, level: SkillLevel) -> Quest {
  Quest {
    id: 0,
    language: language.to_string(),
    level,
    title: "Hello, World".into(),
    task: "Print the text Hello, World!".into(),
    xp: 10,
    test_cases: vec![TestCase::CodeContainsAny { expected: vec!["Hello".into()] }],
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashSet;

  #[test]
  fn bank_parses_with_unique_ids() {
    let quests = builtin_quests();
    assert_eq!(quests.len(), 120);
    let ids: HashSet<u32> = quests.iter().map(|q| q.id).collect();
    assert_eq!(ids.len(), quests.len());
    assert!(quests.iter().all(|q| !q.test_cases.is_empty()));
  }

  #[test]
  fn every_language_has_every_level() {
    let quests = builtin_quests();
    for lang in ["python", "javascript", "java", "csharp"] {
      for level in SkillLevel::ALL {
        assert!(
          quests.iter().any(|q| q.language == lang && q.level == level),
          "no {level} quest for {lang}"
        );
      }
    }
  }

  #[test]
  fn python_quests_use_ids_1_to_36() {
    let quests = builtin_quests();
    let loop_logic = quests.iter().find(|q| q.id == 1).unwrap();
    assert_eq!(loop_logic.title, "Loop Logic");
    assert_eq!(loop_logic.language, "python");
    assert!(quests.iter().filter(|q| q.language != "python").all(|q| q.id >= 100));
  }
}
