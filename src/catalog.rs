//! Quest catalog: an owned cache over three layers of quests with an explicit rebuild.
//!
//! Layers, highest priority first:
//!   - custom quests (TOML config bank + admin additions)
//!   - quests fetched from the remote source
//!   - the built-in bank
//!
//! Every mutation calls `rebuild()`, which re-derives the id index and the
//! (language, level) pools from scratch. Nothing here is global; `AppState`
//! owns the catalog behind a lock.

use std::collections::HashMap;

use rand::{seq::SliceRandom, Rng};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::QuestCfg;
use crate::domain::{Quest, SkillLevel};
use crate::error::ApiError;
use crate::seeds::hard_fallback_quest;

pub const DEFAULT_LANGUAGE: &str = "python";

/// Map common spellings to catalog language keys. Unknown names pass through lowercased.
pub fn normalize_language(lang: &str) -> String {
  let lower = lang.trim().to_lowercase();
  match lower.as_str() {
    "" | "py" | "python" | "python3" => "python".into(),
    "js" | "javascript" | "ts" | "typescript" => "javascript".into(),
    "c#" | "cs" | "csharp" => "csharp".into(),
    _ => lower,
  }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LanguageInfo {
  pub id: String,
  pub name: String,
  pub quest_count: usize,
}

#[derive(Clone, Debug, Default)]
pub struct QuestCatalog {
  builtin: Vec<Quest>,
  custom: Vec<Quest>,
  remote: Vec<Quest>,
  by_id: HashMap<u32, Quest>,
  pools: HashMap<(String, SkillLevel), Vec<u32>>,
}

impl QuestCatalog {
  pub fn new(builtin: Vec<Quest>) -> Self {
    let mut c = Self { builtin, ..Default::default() };
    c.rebuild();
    c
  }

  /// Re-derive the id index and pools from the three layers.
  pub fn rebuild(&mut self) {
    let mut by_id: HashMap<u32, Quest> = HashMap::new();
    for (layer, quests) in [("custom", &self.custom), ("remote", &self.remote), ("builtin", &self.builtin)] {
      for q in quests {
        if by_id.contains_key(&q.id) {
          warn!(target: "quest", id = q.id, layer, "Quest id shadowed by a higher-priority layer");
          continue;
        }
        by_id.insert(q.id, q.clone());
      }
    }

    let mut ids: Vec<u32> = by_id.keys().copied().collect();
    ids.sort_unstable();
    let mut pools: HashMap<(String, SkillLevel), Vec<u32>> = HashMap::new();
    for id in ids {
      let q = &by_id[&id];
      pools.entry((q.language.clone(), q.level)).or_default().push(id);
    }

    debug!(target: "quest", total = by_id.len(), pools = pools.len(), "Quest catalog rebuilt");
    self.by_id = by_id;
    self.pools = pools;
  }

  pub fn len(&self) -> usize {
    self.by_id.len()
  }

  pub fn get(&self, id: u32) -> Option<&Quest> {
    self.by_id.get(&id)
  }

  /// One past the highest id, or the lowest free id >= 1 once `u32::MAX` is taken.
  fn next_free_id(&self) -> Result<u32, ApiError> {
    let Some(&max) = self.by_id.keys().max() else {
      return Ok(1);
    };
    max
      .checked_add(1)
      .or_else(|| (1..u32::MAX).find(|id| !self.by_id.contains_key(id)))
      .ok_or_else(|| ApiError::InvalidQuest("no free quest id left".into()))
  }

  /// Add a custom quest. A missing id gets the next free one; a taken id is rejected.
  pub fn add_custom(&mut self, cfg: QuestCfg) -> Result<Quest, ApiError> {
    if cfg.title.trim().is_empty() || cfg.task.trim().is_empty() {
      return Err(ApiError::InvalidQuest("title and task must be non-empty".into()));
    }
    let id = match cfg.id {
      Some(id) if self.by_id.contains_key(&id) => return Err(ApiError::DuplicateQuest(id)),
      Some(id) => id,
      None => self.next_free_id()?,
    };
    let quest = cfg.into_quest(id);
    self.custom.push(quest.clone());
    self.rebuild();
    Ok(quest)
  }

  /// Remove a custom quest. Built-in and remote quests cannot be removed.
  pub fn remove_custom(&mut self, id: u32) -> Result<Quest, ApiError> {
    let pos = self.custom.iter().position(|q| q.id == id).ok_or(ApiError::QuestNotFound(id))?;
    let removed = self.custom.remove(pos);
    self.rebuild();
    Ok(removed)
  }

  /// Replace the remote layer wholesale. Entries without an id are skipped.
  pub fn replace_remote(&mut self, entries: Vec<QuestCfg>) -> usize {
    self.remote = entries
      .into_iter()
      .filter_map(|cfg| match cfg.id {
        Some(id) => Some(cfg.into_quest(id)),
        None => {
          warn!(target: "quest", title = %cfg.title, "Skipping remote quest without id");
          None
        }
      })
      .collect();
    self.rebuild();
    self.remote.len()
  }

  /// Pool for (language, level), falling back to the python pool of the same level.
  fn pool(&self, language: &str, level: SkillLevel) -> Option<&Vec<u32>> {
    self
      .pools
      .get(&(language.to_string(), level))
      .filter(|p| !p.is_empty())
      .or_else(|| self.pools.get(&(DEFAULT_LANGUAGE.to_string(), level)).filter(|p| !p.is_empty()))
  }

  pub fn pick_with<R: Rng + ?Sized>(&self, language: Option<&str>, level: SkillLevel, rng: &mut R) -> Quest {
    let lang = normalize_language(language.unwrap_or(DEFAULT_LANGUAGE));
    self
      .pool(&lang, level)
      .and_then(|ids| ids.choose(rng))
      .and_then(|id| self.by_id.get(id))
      .cloned()
      .unwrap_or_else(|| {
        warn!(target: "quest", %lang, %level, "No quests for pool; serving hard fallback");
        hard_fallback_quest(&lang, level)
      })
  }

  pub fn pick(&self, language: Option<&str>, level: SkillLevel) -> Quest {
    self.pick_with(language, level, &mut rand::thread_rng())
  }

  /// Quest count per (language, level) pool, sorted.
  pub fn inventory(&self) -> Vec<(String, SkillLevel, usize)> {
    let mut out: Vec<(String, SkillLevel, usize)> = self
      .pools
      .iter()
      .map(|((lang, level), ids)| (lang.clone(), *level, ids.len()))
      .collect();
    out.sort();
    out
  }

  /// Languages with at least one quest, sorted by id.
  pub fn languages(&self) -> Vec<LanguageInfo> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for q in self.by_id.values() {
      *counts.entry(q.language.as_str()).or_default() += 1;
    }
    let mut out: Vec<LanguageInfo> = counts
      .into_iter()
      .map(|(id, quest_count)| LanguageInfo { id: id.to_string(), name: capitalize(id), quest_count })
      .collect();
    out.sort_by(|a, b| a.id.cmp(&b.id));
    out
  }
}

fn capitalize(s: &str) -> String {
  let mut chars = s.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::seeds::builtin_quests;
  use rand::{rngs::StdRng, SeedableRng};

  fn cfg(id: Option<u32>, language: &str, title: &str) -> QuestCfg {
    QuestCfg {
      id,
      language: language.into(),
      level: SkillLevel::Beginner,
      title: title.into(),
      task: "do it".into(),
      xp: 10,
      test_cases: vec![],
    }
  }

  #[test]
  fn language_aliases() {
    assert_eq!(normalize_language("TS"), "javascript");
    assert_eq!(normalize_language("c#"), "csharp");
    assert_eq!(normalize_language("py"), "python");
    assert_eq!(normalize_language("Rust"), "rust");
  }

  #[test]
  fn pick_respects_language_and_level() {
    let c = QuestCatalog::new(builtin_quests());
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..20 {
      let q = c.pick_with(Some("java"), SkillLevel::Advanced, &mut rng);
      assert_eq!(q.language, "java");
      assert_eq!(q.level, SkillLevel::Advanced);
    }
  }

  #[test]
  fn unknown_language_falls_back_to_python() {
    let c = QuestCatalog::new(builtin_quests());
    let q = c.pick(Some("cobol"), SkillLevel::Intermediate);
    assert_eq!(q.language, "python");
    assert_eq!(q.level, SkillLevel::Intermediate);
  }

  #[test]
  fn empty_catalog_serves_hard_fallback() {
    let c = QuestCatalog::new(vec![]);
    let q = c.pick(None, SkillLevel::Beginner);
    assert_eq!(q.id, 0);
  }

  #[test]
  fn custom_quests_get_ids_and_can_be_removed() {
    let mut c = QuestCatalog::new(builtin_quests());
    let before = c.len();
    let q = c.add_custom(cfg(None, "Rust", "Borrowing")).unwrap();
    assert_eq!(q.language, "rust");
    assert!(q.id > 100);
    assert_eq!(c.len(), before + 1);
    assert!(c.languages().iter().any(|l| l.id == "rust" && l.name == "Rust" && l.quest_count == 1));

    assert_eq!(c.add_custom(cfg(Some(q.id), "rust", "again")), Err(ApiError::DuplicateQuest(q.id)));
    assert_eq!(c.remove_custom(q.id).unwrap().title, "Borrowing");
    assert_eq!(c.len(), before);
    assert_eq!(c.remove_custom(1), Err(ApiError::QuestNotFound(1)));
  }

  #[test]
  fn remote_layer_replaces_and_is_shadowed_by_custom() {
    let mut c = QuestCatalog::new(vec![]);
    c.add_custom(cfg(Some(5), "python", "custom five")).unwrap();
    let kept = c.replace_remote(vec![cfg(Some(5), "python", "remote five"), cfg(Some(6), "python", "six"), cfg(None, "python", "x")]);
    assert_eq!(kept, 2);
    assert_eq!(c.get(5).unwrap().title, "custom five");
    assert_eq!(c.get(6).unwrap().title, "six");

    c.replace_remote(vec![]);
    assert!(c.get(6).is_none());
  }

  #[test]
  fn languages_are_sorted_and_counted() {
    let c = QuestCatalog::new(builtin_quests());
    let ids: Vec<String> = c.languages().into_iter().map(|l| l.id).collect();
    assert_eq!(ids, vec!["csharp", "java", "javascript", "python"]);
    let python = c.languages().into_iter().find(|l| l.id == "python").unwrap();
    assert_eq!(python.quest_count, 36);
    assert!(c.inventory().contains(&("python".to_string(), SkillLevel::Advanced, 12)));
  }

  #[test]
  fn id_assignment_survives_a_max_id_quest() {
    let mut c = QuestCatalog::new(vec![]);
    c.add_custom(cfg(Some(u32::MAX), "python", "top")).unwrap();
    let next = c.add_custom(cfg(None, "python", "after top")).unwrap();
    assert_eq!(next.id, 1);
    let again = c.add_custom(cfg(None, "python", "after one")).unwrap();
    assert_eq!(again.id, 2);
    assert_eq!(c.len(), 3);
  }

  #[test]
  fn rejects_blank_quests() {
    let mut c = QuestCatalog::new(vec![]);
    assert!(matches!(c.add_custom(cfg(None, "python", "  ")), Err(ApiError::InvalidQuest(_))));
  }
}
