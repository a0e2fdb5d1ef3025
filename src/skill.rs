//! Keyword-level skill estimate for a code submission.
//!
//! No classifier model is loaded, so confidence is always 0 and the level comes
//! from a few structural keywords.

use serde::Serialize;

use crate::domain::SkillLevel;

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SkillEstimate {
  pub skill_level: SkillLevel,
  pub confidence: f64,
  /// Whitespace-separated token count, a rough size measure.
  pub complexity: usize,
}

pub fn estimate_skill(code: &str) -> SkillEstimate {
  let skill_level = if code.contains("class ") || code.contains("lambda") {
    SkillLevel::Advanced
  } else if code.contains("def ") || code.contains("import ") {
    SkillLevel::Intermediate
  } else {
    SkillLevel::Beginner
  };
  SkillEstimate { skill_level, confidence: 0.0, complexity: code.split_whitespace().count() }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn keywords_pick_the_level() {
    assert_eq!(estimate_skill("print('Hello World')").skill_level, SkillLevel::Beginner);
    assert_eq!(estimate_skill("def f(n):\n  return n").skill_level, SkillLevel::Intermediate);
    assert_eq!(estimate_skill("import asyncio").skill_level, SkillLevel::Intermediate);
    assert_eq!(estimate_skill("class Node:\n  def __init__(self): pass").skill_level, SkillLevel::Advanced);
    assert_eq!(estimate_skill("f = lambda x: x").skill_level, SkillLevel::Advanced);
  }

  #[test]
  fn complexity_counts_tokens() {
    let e = estimate_skill("x = 10\ny = 20\nprint(x + y)");
    assert_eq!(e.complexity, 9);
    assert_eq!(e.confidence, 0.0);
  }
}
