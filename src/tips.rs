//! Coaching tips derived from signal verdicts. Advisory only; nothing here
//! feeds back into the score.

use crate::detection::{DetectionResult, SignalKey, Verdict};

fn tip_for(key: SignalKey) -> &'static str {
  match key {
    SignalKey::TypingSpeed => "Your typing speed looks unusually high. Writing code yourself, even slowly, builds lasting skill.",
    SignalKey::PasteRatio => "A large part of this code was pasted. Try retyping snippets so you understand each line.",
    SignalKey::TypingRhythm => "Your keystroke rhythm is very even. Pause to reason about the problem as you write.",
    SignalKey::DeletionPattern => "You rarely corrected anything. Experimenting and fixing mistakes is part of learning.",
    SignalKey::BurstPattern => "Several large inserts were followed by long pauses. Build the solution up step by step.",
    SignalKey::AiToolUsage => "You accepted AI completions. Try the next quest with suggestions turned off.",
    SignalKey::UndoRedoPattern => "Undo was barely used. Trying an idea and rolling it back is a healthy habit.",
    SignalKey::ThinkingTime => "There was little time spent thinking. Plan your approach before you start typing.",
  }
}

/// One tip per flagged signal, in signal-key order.
pub fn coaching_tips(result: &DetectionResult) -> Vec<String> {
  let tips: Vec<String> = result
    .signals
    .iter()
    .filter(|(_, s)| s.verdict != Verdict::Human)
    .map(|(key, _)| tip_for(*key).to_string())
    .collect();

  if tips.is_empty() {
    vec!["Great work! Your session looks like genuine hands-on practice.".into()]
  } else {
    tips
  }
}
