//! Behavioral AI-detection over coarse editor telemetry.
//!
//! Eight signals are scored independently (0-100, higher = more AI-like) and
//! combined into a weighted `aiLikelihoodScore`. Everything here is a pure
//! function of one `SessionTelemetry` snapshot: no clock, no I/O, no shared
//! state. Missing counters never raise; each signal has a low-data branch.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Added to every denominator so zero-length sessions stay finite.
const EPSILON: f64 = 0.1;

/// Typing-interval samples needed before rhythm regularity is measured.
pub const MIN_RHYTHM_SAMPLES: usize = 10;

/// Nested counters reported by richer clients (the IDE extension).
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct BehavioralSignals {
  pub total_clipboard_pastes: u64,
  pub total_paste_characters: u64,
  pub total_autocomplete_accepts: u64,
  pub total_copilot_accepts: u64,
  pub total_format_actions: u64,
  pub total_snippet_inserts: u64,
  /// Inter-keystroke gaps in seconds, in typing order.
  pub typing_intervals: Vec<f64>,
  /// Rapid-typing-then-pause episodes. `None` when the client did not count them.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub burst_count: Option<u64>,
}

/// Per-session counters at the moment of analysis.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionTelemetry {
  pub total_keystrokes: u64,
  pub total_pastes: u64,
  pub total_edits: u64,
  pub total_undos: u64,
  pub total_redos: u64,
  pub total_deletions: u64,
  pub deletion_characters: u64,
  pub active_duration: f64,
  pub idle_duration: f64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub total_duration: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub behavioral_signals: Option<BehavioralSignals>,
}

impl SessionTelemetry {
  pub fn active_secs(&self) -> f64 {
    non_negative(self.active_duration)
  }

  pub fn idle_secs(&self) -> f64 {
    non_negative(self.idle_duration)
  }

  /// Explicit total when given (never below either component), else active + idle.
  pub fn total_secs(&self) -> f64 {
    let (active, idle) = (self.active_secs(), self.idle_secs());
    match self.total_duration {
      Some(total) => non_negative(total).max(active).max(idle),
      None => active + idle,
    }
  }

  pub fn paste_characters(&self) -> u64 {
    self.behavioral_signals.as_ref().map_or(0, |b| b.total_paste_characters)
  }

  pub fn copilot_accepts(&self) -> u64 {
    self.behavioral_signals.as_ref().map_or(0, |b| b.total_copilot_accepts)
  }

  pub fn burst_count(&self) -> u64 {
    self.behavioral_signals.as_ref().and_then(|b| b.burst_count).unwrap_or(0)
  }

  pub fn typing_intervals(&self) -> &[f64] {
    self.behavioral_signals.as_ref().map_or(&[][..], |b| b.typing_intervals.as_slice())
  }
}

fn non_negative(x: f64) -> f64 {
  if x.is_finite() && x > 0.0 { x } else { 0.0 }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
  Human,
  Suspicious,
  AiLikely,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKey {
  TypingSpeed,
  PasteRatio,
  TypingRhythm,
  DeletionPattern,
  BurstPattern,
  AiToolUsage,
  UndoRedoPattern,
  ThinkingTime,
}

impl SignalKey {
  pub const ALL: [SignalKey; 8] = [
    SignalKey::TypingSpeed,
    SignalKey::PasteRatio,
    SignalKey::TypingRhythm,
    SignalKey::DeletionPattern,
    SignalKey::BurstPattern,
    SignalKey::AiToolUsage,
    SignalKey::UndoRedoPattern,
    SignalKey::ThinkingTime,
  ];

  /// Fixed share of the composite score. The eight weights sum to 1.0.
  pub fn weight(self) -> f64 {
    match self {
      SignalKey::TypingSpeed => 0.15,
      SignalKey::PasteRatio => 0.20,
      SignalKey::TypingRhythm => 0.15,
      SignalKey::DeletionPattern => 0.10,
      SignalKey::BurstPattern => 0.10,
      SignalKey::AiToolUsage => 0.15,
      SignalKey::UndoRedoPattern => 0.05,
      SignalKey::ThinkingTime => 0.10,
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      SignalKey::TypingSpeed => "Typing Speed",
      SignalKey::PasteRatio => "Paste Ratio",
      SignalKey::TypingRhythm => "Typing Rhythm",
      SignalKey::DeletionPattern => "Deletion Pattern",
      SignalKey::BurstPattern => "Burst Pattern",
      SignalKey::AiToolUsage => "AI Tool Usage",
      SignalKey::UndoRedoPattern => "Undo/Redo Pattern",
      SignalKey::ThinkingTime => "Thinking Time",
    }
  }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SignalResult {
  pub name: String,
  pub value: f64,
  pub score: u8,
  pub weight: f64,
  pub description: String,
  pub verdict: Verdict,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
  pub ai_likelihood_score: u8,
  pub confidence: u8,
  pub signals: BTreeMap<SignalKey, SignalResult>,
  pub recommendation: String,
}

/// One step of a threshold ladder: the score, its verdict and a short reading.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rung {
  pub score: u8,
  pub verdict: Verdict,
  pub note: &'static str,
}

const fn rung(score: u8, verdict: Verdict, note: &'static str) -> Rung {
  Rung { score, verdict, note }
}

fn signal(key: SignalKey, value: f64, r: Rung, metric: String) -> SignalResult {
  SignalResult {
    name: key.label().to_string(),
    value,
    score: r.score,
    weight: key.weight(),
    description: format!("{metric}: {}", r.note),
    verdict: r.verdict,
  }
}

// ---------------------------------------------------------------------------
// Ladders. Strict comparisons: a value exactly on a threshold takes the lower rung.
// ---------------------------------------------------------------------------

pub fn typing_speed_rung(chars_per_sec: f64) -> Rung {
  use Verdict::*;
  if chars_per_sec > 8.0 {
    rung(95, AiLikely, "far beyond sustained human typing speed")
  } else if chars_per_sec > 5.0 {
    rung(75, AiLikely, "faster than typical sustained typing")
  } else if chars_per_sec > 3.5 {
    rung(40, Suspicious, "fast but possible for an experienced typist")
  } else if chars_per_sec > 1.5 {
    rung(10, Human, "normal typing speed")
  } else {
    rung(15, Human, "slow or sparse typing")
  }
}

pub fn paste_ratio_rung(ratio: f64) -> Rung {
  use Verdict::*;
  if ratio > 0.8 {
    rung(95, AiLikely, "almost all code was pasted")
  } else if ratio > 0.5 {
    rung(70, AiLikely, "most code was pasted")
  } else if ratio > 0.3 {
    rung(40, Suspicious, "a large share of code was pasted")
  } else if ratio > 0.1 {
    rung(15, Human, "some pasted code")
  } else {
    rung(5, Human, "code was typed by hand")
  }
}

pub fn typing_rhythm_rung(cv: f64) -> Rung {
  use Verdict::*;
  if cv < 0.3 {
    rung(80, AiLikely, "machine-like regular keystroke timing")
  } else if cv < 0.5 {
    rung(50, Suspicious, "unusually regular keystroke timing")
  } else if cv < 0.8 {
    rung(20, Human, "natural variation in keystroke timing")
  } else {
    rung(5, Human, "highly variable, human keystroke timing")
  }
}

pub fn typing_rhythm_low_data_rung(total_keystrokes: u64) -> Rung {
  use Verdict::*;
  if total_keystrokes > 200 {
    rung(60, Suspicious, "many keystrokes but no timing samples")
  } else {
    rung(20, Human, "not enough timing samples")
  }
}

pub fn deletion_pattern_rung(total_edits: u64, ratio: f64) -> Rung {
  use Verdict::*;
  if total_edits < 5 {
    rung(30, Suspicious, "too few edits to judge")
  } else if ratio < 0.05 {
    rung(70, AiLikely, "almost no corrections while writing")
  } else if ratio < 0.15 {
    rung(40, Suspicious, "few corrections while writing")
  } else if ratio < 0.4 {
    rung(10, Human, "normal amount of corrections")
  } else {
    rung(5, Human, "frequent corrections")
  }
}

pub fn burst_pattern_rung(bursts: u64) -> Rung {
  use Verdict::*;
  if bursts >= 5 {
    rung(80, AiLikely, "repeated rapid insert-then-pause episodes")
  } else if bursts >= 2 {
    rung(45, Suspicious, "a few rapid insert-then-pause episodes")
  } else {
    rung(10, Human, "steady typing")
  }
}

pub fn ai_tool_usage_rung(copilot_accepts: u64) -> Rung {
  use Verdict::*;
  if copilot_accepts > 10 {
    rung(90, AiLikely, "heavy reliance on AI completions")
  } else if copilot_accepts > 3 {
    rung(60, Suspicious, "regular use of AI completions")
  } else if copilot_accepts > 0 {
    rung(30, Suspicious, "occasional AI completions")
  } else {
    rung(5, Human, "no AI completions accepted")
  }
}

pub fn undo_redo_rung(total_edits: u64, ratio: f64) -> Rung {
  use Verdict::*;
  if total_edits < 5 {
    rung(25, Suspicious, "too few edits to judge")
  } else if ratio < 0.02 {
    rung(55, Suspicious, "almost never undone")
  } else if ratio < 0.1 {
    rung(15, Human, "occasional undo")
  } else {
    rung(5, Human, "frequent undo while iterating")
  }
}

pub fn thinking_time_rung(total_secs: f64, ratio: f64) -> Rung {
  use Verdict::*;
  if total_secs < 30.0 {
    rung(50, Suspicious, "session too short to show thinking pauses")
  } else if ratio < 0.05 {
    rung(50, Suspicious, "almost no pauses to think")
  } else if ratio < 0.15 {
    rung(25, Human, "short thinking pauses")
  } else if ratio < 0.5 {
    rung(10, Human, "healthy thinking pauses")
  } else {
    rung(10, Human, "long pauses between edits")
  }
}

// ---------------------------------------------------------------------------
// Signals
// ---------------------------------------------------------------------------

pub fn typing_speed(t: &SessionTelemetry) -> SignalResult {
  let cps = t.total_keystrokes as f64 / (t.active_secs() + EPSILON);
  signal(SignalKey::TypingSpeed, cps, typing_speed_rung(cps), format!("{cps:.2} chars/sec while active"))
}

pub fn paste_ratio(t: &SessionTelemetry) -> SignalResult {
  let pasted = t.paste_characters() as f64;
  let ratio = pasted / (t.total_keystrokes as f64 + pasted + EPSILON);
  signal(
    SignalKey::PasteRatio,
    ratio,
    paste_ratio_rung(ratio),
    format!("{:.0}% of characters pasted", ratio * 100.0),
  )
}

pub fn typing_rhythm(t: &SessionTelemetry) -> SignalResult {
  let intervals = t.typing_intervals();
  if intervals.len() >= MIN_RHYTHM_SAMPLES {
    let cv = coefficient_of_variation(intervals);
    signal(
      SignalKey::TypingRhythm,
      cv,
      typing_rhythm_rung(cv),
      format!("timing variation {cv:.2} over {} samples", intervals.len()),
    )
  } else {
    signal(
      SignalKey::TypingRhythm,
      0.0,
      typing_rhythm_low_data_rung(t.total_keystrokes),
      format!("{} timing samples, {} keystrokes", intervals.len(), t.total_keystrokes),
    )
  }
}

pub fn deletion_pattern(t: &SessionTelemetry) -> SignalResult {
  let ratio = t.total_deletions as f64 / (t.total_edits as f64 + EPSILON);
  signal(
    SignalKey::DeletionPattern,
    ratio,
    deletion_pattern_rung(t.total_edits, ratio),
    format!("{} deletions across {} edits", t.total_deletions, t.total_edits),
  )
}

pub fn burst_pattern(t: &SessionTelemetry) -> SignalResult {
  let bursts = t.burst_count();
  signal(SignalKey::BurstPattern, bursts as f64, burst_pattern_rung(bursts), format!("{bursts} bursts"))
}

pub fn ai_tool_usage(t: &SessionTelemetry) -> SignalResult {
  let accepts = t.copilot_accepts();
  signal(
    SignalKey::AiToolUsage,
    accepts as f64,
    ai_tool_usage_rung(accepts),
    format!("{accepts} AI completions accepted"),
  )
}

pub fn undo_redo_pattern(t: &SessionTelemetry) -> SignalResult {
  let ratio = t.total_undos as f64 / (t.total_edits as f64 + EPSILON);
  signal(
    SignalKey::UndoRedoPattern,
    ratio,
    undo_redo_rung(t.total_edits, ratio),
    format!("{} undos, {} redos across {} edits", t.total_undos, t.total_redos, t.total_edits),
  )
}

pub fn thinking_time(t: &SessionTelemetry) -> SignalResult {
  let total = t.total_secs();
  let ratio = t.idle_secs() / (total + EPSILON);
  signal(
    SignalKey::ThinkingTime,
    ratio,
    thinking_time_rung(total, ratio),
    format!("{:.0}% of {total:.0}s idle", ratio * 100.0),
  )
}

pub fn score_signal(key: SignalKey, t: &SessionTelemetry) -> SignalResult {
  match key {
    SignalKey::TypingSpeed => typing_speed(t),
    SignalKey::PasteRatio => paste_ratio(t),
    SignalKey::TypingRhythm => typing_rhythm(t),
    SignalKey::DeletionPattern => deletion_pattern(t),
    SignalKey::BurstPattern => burst_pattern(t),
    SignalKey::AiToolUsage => ai_tool_usage(t),
    SignalKey::UndoRedoPattern => undo_redo_pattern(t),
    SignalKey::ThinkingTime => thinking_time(t),
  }
}

/// Population standard deviation over mean. A non-positive mean reads as 0 (perfectly regular).
pub fn coefficient_of_variation(samples: &[f64]) -> f64 {
  if samples.is_empty() {
    return 0.0;
  }
  let n = samples.len() as f64;
  let mean = samples.iter().map(|&x| non_negative(x)).sum::<f64>() / n;
  if mean <= 0.0 {
    return 0.0;
  }
  let variance = samples.iter().map(|&x| (non_negative(x) - mean).powi(2)).sum::<f64>() / n;
  variance.sqrt() / mean
}

/// How much telemetry backed the verdict: 19 points per satisfied check, capped at 95.
pub fn confidence(t: &SessionTelemetry) -> u8 {
  let checks = [
    t.typing_intervals().len() >= MIN_RHYTHM_SAMPLES,
    t.behavioral_signals.is_some(),
    t.total_edits > 10,
    t.active_secs() > 60.0,
    t.total_keystrokes > 50,
  ];
  let satisfied = checks.iter().filter(|&&c| c).count() as u8;
  (satisfied * 19).min(95)
}

/// Thresholds apply to the unrounded composite: 39.6 reports human-written even though it displays as 40.
pub fn recommendation(score: f64) -> &'static str {
  if score >= 70.0 {
    "High likelihood of AI-generated or pasted code. Review this session before trusting the submission."
  } else if score >= 40.0 {
    "Moderate indicators of AI assistance. Some signals point to pasted or generated code."
  } else {
    "Code appears human-written. Typing behavior is consistent with hand-written work."
  }
}

pub fn analyze(t: &SessionTelemetry) -> DetectionResult {
  let signals: BTreeMap<SignalKey, SignalResult> =
    SignalKey::ALL.iter().map(|&key| (key, score_signal(key, t))).collect();

  let total_weight: f64 = signals.values().map(|s| s.weight).sum();
  let weighted: f64 = signals.values().map(|s| f64::from(s.score) * s.weight).sum();
  let composite = if total_weight > 0.0 { weighted / total_weight } else { 0.0 };
  let ai_likelihood_score = composite.round().clamp(0.0, 100.0) as u8;

  DetectionResult {
    ai_likelihood_score,
    confidence: confidence(t),
    signals,
    recommendation: recommendation(composite).to_string(),
  }
}
