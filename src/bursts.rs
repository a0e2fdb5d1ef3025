//! Burst detection over a session's inter-keystroke gaps.
//!
//! A burst is a run of keystrokes typed much faster than the session's own
//! baseline, immediately followed by a long pause: the shape a paste-then-edit
//! or generate-then-tweak loop leaves in the timing series. The rate multiplier,
//! pause length and minimum run length all come from `BurstConfig`.

use crate::config::BurstConfig;
use crate::detection::MIN_RHYTHM_SAMPLES;

pub fn count_bursts(intervals: &[f64], cfg: &BurstConfig) -> u64 {
  if intervals.len() < MIN_RHYTHM_SAMPLES || cfg.rate_multiplier <= 0.0 {
    return 0;
  }

  let gaps: Vec<f64> = intervals
    .iter()
    .map(|&x| if x.is_finite() && x > 0.0 { x } else { 0.0 })
    .collect();
  let mean = gaps.iter().sum::<f64>() / gaps.len() as f64;
  if mean <= 0.0 {
    return 0;
  }

  // Faster than multiplier x baseline rate <=> gap shorter than mean / multiplier.
  let fast_gap = mean / cfg.rate_multiplier;
  let min_run = cfg.min_run.max(1);

  let mut bursts = 0u64;
  let mut run = 0usize;
  for &gap in &gaps {
    if gap < fast_gap {
      run += 1;
      continue;
    }
    if run >= min_run && gap > cfg.pause_secs {
      bursts += 1;
    }
    run = 0;
  }
  bursts
}
